//! Static asset copying.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::builder::BuildError;

/// Copy the tree under `from` into `to`, creating directories as needed.
///
/// Returns the number of files copied.
pub fn copy_tree(from: &Path, to: &Path) -> Result<usize, BuildError> {
    let mut copied = 0;

    for entry in WalkDir::new(from).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| BuildError::Read {
            path: from.to_path_buf(),
            source: e.into(),
        })?;
        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|source| BuildError::Write {
                path: target.clone(),
                source,
            })?;
        } else {
            fs::copy(entry.path(), &target).map_err(|source| BuildError::Write {
                path: target.clone(),
                source,
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}
