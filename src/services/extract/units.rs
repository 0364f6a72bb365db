//! Discovery of submission units under a submissions root.

use super::types::{ExtractMode, SubmissionUnit, UnitSource};
use crate::services::fs_utils::file_utils::sorted_entries;
use crate::types::errors::ToolError;
use std::path::{Path, PathBuf};

const ARCHIVE_EXTENSION: &str = ".zip";

/// List the units under `root` for the given mode, sorted by name.
///
/// Entries that do not fit the mode (stray files next to student folders,
/// non-zip files in single-archive mode) are skipped.
pub fn scan_units(root: &Path, mode: ExtractMode) -> Result<Vec<SubmissionUnit>, ToolError> {
    let mut units = Vec::new();

    for (name, path) in sorted_entries(root).map_err(|e| ToolError::io(root, e))? {
        let unit = match mode {
            ExtractMode::ArchiveInFolder => {
                if !path.is_dir() {
                    continue;
                }
                SubmissionUnit {
                    name,
                    source: UnitSource::ArchiveFolder(path),
                }
            }
            ExtractMode::SingleArchive => {
                if !path.is_file() || !name.ends_with(ARCHIVE_EXTENSION) {
                    continue;
                }
                SubmissionUnit {
                    name: archive_stem(&path),
                    source: UnitSource::Archive(path),
                }
            }
            ExtractMode::PlainDirectory => {
                if !path.is_dir() {
                    continue;
                }
                SubmissionUnit {
                    name,
                    source: UnitSource::Directory(path),
                }
            }
        };
        units.push(unit);
    }

    Ok(units)
}

/// `.zip` files directly inside a student folder, sorted by name.
pub fn archives_in(folder: &Path) -> Result<Vec<PathBuf>, ToolError> {
    Ok(sorted_entries(folder)
        .map_err(|e| ToolError::io(folder, e))?
        .into_iter()
        .filter(|(name, path)| name.ends_with(ARCHIVE_EXTENSION) && path.is_file())
        .map(|(_, path)| path)
        .collect())
}

/// Archive file name without its extension.
pub fn archive_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Archive file name including its extension.
pub fn archive_file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
