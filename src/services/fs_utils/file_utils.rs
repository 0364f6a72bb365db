use filetime::FileTime;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Copy a single file to `to`, carrying over access and modification times.
/// An existing file at `to` is overwritten.
pub fn copy_preserving_times(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to)?;
    let metadata = fs::metadata(from)?;
    filetime::set_file_times(
        to,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )
}

/// Copy a file or directory into `dest_dir`, keeping its name.
///
/// Directories are copied recursively; every copied file keeps the source
/// timestamps. Symlinks are not followed. Returns the path of the copy.
pub fn copy_into(from: &Path, dest_dir: &Path) -> io::Result<PathBuf> {
    let name = from.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("No file name in {}", from.display()),
        )
    })?;
    let target = dest_dir.join(name);

    if from.is_dir() {
        copy_tree(from, &target)?;
    } else {
        copy_preserving_times(from, &target)?;
    }
    Ok(target)
}

fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    for entry in WalkDir::new(from).follow_links(false) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(io::Error::other)?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            copy_preserving_times(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Entries directly inside `dir` as `(file name, path)`, sorted by name.
/// Unreadable entries are logged and skipped.
pub fn sorted_entries(dir: &Path) -> io::Result<Vec<(String, PathBuf)>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {e}", dir.display());
                continue;
            }
        };
        out.push((entry.file_name().to_string_lossy().to_string(), entry.path()));
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}
