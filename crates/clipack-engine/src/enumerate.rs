//! Recursive directory listing for pack.

use camino::Utf8Path;
use std::fs;
use std::path::Path;

use clipack_utils::error::{ClipackError, FileOperation};
use clipack_utils::logging::{log_file_event, log_skipped};

/// List every file under `root` as a `/`-separated relative path.
///
/// Entries are visited in byte order of their names, depth first, so the
/// result is deterministic. Symlinked directories are not descended;
/// symlinked files are listed so the security check can judge them.
/// Names that are not valid UTF-8 are skipped with a warning.
///
/// # Errors
///
/// Returns [`ClipackError::FileOperation`] when a directory cannot be read.
pub fn list_files(root: &Utf8Path) -> Result<Vec<String>, ClipackError> {
    let mut files = Vec::new();
    walk_directory(root.as_std_path(), "", &mut files)?;
    Ok(files)
}

fn walk_directory(dir: &Path, prefix: &str, files: &mut Vec<String>) -> Result<(), ClipackError> {
    let list_err = |e: std::io::Error| ClipackError::file_op(FileOperation::ListDir, dir.display(), e);

    let mut entries = fs::read_dir(dir)
        .map_err(list_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(list_err)?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            log_skipped(
                "enumerate",
                "list_files",
                &entry.path().display().to_string(),
                "file name is not valid UTF-8",
            );
            continue;
        };
        let relative = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        };

        let file_type = entry.file_type().map_err(|e| {
            ClipackError::file_op(FileOperation::Stat, entry.path().display(), e)
        })?;

        if file_type.is_dir() {
            walk_directory(&entry.path(), &relative, files)?;
        } else if file_type.is_symlink() {
            match fs::metadata(entry.path()) {
                Ok(target) if target.is_dir() => {
                    log_file_event("enumerate", "list_files", &relative, "skip symlinked directory");
                }
                Ok(_) => files.push(relative),
                Err(_) => log_skipped("enumerate", "list_files", &relative, "dangling symlink"),
            }
        } else if file_type.is_file() {
            files.push(relative);
        }
    }

    Ok(())
}
