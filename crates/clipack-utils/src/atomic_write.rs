//! Atomic file writes for extracted bundle entries.
//!
//! Content goes to a temporary file in the target directory, is fsynced,
//! and is renamed over the target. A reader never observes a half-written
//! file. On Windows the rename is retried briefly while another process
//! holds the target open. The temp file shares the target's directory,
//! so the rename never crosses a filesystem.

use camino::Utf8Path;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

#[cfg(target_os = "windows")]
use std::{thread, time::Duration};

use crate::error::{ClipackError, FileOperation};
use crate::paths::ensure_dir_all;

/// Result of an atomic write operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomicWriteResult {
    /// Bytes written to the target
    pub bytes_written: usize,
    /// Number of rename retries that occurred (Windows only)
    pub rename_retry_count: u32,
    /// Any warnings generated during the operation
    pub warnings: Vec<String>,
}

/// Atomically write `content` to `path`, creating parent directories.
///
/// The content is written byte-for-byte; line endings are not rewritten.
///
/// # Errors
///
/// Returns [`ClipackError::FileOperation`] if the parent directory cannot be
/// created or the temp file cannot be written, synced, or renamed.
pub fn write_file_atomic(path: &Utf8Path, content: &str) -> Result<AtomicWriteResult, ClipackError> {
    let parent = match path.parent() {
        Some(p) if !p.as_str().is_empty() => p,
        _ => Utf8Path::new("."),
    };
    ensure_dir_all(parent).map_err(|e| ClipackError::file_op(FileOperation::CreateDir, parent, e))?;

    let write_err = |e: io::Error| ClipackError::file_op(FileOperation::Write, path, e);

    let mut temp_file = NamedTempFile::new_in(parent).map_err(write_err)?;
    temp_file.write_all(content.as_bytes()).map_err(write_err)?;
    temp_file.as_file().sync_all().map_err(write_err)?;

    let mut result = AtomicWriteResult {
        bytes_written: content.len(),
        ..AtomicWriteResult::default()
    };

    // A failed rename drops the temp file, which removes it.
    let retry_count = atomic_rename(temp_file, path.as_std_path()).map_err(write_err)?;
    result.rename_retry_count = retry_count;
    if retry_count > 0 {
        result.warnings.push(format!(
            "Rename required {retry_count} retries due to transient filesystem locks"
        ));
    }

    Ok(result)
}

/// Rename with bounded exponential backoff (at most 250ms in total).
#[cfg(target_os = "windows")]
fn atomic_rename(mut temp_file: NamedTempFile, target: &Path) -> io::Result<u32> {
    const MAX_RETRIES: u32 = 5;
    const INITIAL_DELAY_MS: u64 = 10;
    const MAX_TOTAL_DELAY_MS: u64 = 250;

    let mut retry_count = 0;
    let mut total_delay_ms = 0;

    loop {
        let persist_error = match temp_file.persist(target) {
            Ok(_) => return Ok(retry_count),
            Err(e) => e,
        };

        let retryable = matches!(
            persist_error.error.kind(),
            io::ErrorKind::PermissionDenied | io::ErrorKind::Other
        );
        if retry_count >= MAX_RETRIES || !retryable {
            return Err(persist_error.error);
        }

        let delay_ms = INITIAL_DELAY_MS * 2_u64.pow(retry_count);
        if total_delay_ms + delay_ms > MAX_TOTAL_DELAY_MS {
            let remaining = MAX_TOTAL_DELAY_MS.saturating_sub(total_delay_ms);
            if remaining > 0 {
                thread::sleep(Duration::from_millis(remaining));
            }
            return persist_error
                .file
                .persist(target)
                .map(|_| retry_count + 1)
                .map_err(|e| e.error);
        }

        thread::sleep(Duration::from_millis(delay_ms));
        total_delay_ms += delay_ms;
        retry_count += 1;
        temp_file = persist_error.file;
    }
}

#[cfg(not(target_os = "windows"))]
fn atomic_rename(temp_file: NamedTempFile, target: &Path) -> io::Result<u32> {
    temp_file.persist(target).map(|_| 0).map_err(|e| e.error)
}
