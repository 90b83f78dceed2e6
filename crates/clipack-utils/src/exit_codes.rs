//! Exit code constants and error kind mapping for clipack.
//!
//! Codes follow the BSD `sysexits.h` convention so that scripts can tell a
//! malformed bundle apart from a permission problem.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | Unclassified failure |
//! | 64 | `USAGE` | Missing option or invalid configuration (`EX_USAGE`) |
//! | 65 | `DATA_ERR` | Malformed bundle text (`EX_DATAERR`) |
//! | 73 | `CANT_CREATE` | File read/write/stat failure (`EX_CANTCREAT`) |
//! | 77 | `NO_PERM` | Traversal or disallowed symlink (`EX_NOPERM`) |

use crate::types::ErrorKind;

/// Exit codes matching the documented exit code table.
///
/// The numeric values are part of the public API.
///
/// # Example
///
/// ```rust
/// use clipack_utils::exit_codes::ExitCode;
///
/// let code = ExitCode::DATA_ERR;
/// assert_eq!(code.as_i32(), 65);
/// assert_eq!(ExitCode::SUCCESS, ExitCode::from_i32(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - unclassified failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// Usage error - required option missing or configuration invalid
    pub const USAGE: ExitCode = ExitCode(64);

    /// Data error - bundle text is malformed
    pub const DATA_ERR: ExitCode = ExitCode(65);

    /// Cannot create - underlying file operation failed
    pub const CANT_CREATE: ExitCode = ExitCode(73);

    /// No permission - security boundary violated
    pub const NO_PERM: ExitCode = ExitCode(77);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    ///
    /// Prefer using the named constants when possible.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }

    /// The exit code for an error kind.
    #[must_use]
    pub const fn for_kind(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Validation => Self::USAGE,
            ErrorKind::Parse => Self::DATA_ERR,
            ErrorKind::Security => Self::NO_PERM,
            ErrorKind::FileOperation => Self::CANT_CREATE,
            ErrorKind::Unknown => Self::INTERNAL,
        }
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
