//! clipack - pack a directory of source files into one text bundle, and extract it back
//!
//! A bundle is plain text in which every file begins with a header line
//! `// ./relative/path.ext`, a blank line, and the file body. Bundles are
//! easy to paste into a chat window or a ticket and to paste back out.
//!
//! clipack can be used in two ways:
//! - **CLI**: `clipack pack ./src` and `clipack extract ./out`
//! - **Library**: embed [`BundleProcessor`] or the pure [`parse`] / [`format_records`] functions
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Bundle every .ts/.js file under ./src to stdout
//! clipack pack ./src > bundle.txt
//!
//! # Recreate the files elsewhere
//! clipack extract ./restored < bundle.txt
//!
//! # Round-trip through the clipboard
//! clipack --clipboard pack ./src
//! clipack --clipboard extract ./restored
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust
//! use clipack::{FileRecord, format_records, parse};
//!
//! let text = format_records(&[FileRecord::new("src/a.ts", "export const a = 1;\n")]);
//! let records = parse(&text).unwrap();
//! assert_eq!(records[0].path, "src/a.ts");
//! ```
//!
//! # Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Unexpected error |
//! | 64 | Missing option or invalid configuration |
//! | 65 | Malformed bundle |
//! | 73 | File read/write failure |
//! | 77 | Path traversal or disallowed symlink |

pub mod cli;

// ============================================================================
// Stable Public API
// ============================================================================

/// One file carried by a bundle.
pub use clipack_bundle::FileRecord;

/// Bundle parsing, formatting, and header classification.
pub use clipack_bundle::{
    BundleLine, HeaderPrefix, ParseOptions, PreamblePolicy, classify, classify_with,
    format_records, parse, parse_with, to_relative_path, trim_empty_lines,
};

/// Configuration for clipack operations.
///
/// `Config` provides hierarchical configuration with discovery and precedence:
/// CLI arguments > config file > built-in defaults.
pub use clipack_config::{CliArgs, Config};

/// Extract and pack operations.
pub use clipack_engine::{
    BundleProcessor, ClipboardTransport, MemoryClipboard, ProcessOptions, SystemClipboard,
    read_input,
};

/// Include/exclude selection of files to pack.
pub use clipack_selectors::{FileFilter, Selectors, is_target};

/// Library-level error type.
///
/// Library code returns `ClipackError` and does NOT call `std::process::exit()`.
pub use clipack_utils::error::{
    ClipackError, ErrorCategory, ErrorContext, ParseError, SecurityError, UserFriendlyError,
    ValidationError,
};

/// Exit codes matching the documented exit code table.
pub use clipack_utils::exit_codes::ExitCode;

pub use clipack_utils::types::ErrorKind;

/// Path security checks applied to every extracted or packed file.
pub use clipack_utils::paths::{SecurityOptions, SecurityVerdict, check_path_security};

#[doc(hidden)]
pub use clipack_utils::{atomic_write, logging, paths};
