use std::fmt;
use std::io;
use thiserror::Error;

use crate::exit_codes::ExitCode;
use crate::types::ErrorKind;

/// Library-level error type with context for user-facing reports.
///
/// `ClipackError` is the only error type returned by clipack library operations.
/// It is a closed set: every variant maps to one [`ErrorKind`] and one
/// [`ExitCode`].
///
/// # Exit Code Mapping
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 64 | Validation (missing option, invalid config) |
/// | 65 | Parse (malformed bundle) |
/// | 73 | File operation (read/write/stat failure) |
/// | 77 | Security (traversal, disallowed symlink) |
/// | 1 | Unknown |
///
/// # Example
///
/// ```rust
/// use clipack_utils::error::{ClipackError, SecurityError};
/// use clipack_utils::exit_codes::ExitCode;
///
/// let err = ClipackError::from(SecurityError::DirectoryTraversal {
///     path: "../etc/passwd".to_string(),
/// });
/// assert_eq!(err.to_exit_code(), ExitCode::NO_PERM);
/// ```
///
/// Library code returns `ClipackError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum ClipackError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Security error: {0}")]
    Security(#[from] SecurityError),

    #[error("File operation failed at {path}: {operation} failed: {source}")]
    FileOperation {
        operation: FileOperation,
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Missing options and invalid configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must be specified")]
    MissingOption(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration file {path}: {reason}")]
    InvalidConfigFile { path: String, reason: String },

    #[error("Not a directory: {path}")]
    NotADirectory { path: String },
}

/// Malformed bundle text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Non-blank, non-comment text appeared before the first file header.
    #[error("Content found before the first file header at line {line_number}")]
    ContentBeforeHeader { line_number: usize, line: String },

    /// The input contained no file header with a body.
    #[error("No valid files found in input")]
    NoFilesFound { preview: String },
}

/// Violations of the extraction/pack security boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecurityError {
    #[error("Directory traversal detected: {path}")]
    DirectoryTraversal { path: String },

    #[error("Symlinks are not allowed: {path}")]
    SymlinkNotAllowed { path: String },

    #[error("Path does not name a file inside the target directory: {path}")]
    NotAFilePath { path: String },
}

/// The filesystem (or transport) operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    Read,
    Write,
    Stat,
    CreateDir,
    ListDir,
    Clipboard,
    Stdin,
}

impl fmt::Display for FileOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Stat => "stat",
            Self::CreateDir => "create directory",
            Self::ListDir => "list directory",
            Self::Clipboard => "clipboard access",
            Self::Stdin => "stdin read",
        };
        f.write_str(label)
    }
}

/// Location context attached to an error for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    pub file_name: Option<String>,
    pub line_number: Option<usize>,
    pub column_number: Option<usize>,
    pub source: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file_name.is_none()
            && self.line_number.is_none()
            && self.column_number.is_none()
            && self.source.is_none()
    }

    /// Render `message` followed by the location line and source snippet.
    ///
    /// ```rust
    /// use clipack_utils::error::ErrorContext;
    ///
    /// let ctx = ErrorContext {
    ///     file_name: Some("test.ts".to_string()),
    ///     line_number: Some(10),
    ///     column_number: None,
    ///     source: Some("invalid line".to_string()),
    /// };
    /// assert_eq!(
    ///     ctx.format_message("Parse failed"),
    ///     "Parse failed\n  at File: test.ts, Line: 10\n  invalid line"
    /// );
    /// ```
    #[must_use]
    pub fn format_message(&self, message: &str) -> String {
        let mut output = message.to_string();

        let mut location = Vec::new();
        if let Some(file) = &self.file_name {
            location.push(format!("File: {file}"));
        }
        if let Some(line) = self.line_number {
            location.push(format!("Line: {line}"));
        }
        if let Some(column) = self.column_number {
            location.push(format!("Column: {column}"));
        }
        if !location.is_empty() {
            output.push_str("\n  at ");
            output.push_str(&location.join(", "));
        }

        if let Some(source) = &self.source {
            output.push_str("\n  ");
            output.push_str(source);
        }

        output
    }
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Parsing,
    Security,
    FileSystem,
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "Validation"),
            Self::Parsing => write!(f, "Parsing"),
            Self::Security => write!(f, "Security"),
            Self::FileSystem => write!(f, "File System"),
            Self::Internal => write!(f, "Internal"),
        }
    }
}

impl ClipackError {
    /// Build a `FileOperation` error for `path`.
    pub fn file_op(operation: FileOperation, path: impl fmt::Display, source: io::Error) -> Self {
        Self::FileOperation {
            operation,
            path: path.to_string(),
            source,
        }
    }

    /// Error kind for programmatic handling.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Parse(_) => ErrorKind::Parse,
            Self::Security(_) => ErrorKind::Security,
            Self::FileOperation { .. } => ErrorKind::FileOperation,
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Map this error to the CLI exit code.
    ///
    /// This is the single source of truth for exit codes.
    #[must_use]
    pub const fn to_exit_code(&self) -> ExitCode {
        ExitCode::for_kind(self.kind())
    }

    /// Location context: offending path, line number, and source snippet.
    #[must_use]
    pub fn error_context(&self) -> ErrorContext {
        match self {
            Self::Parse(ParseError::ContentBeforeHeader { line_number, line }) => ErrorContext {
                line_number: Some(*line_number),
                source: Some(line.clone()),
                ..ErrorContext::default()
            },
            Self::Parse(ParseError::NoFilesFound { preview }) => ErrorContext {
                source: Some(preview.clone()),
                ..ErrorContext::default()
            },
            Self::Security(
                SecurityError::DirectoryTraversal { path }
                | SecurityError::SymlinkNotAllowed { path }
                | SecurityError::NotAFilePath { path },
            ) => ErrorContext {
                file_name: Some(path.clone()),
                ..ErrorContext::default()
            },
            Self::FileOperation { path, .. } => ErrorContext {
                file_name: Some(path.clone()),
                ..ErrorContext::default()
            },
            Self::Validation(_) | Self::Unknown(_) => ErrorContext::default(),
        }
    }

    /// The display message followed by its location context.
    #[must_use]
    pub fn format_message(&self) -> String {
        self.error_context().format_message(&self.to_string())
    }

    /// Get a user-friendly error message with context and actionable suggestions.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error: {}\n", self.user_message()));

        let location = self.error_context();
        if !location.is_empty() {
            output.push_str(location.format_message("").trim_start_matches('\n'));
            output.push('\n');
        }

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }
}

impl UserFriendlyError for ClipackError {
    fn user_message(&self) -> String {
        match self {
            Self::Validation(ValidationError::MissingOption(name)) => {
                format!("{name} must be specified")
            }
            Self::Validation(ValidationError::InvalidValue { key, value }) => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::Validation(ValidationError::InvalidConfigFile { path, reason }) => {
                format!("Configuration file {path} could not be loaded: {reason}")
            }
            Self::Validation(ValidationError::NotADirectory { path }) => {
                format!("'{path}' is not a directory")
            }
            Self::Parse(ParseError::ContentBeforeHeader { line_number, .. }) => {
                format!("Bundle text has content before the first file header (line {line_number})")
            }
            Self::Parse(ParseError::NoFilesFound { .. }) => {
                "No valid files found in the bundle text".to_string()
            }
            Self::Security(SecurityError::DirectoryTraversal { path }) => {
                format!("Refusing path that escapes the target directory: {path}")
            }
            Self::Security(SecurityError::SymlinkNotAllowed { path }) => {
                format!("Refusing to follow symbolic link: {path}")
            }
            Self::Security(SecurityError::NotAFilePath { path }) => {
                format!("Refusing path that names the target directory itself: {path}")
            }
            Self::FileOperation {
                operation,
                path,
                source,
            } => format!("Failed to {operation} {path}: {source}"),
            Self::Unknown(message) => format!("Unexpected error: {message}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Parse(_) => Some(
                "Each file in a bundle starts with a header line of the form '// ./relative/path.ext'."
                    .to_string(),
            ),
            Self::Security(_) => Some(
                "Every path is checked against the target directory before any file is read or written."
                    .to_string(),
            ),
            Self::Validation(ValidationError::InvalidConfigFile { .. }) => Some(
                "clipack searches for .clipack/config.toml upward from the current directory."
                    .to_string(),
            ),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Validation(ValidationError::MissingOption(_)) => vec![
                "Pass the directory as the first argument of the subcommand".to_string(),
            ],
            Self::Validation(ValidationError::InvalidValue { key, .. }) => match key.as_str() {
                "selectors.include" | "selectors.exclude" => vec![
                    "Check the glob syntax (e.g. '**/*.rs', 'target/**')".to_string(),
                ],
                "format.header_prefix" => {
                    vec!["Use 'dot-slash' (default) or 'bare'".to_string()]
                }
                "format.preamble" => vec!["Use 'strict' (default) or 'lenient'".to_string()],
                _ => vec!["Remove the option to use the default value".to_string()],
            },
            Self::Validation(ValidationError::InvalidConfigFile { .. }) => vec![
                "Check the TOML syntax of the configuration file".to_string(),
                "Use --config to point at a different file".to_string(),
            ],
            Self::Validation(ValidationError::NotADirectory { .. }) => {
                vec!["Verify the path exists and is a directory".to_string()]
            }
            Self::Parse(ParseError::ContentBeforeHeader { .. }) => vec![
                "Remove stray text above the first '// ./' header".to_string(),
                "Use --lenient-preamble to ignore text before the first header".to_string(),
            ],
            Self::Parse(ParseError::NoFilesFound { .. }) => vec![
                "Verify the input was produced by 'clipack pack'".to_string(),
                "Check that each header is followed by file content".to_string(),
            ],
            Self::Security(SecurityError::DirectoryTraversal { .. }) => {
                vec!["Remove '..' segments and absolute paths from the bundle".to_string()]
            }
            Self::Security(SecurityError::SymlinkNotAllowed { .. }) => vec![
                "Replace the symbolic link with a regular file".to_string(),
                "Use --allow-symlinks if the link is trusted".to_string(),
            ],
            Self::Security(SecurityError::NotAFilePath { .. }) => {
                vec!["Give every header a file name, for example '// ./src/index.ts'".to_string()]
            }
            Self::FileOperation { .. } => vec![
                "Check file and directory permissions".to_string(),
                "Ensure sufficient disk space is available".to_string(),
            ],
            Self::Unknown(_) => vec!["Run with --verbose for more detailed output".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Parse(_) => ErrorCategory::Parsing,
            Self::Security(_) => ErrorCategory::Security,
            Self::FileOperation { .. } => ErrorCategory::FileSystem,
            Self::Unknown(_) => ErrorCategory::Internal,
        }
    }
}
