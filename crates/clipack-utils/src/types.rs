use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of error kinds surfaced by clipack operations.
///
/// Every [`ClipackError`](crate::error::ClipackError) maps to exactly one kind,
/// and every kind maps to exactly one exit code.
///
/// # Serialization
///
/// Kinds serialize in snake_case:
///
/// ```rust
/// use clipack_utils::types::ErrorKind;
///
/// let json = serde_json::to_string(&ErrorKind::FileOperation).unwrap();
/// assert_eq!(json, r#""file_operation""#);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A required option was missing or a configuration value is invalid.
    Validation,
    /// Bundle text is malformed.
    Parse,
    /// Path traversal or a disallowed symlink was detected.
    Security,
    /// An underlying read, write, or stat failed.
    FileOperation,
    /// Anything not classified above.
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Parse => "parse",
            Self::Security => "security",
            Self::FileOperation => "file_operation",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of a configuration value.
///
/// Used by `Config::effective_config()` to attribute each effective value.
///
/// ```rust
/// use clipack_utils::types::ConfigSource;
///
/// let json = serde_json::to_string(&ConfigSource::Cli).unwrap();
/// assert_eq!(json, r#""cli""#);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Value provided via CLI argument (highest precedence).
    Cli,
    /// Value loaded from configuration file.
    Config,
    /// Built-in default value (lowest precedence).
    Default,
}

impl ConfigSource {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cli => "cli",
            Self::Config => "config",
            Self::Default => "default",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_serialization() {
        let cases = [
            (ErrorKind::Validation, r#""validation""#),
            (ErrorKind::Parse, r#""parse""#),
            (ErrorKind::Security, r#""security""#),
            (ErrorKind::FileOperation, r#""file_operation""#),
            (ErrorKind::Unknown, r#""unknown""#),
        ];

        for (kind, expected) in cases {
            assert_eq!(serde_json::to_string(&kind).unwrap(), expected);
            let back: ErrorKind = serde_json::from_str(expected).unwrap();
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn test_error_kind_display_matches_serialization() {
        assert_eq!(ErrorKind::FileOperation.to_string(), "file_operation");
        assert_eq!(ErrorKind::Parse.to_string(), "parse");
    }

    #[test]
    fn test_config_source_labels() {
        assert_eq!(ConfigSource::Cli.as_str(), "cli");
        assert_eq!(ConfigSource::Config.as_str(), "config");
        assert_eq!(ConfigSource::Default.as_str(), "default");
    }
}
