use camino::{Utf8Path, Utf8PathBuf};

use clipack_utils::error::{ClipackError, ValidationError};
use clipack_utils::paths::SecurityOptions;

/// Options shared by extract and pack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Parse and check everything, but write nothing.
    pub dry_run: bool,
    /// Read extract input from, or write pack output to, the clipboard.
    pub use_clipboard: bool,
    /// Extraction target.
    pub output_dir: Option<Utf8PathBuf>,
    /// Pack source.
    pub input_dir: Option<Utf8PathBuf>,
    pub allow_symlinks: bool,
}

impl ProcessOptions {
    #[must_use]
    pub fn security_options(&self) -> SecurityOptions {
        SecurityOptions {
            allow_symlinks: self.allow_symlinks,
        }
    }

    /// # Errors
    ///
    /// [`ValidationError::MissingOption`] when no output directory is set.
    pub fn require_output_dir(&self) -> Result<&Utf8Path, ClipackError> {
        self.output_dir
            .as_deref()
            .ok_or_else(|| ValidationError::MissingOption("Output directory".to_string()).into())
    }

    /// # Errors
    ///
    /// [`ValidationError::MissingOption`] when no input directory is set.
    pub fn require_input_dir(&self) -> Result<&Utf8Path, ClipackError> {
        self.input_dir
            .as_deref()
            .ok_or_else(|| ValidationError::MissingOption("Input directory".to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directories() {
        let options = ProcessOptions::default();
        assert_eq!(
            options.require_output_dir().unwrap_err().to_string(),
            "Validation error: Output directory must be specified"
        );
        assert_eq!(
            options.require_input_dir().unwrap_err().to_string(),
            "Validation error: Input directory must be specified"
        );
    }

    #[test]
    fn test_security_options_follow_allow_symlinks() {
        let options = ProcessOptions {
            allow_symlinks: true,
            ..ProcessOptions::default()
        };
        assert!(options.security_options().allow_symlinks);
        assert!(!ProcessOptions::default().security_options().allow_symlinks);
    }
}
