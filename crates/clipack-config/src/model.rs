use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use clipack_bundle::{HeaderPrefix, ParseOptions, PreamblePolicy};
use clipack_selectors::Selectors;
use clipack_utils::error::{ClipackError, ValidationError};
use clipack_utils::types::ConfigSource;

/// Effective configuration after merging CLI, file, and defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub defaults: Defaults,
    pub selectors: Selectors,
    pub format: FormatSettings,
    /// The configuration file that was loaded, if any
    pub config_path: Option<PathBuf>,
    pub source_attribution: HashMap<String, ConfigSource>,
}

/// `[defaults]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    pub dry_run: Option<bool>,
    pub allow_symlinks: Option<bool>,
    pub verbose: Option<bool>,
}

/// `[format]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FormatSettings {
    /// `"dot-slash"` or `"bare"`
    pub header_prefix: Option<String>,
    /// `"strict"` or `"lenient"`
    pub preamble: Option<String>,
}

impl Config {
    #[must_use]
    pub fn dry_run(&self) -> bool {
        self.defaults.dry_run.unwrap_or(false)
    }

    #[must_use]
    pub fn allow_symlinks(&self) -> bool {
        self.defaults.allow_symlinks.unwrap_or(false)
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.defaults.verbose.unwrap_or(false)
    }

    /// Convert the header prefix label to its enum.
    pub fn header_prefix(&self) -> Result<HeaderPrefix, ClipackError> {
        match self.format.header_prefix.as_deref() {
            None => Ok(HeaderPrefix::default()),
            Some(label) => HeaderPrefix::from_label(label).ok_or_else(|| {
                ValidationError::InvalidValue {
                    key: "format.header_prefix".to_string(),
                    value: format!("Unknown header prefix: {label}"),
                }
                .into()
            }),
        }
    }

    /// Convert the preamble label to its enum.
    pub fn preamble(&self) -> Result<PreamblePolicy, ClipackError> {
        match self.format.preamble.as_deref() {
            None => Ok(PreamblePolicy::default()),
            Some(label) => PreamblePolicy::from_label(label).ok_or_else(|| {
                ValidationError::InvalidValue {
                    key: "format.preamble".to_string(),
                    value: format!("Unknown preamble policy: {label}"),
                }
                .into()
            }),
        }
    }

    pub fn parse_options(&self) -> Result<ParseOptions, ClipackError> {
        Ok(ParseOptions {
            header_prefix: self.header_prefix()?,
            preamble: self.preamble()?,
        })
    }

    /// Validate glob patterns and enum labels.
    pub fn validate(&self) -> Result<(), ClipackError> {
        self.selectors.validate()?;
        self.parse_options()?;
        Ok(())
    }
}
