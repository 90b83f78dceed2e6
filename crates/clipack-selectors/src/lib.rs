//! Include/exclude glob selection of files for packing.
//!
//! [`Selectors`] is the configured pattern lists; [`FileFilter`] is their
//! compiled form, matched against `/`-separated paths relative to the
//! pack root.

use clipack_utils::error::{ClipackError, ValidationError};
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};

/// Patterns selected for packing when nothing else is configured.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &["**/*.ts", "**/*.js"];

/// Patterns excluded from packing when nothing else is configured.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["node_modules/**"];

/// File selection configuration
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Selectors {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            include: DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            exclude: DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl Selectors {
    /// Validate glob patterns in selectors
    pub fn validate(&self) -> Result<(), ClipackError> {
        for pattern in &self.include {
            build_glob(pattern, "selectors.include")?;
        }
        for pattern in &self.exclude {
            build_glob(pattern, "selectors.exclude")?;
        }
        Ok(())
    }
}

/// `*` and `?` stop at `/`; only `**` crosses directories.
fn build_glob(pattern: &str, key: &str) -> Result<Glob, ClipackError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| {
            ValidationError::InvalidValue {
                key: key.to_string(),
                value: format!("Invalid glob pattern '{pattern}': {e}"),
            }
            .into()
        })
}

fn build_set(patterns: &[String], key: &str) -> Result<GlobSet, ClipackError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(build_glob(pattern, key)?);
    }
    builder.build().map_err(|e| {
        ValidationError::InvalidValue {
            key: key.to_string(),
            value: e.to_string(),
        }
        .into()
    })
}

/// Compiled include/exclude matcher over relative paths.
///
/// A path is a target when it matches no exclude pattern and at least one
/// include pattern. Paths are matched with `/` separators.
///
/// Globs match dotfiles and dot-directories (`**/*.ts` selects `.hidden/a.ts`),
/// unlike minimatch's `dot: false` default.
#[derive(Debug, Clone)]
pub struct FileFilter {
    include: GlobSet,
    exclude: GlobSet,
}

impl FileFilter {
    /// Compile the given pattern lists.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidValue`] for a malformed glob.
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, ClipackError> {
        Ok(Self {
            include: build_set(include, "selectors.include")?,
            exclude: build_set(exclude, "selectors.exclude")?,
        })
    }

    pub fn from_selectors(selectors: &Selectors) -> Result<Self, ClipackError> {
        Self::new(&selectors.include, &selectors.exclude)
    }

    /// Whether `relative_path` participates in a pack.
    #[must_use]
    pub fn is_target(&self, relative_path: &str) -> bool {
        let path = to_forward_slashes(relative_path);
        let path = path.strip_prefix("./").unwrap_or(&path);

        if self.exclude.is_match(path) {
            return false;
        }
        self.include.is_match(path)
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        // Built-in patterns are constant and always compile.
        let selectors = Selectors::default();
        let compile = |patterns: &[String]| {
            let mut builder = GlobSetBuilder::new();
            for pattern in patterns {
                if let Ok(glob) = GlobBuilder::new(pattern).literal_separator(true).build() {
                    builder.add(glob);
                }
            }
            builder.build().unwrap_or_else(|_| GlobSet::empty())
        };
        Self {
            include: compile(&selectors.include),
            exclude: compile(&selectors.exclude),
        }
    }
}

/// One-shot form of [`FileFilter::is_target`].
///
/// # Errors
///
/// Returns [`ValidationError::InvalidValue`] for a malformed glob.
pub fn is_target(
    relative_path: &str,
    include: &[String],
    exclude: &[String],
) -> Result<bool, ClipackError> {
    Ok(FileFilter::new(include, exclude)?.is_target(relative_path))
}

fn to_forward_slashes(path: &str) -> String {
    if cfg!(windows) {
        path.replace('\\', "/")
    } else {
        path.to_string()
    }
}
