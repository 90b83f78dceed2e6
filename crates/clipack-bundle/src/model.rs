use serde::{Deserialize, Serialize};

/// One file carried by a bundle.
///
/// `path` is relative with `/` separators and no leading `./`.
/// Parsed content always ends with exactly one newline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub content: String,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Classification of a single bundle line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleLine {
    /// Starts a new file; carries the bare relative path.
    Header { path: String },
    NotHeader,
}

/// Header marker accepted by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderPrefix {
    /// `// ./path`
    #[default]
    DotSlash,
    /// `// path`, with an optional `./` that is stripped
    Bare,
}

impl HeaderPrefix {
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::DotSlash => "// ./",
            Self::Bare => "// ",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DotSlash => "dot-slash",
            Self::Bare => "bare",
        }
    }

    /// Parse a config/CLI label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "dot-slash" => Some(Self::DotSlash),
            "bare" => Some(Self::Bare),
            _ => None,
        }
    }
}

/// How text before the first header is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreamblePolicy {
    /// Only blank lines and comments may precede the first header.
    #[default]
    Strict,
    /// Everything before the first header is ignored.
    Lenient,
}

impl PreamblePolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "strict" => Some(Self::Strict),
            "lenient" => Some(Self::Lenient),
            _ => None,
        }
    }
}

/// Parser settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub header_prefix: HeaderPrefix,
    pub preamble: PreamblePolicy,
}

/// Strip all leading and trailing newlines, then append exactly one.
///
/// ```rust
/// use clipack_bundle::trim_empty_lines;
///
/// assert_eq!(trim_empty_lines("\n\ncontent\n\n"), "content\n");
/// assert_eq!(trim_empty_lines(""), "\n");
/// ```
#[must_use]
pub fn trim_empty_lines(text: &str) -> String {
    let mut trimmed = text.trim_matches('\n').to_string();
    trimmed.push('\n');
    trimmed
}
