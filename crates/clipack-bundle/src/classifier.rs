//! Header line recognition.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{BundleLine, HeaderPrefix};

/// Characters that mark prose rather than a path.
const PROSE_CHARS: &[char] = &['(', ')', '\u{FF1A}', '\u{3002}', '\u{3001}'];

/// Something with an extension and none of the characters reserved on common filesystems.
static WITH_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[^<>:"|?*\n]+\.[A-Za-z0-9]+$"#).expect("valid regex"));

/// Only ASCII word characters, hyphens, dots and slashes.
static PLAIN_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-./]+$").expect("valid regex"));

/// Classify a line using the default `// ./` marker.
///
/// ```rust
/// use clipack_bundle::{BundleLine, classify};
///
/// assert_eq!(
///     classify("// ./src/main.ts"),
///     BundleLine::Header { path: "src/main.ts".to_string() }
/// );
/// assert_eq!(classify("// just a comment"), BundleLine::NotHeader);
/// ```
#[must_use]
pub fn classify(line: &str) -> BundleLine {
    classify_with(line, HeaderPrefix::DotSlash)
}

/// Classify a line using the given header marker.
#[must_use]
pub fn classify_with(line: &str, prefix: HeaderPrefix) -> BundleLine {
    let Some(rest) = line.strip_prefix(prefix.marker()) else {
        return BundleLine::NotHeader;
    };

    let mut path = rest.trim();
    if prefix == HeaderPrefix::Bare {
        path = path.strip_prefix("./").unwrap_or(path).trim_start();
    }

    if looks_like_path(path) {
        BundleLine::Header {
            path: path.to_string(),
        }
    } else {
        BundleLine::NotHeader
    }
}

fn looks_like_path(candidate: &str) -> bool {
    if candidate.is_empty() || candidate.contains(PROSE_CHARS) {
        return false;
    }

    WITH_EXTENSION.is_match(candidate) || candidate.contains('/') || PLAIN_PATH.is_match(candidate)
}
