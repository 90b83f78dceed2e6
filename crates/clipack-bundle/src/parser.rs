//! Bundle text to file records.

use clipack_utils::error::{ClipackError, ParseError};

use crate::classifier::classify_with;
use crate::model::{
    BundleLine, FileRecord, HeaderPrefix, ParseOptions, PreamblePolicy, trim_empty_lines,
};

/// Characters of input shown when no file could be found.
const PREVIEW_CHARS: usize = 100;

/// Parse bundle text with the default options.
///
/// # Errors
///
/// - [`ParseError::ContentBeforeHeader`] for stray text before the first header
/// - [`ParseError::NoFilesFound`] when no header has a body
pub fn parse(text: &str) -> Result<Vec<FileRecord>, ClipackError> {
    parse_with(text, ParseOptions::default())
}

/// Parse bundle text.
///
/// Records come back in input order. A header immediately followed by
/// another header produces no record. Duplicate paths are kept.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_with(text: &str, options: ParseOptions) -> Result<Vec<FileRecord>, ClipackError> {
    let normalized = text.replace("\r\n", "\n");

    let mut records = Vec::new();
    let mut current_path: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    for (index, line) in normalized.split('\n').enumerate() {
        match classify_with(line, options.header_prefix) {
            BundleLine::Header { path } => {
                if let Some(previous) = current_path.take()
                    && !body.is_empty()
                {
                    records.push(FileRecord::new(previous, trim_empty_lines(&body.join("\n"))));
                }
                body.clear();
                current_path = Some(path);
            }
            BundleLine::NotHeader if current_path.is_some() => body.push(line),
            BundleLine::NotHeader => {
                if options.preamble == PreamblePolicy::Strict && !is_ignorable_preamble(line) {
                    return Err(ParseError::ContentBeforeHeader {
                        line_number: index + 1,
                        line: line.to_string(),
                    }
                    .into());
                }
            }
        }
    }

    if let Some(path) = current_path
        && !body.is_empty()
    {
        records.push(FileRecord::new(path, trim_empty_lines(&body.join("\n"))));
    }

    if records.is_empty() {
        return Err(ParseError::NoFilesFound {
            preview: text.chars().take(PREVIEW_CHARS).collect(),
        }
        .into());
    }

    Ok(records)
}

/// Blank lines and ordinary comments may precede the first header.
///
/// A `// ./` line that failed classification is a malformed header, not a comment.
fn is_ignorable_preamble(line: &str) -> bool {
    if line.starts_with(HeaderPrefix::DotSlash.marker()) {
        return false;
    }
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
        || trimmed.starts_with('#')
}
