//! File records to bundle text.

use crate::model::{FileRecord, trim_empty_lines};

/// Render records as bundle text in the canonical `// ./` form.
///
/// Each record becomes a header line, a blank line, and its trimmed body.
/// Output for an empty slice is `"\n"`.
#[must_use]
pub fn format_records(records: &[FileRecord]) -> String {
    if records.is_empty() {
        return "\n".to_string();
    }

    let mut output = String::new();
    for record in records {
        output.push_str("// ");
        output.push_str(&to_relative_path(&record.path));
        output.push_str("\n\n");
        output.push_str(&trim_empty_lines(&record.content));
    }
    output
}

/// Prefix `path` with `./` unless it already has it.
///
/// Backslashes are converted to `/` so bundles are portable.
#[must_use]
pub fn to_relative_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    if path.starts_with("./") {
        path
    } else {
        format!("./{path}")
    }
}
