//! Bundle text handling for clipack.
//!
//! A bundle is plain text where each file starts with a header line
//! `// ./relative/path.ext`, followed by a blank line and the file body.
//!
//! ```rust
//! use clipack_bundle::{FileRecord, format_records, parse};
//!
//! let records = vec![FileRecord::new("src/a.ts", "export const a = 1;")];
//! let text = format_records(&records);
//! assert_eq!(text, "// ./src/a.ts\n\nexport const a = 1;\n");
//! assert_eq!(parse(&text).unwrap(), vec![FileRecord::new("src/a.ts", "export const a = 1;\n")]);
//! ```

pub mod classifier;
pub mod formatter;
pub mod model;
pub mod parser;

pub use classifier::{classify, classify_with};
pub use formatter::{format_records, to_relative_path};
pub use model::{BundleLine, FileRecord, HeaderPrefix, ParseOptions, PreamblePolicy, trim_empty_lines};
pub use parser::{parse, parse_with};
