//! Extract and pack operations for clipack.
//!
//! [`BundleProcessor`] ties the bundle parser and formatter to the
//! filesystem. Every path goes through the security check before it is
//! written or read.

pub mod clipboard;
pub mod enumerate;
pub mod options;
pub mod processor;

pub use clipboard::{ClipboardTransport, MemoryClipboard, SystemClipboard};
pub use enumerate::list_files;
pub use options::ProcessOptions;
pub use processor::{BundleProcessor, read_input};
