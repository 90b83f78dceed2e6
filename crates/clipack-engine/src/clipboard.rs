//! Clipboard access through the platform's command-line tools.

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::sync::{Mutex, PoisonError};

use clipack_utils::error::{ClipackError, FileOperation};

/// Path label used in clipboard errors.
pub const CLIPBOARD_LABEL: &str = "<clipboard>";

/// Source and sink for bundle text.
pub trait ClipboardTransport: Send + Sync {
    fn read(&self) -> Result<String, ClipackError>;
    fn write(&self, text: &str) -> Result<(), ClipackError>;
}

fn clipboard_err(source: io::Error) -> ClipackError {
    ClipackError::file_op(FileOperation::Clipboard, CLIPBOARD_LABEL, source)
}

/// Paste and copy commands for one clipboard tool.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ToolPair {
    paste: &'static [&'static str],
    copy: &'static [&'static str],
}

/// Probe order: macOS, Wayland, X11 (xclip then xsel), Windows.
const TOOLS: &[ToolPair] = &[
    ToolPair {
        paste: &["pbpaste"],
        copy: &["pbcopy"],
    },
    ToolPair {
        paste: &["wl-paste", "--no-newline"],
        copy: &["wl-copy"],
    },
    ToolPair {
        paste: &["xclip", "-selection", "clipboard", "-o"],
        copy: &["xclip", "-selection", "clipboard"],
    },
    ToolPair {
        paste: &["xsel", "--clipboard", "--output"],
        copy: &["xsel", "--clipboard", "--input"],
    },
    ToolPair {
        paste: &["powershell", "-NoProfile", "-Command", "Get-Clipboard"],
        copy: &["clip"],
    },
];

/// The system clipboard, driven by the first available platform tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemClipboard {
    tool: ToolPair,
}

impl SystemClipboard {
    /// Locate a clipboard tool on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns a clipboard [`ClipackError::FileOperation`] when no tool is installed.
    pub fn detect() -> Result<Self, ClipackError> {
        TOOLS
            .iter()
            .find(|pair| which::which(pair.paste[0]).is_ok() && which::which(pair.copy[0]).is_ok())
            .map(|pair| Self { tool: pair.clone() })
            .ok_or_else(|| {
                let tried: Vec<&str> = TOOLS.iter().map(|pair| pair.paste[0]).collect();
                clipboard_err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no clipboard tool found (tried {})", tried.join(", ")),
                ))
            })
    }

    /// Name of the paste program in use.
    #[must_use]
    pub fn tool_name(&self) -> &'static str {
        self.tool.paste[0]
    }
}

fn command_for(argv: &[&str]) -> Command {
    let mut command = Command::new(argv[0]);
    command.args(&argv[1..]);
    command
}

fn status_error(program: &str, status: std::process::ExitStatus, stderr: &[u8]) -> io::Error {
    io::Error::other(format!(
        "{program} exited with {status}: {}",
        String::from_utf8_lossy(stderr).trim()
    ))
}

impl ClipboardTransport for SystemClipboard {
    fn read(&self) -> Result<String, ClipackError> {
        let output = command_for(self.tool.paste)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(clipboard_err)?;

        if !output.status.success() {
            return Err(clipboard_err(status_error(
                self.tool.paste[0],
                output.status,
                &output.stderr,
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| clipboard_err(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    fn write(&self, text: &str) -> Result<(), ClipackError> {
        let mut child = command_for(self.tool.copy)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(clipboard_err)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).map_err(clipboard_err)?;
        }

        let output = child.wait_with_output().map_err(clipboard_err)?;
        if !output.status.success() {
            return Err(clipboard_err(status_error(
                self.tool.copy[0],
                output.status,
                &output.stderr,
            )));
        }
        Ok(())
    }
}

/// In-process clipboard for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<String>,
}

impl MemoryClipboard {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(initial.into()),
        }
    }

    #[must_use]
    pub fn contents(&self) -> String {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ClipboardTransport for MemoryClipboard {
    fn read(&self) -> Result<String, ClipackError> {
        Ok(self.contents())
    }

    fn write(&self, text: &str) -> Result<(), ClipackError> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = text.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipack_utils::types::ErrorKind;

    #[test]
    fn test_memory_clipboard_round_trip() {
        let clipboard = MemoryClipboard::new("initial");
        assert_eq!(clipboard.read().unwrap(), "initial");
        clipboard.write("// ./a.ts\n\nx\n").unwrap();
        assert_eq!(clipboard.contents(), "// ./a.ts\n\nx\n");
    }

    #[test]
    fn test_memory_clipboard_as_trait_object() {
        let clipboard: Box<dyn ClipboardTransport> = Box::new(MemoryClipboard::default());
        clipboard.write("text").unwrap();
        assert_eq!(clipboard.read().unwrap(), "text");
    }

    #[test]
    fn test_tool_table_has_argv() {
        for pair in TOOLS {
            assert!(!pair.paste.is_empty());
            assert!(!pair.copy.is_empty());
        }
    }

    #[test]
    fn test_detect_reports_clipboard_label_on_failure() {
        // Either a tool is present on this machine or the error names the clipboard.
        match SystemClipboard::detect() {
            Ok(clipboard) => assert!(!clipboard.tool_name().is_empty()),
            Err(err) => {
                assert_eq!(err.kind(), ErrorKind::FileOperation);
                assert!(err.to_string().contains(CLIPBOARD_LABEL));
            }
        }
    }
}
