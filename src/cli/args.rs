//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface structure using clap,
//! including the main `Cli` struct and the subcommand enum.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// clipack - bundle source files into one text block and back
#[derive(Parser, Debug)]
#[command(name = "clipack")]
#[command(about = "Pack a directory into a text bundle, or extract a bundle into files")]
#[command(long_about = r#"
clipack moves a set of source files through a single block of text. Each file
appears in the bundle as a `// ./path` header line, a blank line, and its body.

EXAMPLES:
  # Bundle the .ts/.js files under ./src to stdout
  clipack pack ./src > bundle.txt

  # Recreate the files from a bundle on stdin
  clipack extract ./restored < bundle.txt

  # Copy a bundle to the clipboard, then paste it back out elsewhere
  clipack --clipboard pack ./src
  clipack --clipboard extract ./restored

  # See what extract would write without touching the disk
  clipack --dry-run --verbose extract ./restored < bundle.txt

  # Pack Rust sources instead of the default patterns
  clipack --include '**/*.rs' --exclude 'target/**' pack .

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  Config file is discovered by searching upward from CWD for .clipack/config.toml
  Use --config to specify an explicit config file path
  Use `clipack config` to print the effective values and where each came from

LOGGING:
  Diagnostics go to stderr. Set CLIPACK_LOG (or RUST_LOG) to a tracing filter,
  for example CLIPACK_LOG=clipack=debug
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Parse and check everything but write nothing
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Read the bundle from (extract) or copy it to (pack) the system clipboard
    #[arg(long, global = true)]
    pub clipboard: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Accept paths that pass through symbolic links
    #[arg(long, global = true)]
    pub allow_symlinks: bool,

    /// Glob selecting files to pack (repeatable, replaces the configured list)
    #[arg(long, global = true, value_name = "GLOB")]
    pub include: Vec<String>,

    /// Glob excluding files from pack (repeatable, replaces the configured list)
    #[arg(long, global = true, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Header form recognized when extracting
    #[arg(long, global = true, value_parser = ["dot-slash", "bare"])]
    pub header_prefix: Option<String>,

    /// Skip any text before the first header instead of rejecting it
    #[arg(long, global = true)]
    pub lenient_preamble: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write every file in a bundle (from stdin or the clipboard) under OUTPUT_DIR
    Extract {
        /// Directory the bundle's files are written into
        output_dir: Option<PathBuf>,
    },

    /// Bundle the selected files under INPUT_DIR
    Pack {
        /// Directory whose files are bundled
        input_dir: Option<PathBuf>,
    },

    /// Show the effective configuration and the source of each value
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Build the CLI command structure for testing and introspection
#[must_use]
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}
