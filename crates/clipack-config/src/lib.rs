//! Configuration management for clipack
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > file > defaults. Reads `.clipack/config.toml` with `[defaults]`,
//! `[selectors]`, and `[format]` sections.

mod cli_args;
mod discovery;
mod model;
mod sources;

pub use cli_args::CliArgs;
pub use clipack_selectors::Selectors;
pub use clipack_utils::types::ConfigSource;
pub use discovery::{CONFIG_DIR, CONFIG_FILE};
pub use model::{Config, Defaults, FormatSettings};
