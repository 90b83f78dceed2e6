//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Builds CliArgs and discovers Config
//! - Initializes tracing and creates the tokio runtime
//! - Dispatches to command handlers
//! - Handles all error output

use clap::Parser;

use super::args::{Cli, Commands};
use super::commands;

use crate::{ClipackError, CliArgs, Config, ExitCode};

/// Main CLI execution function.
///
/// This function handles ALL output including errors. It returns `Result<(), ExitCode>`:
/// - On success: returns `Ok(())` after printing any output
/// - On error: prints the user-facing report to stderr, returns `Err(ExitCode)`
///
/// main.rs only calls `std::process::exit(code.as_i32())` on error - it does NOT print.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        dry_run: cli.dry_run,
        verbose: cli.verbose,
        allow_symlinks: cli.allow_symlinks,
        include: cli.include.clone(),
        exclude: cli.exclude.clone(),
        header_prefix: cli.header_prefix.clone(),
        lenient_preamble: cli.lenient_preamble,
    };

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            eprint!("{}", err.display_for_user());
            return Err(err.to_exit_code());
        }
    };

    // A second subscriber (embedding, tests) is not fatal.
    if let Err(e) = clipack_utils::logging::init_tracing(config.verbose()) {
        eprintln!("warning: logging not initialized: {e}");
    }
    tracing::debug!(config_file = ?config.config_path, "configuration loaded");

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let result = rt.block_on(async {
        match cli.command {
            Commands::Extract { output_dir } => {
                commands::execute_extract_command(output_dir.as_deref(), cli.clipboard, &config)
                    .await
            }
            Commands::Pack { input_dir } => {
                commands::execute_pack_command(input_dir.as_deref(), cli.clipboard, &config).await
            }
            Commands::Config { json } => commands::execute_config_command(json, &config),
        }
    });

    if let Err(err) = result {
        if let Some(clipack_err) = err.downcast_ref::<ClipackError>() {
            eprint!("{}", clipack_err.display_for_user());
            return Err(clipack_err.to_exit_code());
        }

        eprintln!("✗ Unexpected error: {err:#}");
        eprintln!("\n  General troubleshooting:");
        eprintln!("    - Run with --verbose for more detailed output");
        eprintln!("    - Set CLIPACK_LOG=clipack=debug to trace each file");
        return Err(ExitCode::INTERNAL);
    }

    Ok(())
}
