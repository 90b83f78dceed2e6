//! Logging infrastructure for clipack
//!
//! Structured logging goes through `tracing`. All output is written to
//! stderr so that `clipack pack` can stream a bundle on stdout.

use tracing::{Level, debug, info, span, warn};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV_VAR: &str = "CLIPACK_LOG";

/// Build the filter: `CLIPACK_LOG`, then `RUST_LOG`, then the built-in default.
fn build_env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(default_directives(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "clipack=debug,info"
    } else {
        "clipack=info,warn"
    }
}

/// Initialize tracing subscriber for structured logging
///
/// Sets up tracing with either compact (default) or verbose format.
/// Verbose format includes targets and span close events with timings.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = build_env_filter(verbose);

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Create a span for one top-level operation with structured fields
///
/// # Arguments
/// * `module` - The component name (e.g. `"processor"`)
/// * `function` - The operation name (e.g. `"extract"`)
pub fn operation_span(module: &str, function: &str) -> tracing::Span {
    span!(
        Level::INFO,
        "operation",
        module = %module,
        function = %function,
    )
}

/// Log a per-file event (write, read, skip) at debug level.
pub fn log_file_event(module: &str, function: &str, path: &str, action: &str) {
    debug!(
        module = %module,
        function = %function,
        path = %path,
        action = %action,
        "File event"
    );
}

/// Log operation completion with a file count and duration.
pub fn log_operation_complete(module: &str, function: &str, file_count: usize, duration_ms: u128) {
    info!(
        module = %module,
        function = %function,
        file_count = file_count,
        duration_ms = %duration_ms,
        "Operation completed"
    );
}

/// Log an entry that was passed over, with the reason.
pub fn log_skipped(module: &str, function: &str, path: &str, reason: &str) {
    warn!(
        module = %module,
        function = %function,
        path = %path,
        reason = %reason,
        "Skipping entry"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives(false), "clipack=info,warn");
        assert_eq!(default_directives(true), "clipack=debug,info");
    }

    #[test]
    fn test_operation_span_is_constructible() {
        // Without a subscriber the span is disabled but must still build.
        let span = operation_span("processor", "extract");
        let _guard = span.enter();
        log_file_event("processor", "extract", "src/a.ts", "write");
        log_operation_complete("processor", "extract", 1, 3);
        log_skipped("enumerate", "walk", "bad\u{fffd}name", "non-UTF-8 file name");
    }

    #[test]
    fn test_init_tracing_twice_reports_error() {
        // The first call may fail if another test installed a subscriber first;
        // either way the second call must fail.
        let _ = init_tracing(false);
        assert!(init_tracing(true).is_err());
    }
}
