use std::path::PathBuf;

/// Values supplied on the command line.
///
/// Boolean flags only override lower layers when set.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub dry_run: bool,
    pub verbose: bool,
    pub allow_symlinks: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub header_prefix: Option<String>,
    pub lenient_preamble: bool,
}
