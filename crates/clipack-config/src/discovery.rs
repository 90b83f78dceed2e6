use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use clipack_bundle::{HeaderPrefix, PreamblePolicy};
use clipack_utils::error::{ClipackError, FileOperation, ValidationError};
use clipack_utils::types::ConfigSource;

use super::{CliArgs, Config, Defaults, FormatSettings};

/// Directory that holds the configuration file.
pub const CONFIG_DIR: &str = ".clipack";

/// Configuration file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    defaults: Option<Defaults>,
    selectors: Option<TomlSelectors>,
    format: Option<FormatSettings>,
}

/// Selector lists as written in the file; absent lists keep their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlSelectors {
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Uses the current working directory for discovery when no explicit
    /// path is provided in `cli_args`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self, ClipackError> {
        let start_dir = std::env::current_dir()
            .map_err(|e| ClipackError::file_op(FileOperation::Stat, ".", e))?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory
    ///
    /// This is the path-driven variant used by tests to avoid process-global state.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self, ClipackError> {
        let mut config = Config::default();
        let mut attribution = HashMap::new();

        for key in [
            "dry_run",
            "allow_symlinks",
            "verbose",
            "selectors_include",
            "selectors_exclude",
            "header_prefix",
            "preamble",
        ] {
            attribution.insert(key.to_string(), ConfigSource::Default);
        }
        config.defaults = Defaults {
            dry_run: Some(false),
            allow_symlinks: Some(false),
            verbose: Some(false),
        };
        config.format = FormatSettings {
            header_prefix: Some(HeaderPrefix::default().as_str().to_string()),
            preamble: Some(PreamblePolicy::default().as_str().to_string()),
        };

        let config_path = match &cli_args.config_path {
            Some(explicit) => Some(explicit.clone()),
            None => Self::discover_config_file_from(start_dir),
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)?;
            apply_file(&mut config, file_config, &mut attribution);
        }
        config.config_path = config_path;

        apply_cli(&mut config, cli_args, &mut attribution);
        config.source_attribution = attribution;

        config.validate()?;
        Ok(config)
    }

    /// Search upward from `start_dir` for `.clipack/config.toml`.
    ///
    /// Stops at the filesystem root or at a repository root
    /// (`.git`, `.hg`, `.svn`).
    #[must_use]
    pub fn discover_config_file_from(start_dir: &Path) -> Option<PathBuf> {
        let mut current_dir = start_dir;

        loop {
            let config_path = current_dir.join(CONFIG_DIR).join(CONFIG_FILE);
            if config_path.is_file() {
                return Some(config_path);
            }

            if [".git", ".hg", ".svn"]
                .iter()
                .any(|marker| current_dir.join(marker).exists())
            {
                return None;
            }

            current_dir = current_dir.parent()?;
        }
    }

    /// Load configuration from a TOML file.
    fn load_config_file(path: &Path) -> Result<TomlConfig, ClipackError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ValidationError::InvalidConfigFile {
                path: path.display().to_string(),
                reason: "file not found".to_string(),
            }
            .into(),
            _ => ClipackError::file_op(FileOperation::Read, path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| {
            ValidationError::InvalidConfigFile {
                path: path.display().to_string(),
                reason: e.message().to_string(),
            }
            .into()
        })
    }
}

fn apply_file(
    config: &mut Config,
    file_config: TomlConfig,
    attribution: &mut HashMap<String, ConfigSource>,
) {
    let mut set = |key: &str| {
        attribution.insert(key.to_string(), ConfigSource::Config);
    };

    if let Some(defaults) = file_config.defaults {
        if defaults.dry_run.is_some() {
            config.defaults.dry_run = defaults.dry_run;
            set("dry_run");
        }
        if defaults.allow_symlinks.is_some() {
            config.defaults.allow_symlinks = defaults.allow_symlinks;
            set("allow_symlinks");
        }
        if defaults.verbose.is_some() {
            config.defaults.verbose = defaults.verbose;
            set("verbose");
        }
    }

    if let Some(selectors) = file_config.selectors {
        if let Some(include) = selectors.include {
            config.selectors.include = include;
            set("selectors_include");
        }
        if let Some(exclude) = selectors.exclude {
            config.selectors.exclude = exclude;
            set("selectors_exclude");
        }
    }

    if let Some(format) = file_config.format {
        if format.header_prefix.is_some() {
            config.format.header_prefix = format.header_prefix;
            set("header_prefix");
        }
        if format.preamble.is_some() {
            config.format.preamble = format.preamble;
            set("preamble");
        }
    }
}

fn apply_cli(config: &mut Config, cli: &CliArgs, attribution: &mut HashMap<String, ConfigSource>) {
    let mut set = |key: &str| {
        attribution.insert(key.to_string(), ConfigSource::Cli);
    };

    if cli.dry_run {
        config.defaults.dry_run = Some(true);
        set("dry_run");
    }
    if cli.allow_symlinks {
        config.defaults.allow_symlinks = Some(true);
        set("allow_symlinks");
    }
    if cli.verbose {
        config.defaults.verbose = Some(true);
        set("verbose");
    }
    if !cli.include.is_empty() {
        config.selectors.include.clone_from(&cli.include);
        set("selectors_include");
    }
    if !cli.exclude.is_empty() {
        config.selectors.exclude.clone_from(&cli.exclude);
        set("selectors_exclude");
    }
    if let Some(prefix) = &cli.header_prefix {
        config.format.header_prefix = Some(prefix.clone());
        set("header_prefix");
    }
    if cli.lenient_preamble {
        config.format.preamble = Some(PreamblePolicy::Lenient.as_str().to_string());
        set("preamble");
    }
}
