//! Command implementations for the clipack CLI

use anyhow::Result;
use camino::Utf8PathBuf;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use crate::{
    BundleProcessor, ClipackError, Config, FileFilter, ProcessOptions, ValidationError,
    read_input,
};

fn utf8_dir(key: &str, dir: Option<&Path>) -> Result<Option<Utf8PathBuf>, ClipackError> {
    dir.map(|dir| {
        Utf8PathBuf::from_path_buf(dir.to_path_buf()).map_err(|path| {
            ClipackError::from(ValidationError::InvalidValue {
                key: key.to_string(),
                value: format!("{} (path is not valid UTF-8)", path.display()),
            })
        })
    })
    .transpose()
}

fn base_options(config: &Config, use_clipboard: bool) -> ProcessOptions {
    ProcessOptions {
        dry_run: config.dry_run(),
        use_clipboard,
        allow_symlinks: config.allow_symlinks(),
        ..ProcessOptions::default()
    }
}

fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Execute the extract command
pub async fn execute_extract_command(
    output_dir: Option<&Path>,
    use_clipboard: bool,
    config: &Config,
) -> Result<()> {
    let options = ProcessOptions {
        output_dir: utf8_dir("output_dir", output_dir)?,
        ..base_options(config, use_clipboard)
    };
    // Fail before blocking on stdin.
    let target = options.require_output_dir()?.to_path_buf();

    let text = read_input(&options, None).await?;
    let processor = BundleProcessor::new(options).with_parse_options(config.parse_options()?);
    let records = processor.extract(&text).await?;

    if config.dry_run() {
        println!("Would extract {} files to {target}", records.len());
    } else {
        println!("Processed {} files to {target}", records.len());
    }
    if config.verbose() {
        for record in &records {
            println!("  {}", record.path);
        }
    }

    Ok(())
}

/// Execute the pack command
pub async fn execute_pack_command(
    input_dir: Option<&Path>,
    use_clipboard: bool,
    config: &Config,
) -> Result<()> {
    let options = ProcessOptions {
        input_dir: utf8_dir("input_dir", input_dir)?,
        ..base_options(config, use_clipboard)
    };
    let filter = FileFilter::from_selectors(&config.selectors)?;
    let processor = BundleProcessor::new(options).with_filter(filter);
    let bundle = processor.pack().await?;

    if use_clipboard {
        let verb = if config.dry_run() { "Would copy" } else { "Copied" };
        println!("{verb} {} bytes to the clipboard", bundle.len());
    } else {
        write_stdout(&bundle)?;
    }

    Ok(())
}

/// Execute the config command
pub fn execute_config_command(json: bool, config: &Config) -> Result<()> {
    let effective: BTreeMap<String, (String, String)> =
        config.effective_config().into_iter().collect();

    if json {
        let entries: BTreeMap<&str, serde_json::Value> = effective
            .iter()
            .map(|(key, (value, source))| {
                (
                    key.as_str(),
                    serde_json::json!({ "value": value, "source": source }),
                )
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Effective configuration:");
    for (key, (value, source)) in &effective {
        println!("  {key} = {value} (from {source})");
    }
    Ok(())
}
