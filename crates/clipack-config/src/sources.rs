use std::collections::HashMap;

use clipack_utils::types::ConfigSource;

use super::Config;

fn source_label(source: Option<&ConfigSource>) -> String {
    source.unwrap_or(&ConfigSource::Default).as_str().to_string()
}

impl Config {
    /// Get effective configuration as key-value pairs with source attribution
    ///
    /// Values map to `(value, source)` where source is `cli`, `config`, or `default`.
    #[must_use]
    pub fn effective_config(&self) -> HashMap<String, (String, String)> {
        let mut config = HashMap::new();

        let mut add = |key: &str, value: String| {
            let source = source_label(self.source_attribution.get(key));
            config.insert(key.to_string(), (value, source));
        };

        add("dry_run", self.dry_run().to_string());
        add("allow_symlinks", self.allow_symlinks().to_string());
        add("verbose", self.verbose().to_string());
        add("selectors_include", self.selectors.include.join(", "));
        add("selectors_exclude", self.selectors.exclude.join(", "));
        add(
            "header_prefix",
            self.format.header_prefix.clone().unwrap_or_default(),
        );
        add("preamble", self.format.preamble.clone().unwrap_or_default());

        if let Some(path) = &self.config_path {
            config.insert(
                "config_file".to_string(),
                (
                    path.display().to_string(),
                    ConfigSource::Config.as_str().to_string(),
                ),
            );
        }

        config
    }
}
