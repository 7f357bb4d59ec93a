pub mod cli;
pub mod toml_config;

pub use cli::CliConfig;
pub use toml_config::TomlConfig;

use crate::core::date::YearWindow;
use crate::core::flatten::LabelTable;
use crate::core::price::RateTable;
use crate::core::profile::{SourceKind, SourceProfile};
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};

/// Fully resolved settings for one run: built-in defaults, then the TOML
/// file, then command-line flags.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: SourceKind,
    pub input_path: String,
    pub output_path: String,
    pub year_window: YearWindow,
    pub tag_labels: LabelTable,
    pub currency_rates: RateTable,
}

impl RunConfig {
    pub fn for_source(source: SourceKind) -> Self {
        let profile = SourceProfile::for_source(source);
        Self {
            source,
            input_path: profile.default_input.to_string(),
            output_path: profile.default_output.to_string(),
            year_window: YearWindow::default(),
            tag_labels: LabelTable::epic_defaults(),
            currency_rates: RateTable::ecb_snapshot(),
        }
    }

    pub fn from_cli(cli: &CliConfig) -> Result<Self> {
        let mut config = Self::for_source(cli.source);

        if let Some(path) = &cli.config {
            tracing::info!("📁 Loading configuration from: {}", path);
            let toml = TomlConfig::from_file(path)?;
            toml.validate()?;
            config.apply_toml(&toml);
        }

        if let Some(input) = &cli.input {
            config.input_path = input.clone();
        }
        if let Some(output) = &cli.output {
            config.output_path = output.clone();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn apply_toml(&mut self, toml: &TomlConfig) {
        if let Some(paths) = &toml.paths {
            if let Some(input) = &paths.input {
                self.input_path = input.clone();
            }
            if let Some(output) = &paths.output {
                self.output_path = output.clone();
            }
        }

        if let Some(filter) = &toml.filter {
            self.year_window = YearWindow::new(
                filter.year_min.unwrap_or(self.year_window.min),
                filter.year_max.unwrap_or(self.year_window.max),
            );
        }

        if let Some(tags) = &toml.tags {
            self.tag_labels = self
                .tag_labels
                .iter()
                .map(|(id, label)| (id.clone(), label.clone()))
                .chain(tags.iter().map(|(id, label)| (id.clone(), label.clone())))
                .collect();
        }

        if let Some(rates) = toml.currency.as_ref().and_then(|c| c.rates.as_ref()) {
            self.currency_rates
                .extend(rates.iter().map(|(code, rate)| (code.clone(), *rate)));
        }
    }
}

impl ConfigProvider for RunConfig {
    fn source(&self) -> SourceKind {
        self.source
    }

    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn year_window(&self) -> YearWindow {
        self.year_window
    }

    fn tag_labels(&self) -> &LabelTable {
        &self.tag_labels
    }

    fn currency_rates(&self) -> &RateTable {
        &self.currency_rates
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input_path)?;
        validation::validate_path("output", &self.output_path)?;
        validation::validate_ordered("year_window", self.year_window.min, self.year_window.max)?;

        if self.input_path == self.output_path {
            return Err(EtlError::ConfigValidationError {
                field: "output".to_string(),
                message: format!("Output would overwrite the input file '{}'", self.input_path),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_follow_profile() {
        let config = RunConfig::for_source(SourceKind::Igdb);
        assert_eq!(config.input_path, "igdb_pc_games.json");
        assert_eq!(config.output_path, "igdb_clean.csv");
        assert_eq!(config.year_window, YearWindow::new(2015, 2025));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides_toml() {
        let mut toml_file = NamedTempFile::new().unwrap();
        toml_file
            .write_all(
                br#"
[paths]
input = "from_toml.json"
output = "from_toml.csv"

[filter]
year_max = 2020

[tags]
"4242" = "Roguelike games"

[currency.rates]
UAH = 45.0
"#,
            )
            .unwrap();

        let cli = CliConfig::try_parse_from([
            "storefront-etl",
            "epic",
            "--config",
            toml_file.path().to_str().unwrap(),
            "--output",
            "from_cli.csv",
        ])
        .unwrap();

        let config = RunConfig::from_cli(&cli).unwrap();
        assert_eq!(config.input_path, "from_toml.json");
        assert_eq!(config.output_path, "from_cli.csv");
        assert_eq!(config.year_window, YearWindow::new(2015, 2020));
        assert_eq!(config.tag_labels.get("4242"), Some("Roguelike games"));
        assert_eq!(config.tag_labels.get("1216"), Some("Action games"));
        assert_eq!(config.currency_rates.rate("uah"), Some(45.0));
        assert!(config.currency_rates.rate("USD").is_some());
    }

    #[test]
    fn test_output_may_not_overwrite_input() {
        let cli = CliConfig::try_parse_from(["storefront-etl", "steam", "-o", "steam_raw.csv"]).unwrap();
        assert!(matches!(
            RunConfig::from_cli(&cli),
            Err(EtlError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = CliConfig::try_parse_from([
            "storefront-etl",
            "steam",
            "--config",
            "/nonexistent/storefront.toml",
        ])
        .unwrap();
        assert!(matches!(RunConfig::from_cli(&cli), Err(EtlError::IoError(_))));
    }
}
