use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// Optional overrides for one run, loaded with `--config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub paths: Option<PathsConfig>,
    pub filter: Option<FilterConfig>,
    /// Extra or replacement tag id → label entries.
    pub tags: Option<HashMap<String, String>>,
    pub currency: Option<CurrencyConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    pub input: Option<String>,
    pub output: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Units of each currency per 1 EUR.
    pub rates: Option<HashMap<String, f64>>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(paths) = &self.paths {
            if let Some(input) = &paths.input {
                validation::validate_path("paths.input", input)?;
            }
            if let Some(output) = &paths.output {
                validation::validate_path("paths.output", output)?;
            }
        }

        if let Some(FilterConfig {
            year_min: Some(min),
            year_max: Some(max),
        }) = &self.filter
        {
            validation::validate_ordered("filter.year_min", *min, *max)?;
        }

        if let Some(tags) = &self.tags {
            for (id, label) in tags {
                validation::validate_non_empty_string("tags", id)?;
                validation::validate_non_empty_string(&format!("tags.{}", id), label)?;
            }
        }

        if let Some(rates) = self.currency.as_ref().and_then(|c| c.rates.as_ref()) {
            for (code, rate) in rates {
                validation::validate_non_empty_string("currency.rates", code)?;
                validation::validate_positive_rate(&format!("currency.rates.{}", code), *rate)?;
            }
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
