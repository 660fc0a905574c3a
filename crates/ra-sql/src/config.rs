//! Dialect configuration loaded from YAML

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::dialect::{dialect_with_settings, DialectSettings, SqlDialect};
use crate::error::{SqlError, SqlResult};

/// Dialect selection plus quoting and operator-rename overrides
///
/// ```yaml
/// dialect: duckdb
/// identifier_quote: '"'
/// op_replacements:
///   mean: avg
///   "%": mod
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialectConfig {
    /// Built-in dialect name
    #[serde(default = "default_dialect")]
    pub dialect: String,

    #[serde(default)]
    pub identifier_quote: Option<char>,

    #[serde(default)]
    pub string_quote: Option<char>,

    /// Added to (and overriding) the dialect's default renames
    #[serde(default)]
    pub op_replacements: BTreeMap<String, String>,

    /// Leave null placement in ORDER BY to the database when false
    #[serde(default)]
    pub nulls_last: Option<bool>,
}

fn default_dialect() -> String {
    "duckdb".to_string()
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            identifier_quote: None,
            string_quote: None,
            op_replacements: BTreeMap::new(),
            nulls_last: None,
        }
    }
}

impl DialectConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> SqlResult<Self> {
        if !path.exists() {
            return Err(SqlError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| SqlError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse_yaml(&content, &path.display().to_string())
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> SqlResult<Self> {
        Self::parse_yaml(content, "<string>")
    }

    fn parse_yaml(content: &str, origin: &str) -> SqlResult<Self> {
        let config: DialectConfig =
            serde_yaml::from_str(content).map_err(|e| SqlError::ConfigParse {
                path: origin.to_string(),
                message: e.to_string(),
            })?;
        if config.identifier_quote.is_some() && config.identifier_quote == config.string_quote {
            return Err(SqlError::ConfigParse {
                path: origin.to_string(),
                message: "identifier_quote and string_quote must differ".to_string(),
            });
        }
        Ok(config)
    }

    /// Settings the configured dialect will use
    pub fn settings(&self) -> DialectSettings {
        let mut settings = DialectSettings::default();
        if let Some(q) = self.identifier_quote {
            settings.identifier_quote = q;
        }
        if let Some(q) = self.string_quote {
            settings.string_quote = q;
        }
        if let Some(nulls_last) = self.nulls_last {
            settings.nulls_last = nulls_last;
        }
        settings.op_replacements.extend(
            self.op_replacements
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        settings
    }

    /// Build the configured dialect
    pub fn build(&self) -> SqlResult<Box<dyn SqlDialect>> {
        log::debug!("building '{}' dialect from config", self.dialect);
        dialect_with_settings(&self.dialect, Some(self.settings()))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
