//! Run configuration loaded from TOML.
//!
//! Every section and key is optional:
//! ```toml
//! [extract]
//! table_id = "tabelaDPL"
//! base_url = "https://www.tibiawiki.com.br"
//!
//! [items]
//! on_malformed = "skip"   # default "abort"
//!
//! [items.type_overrides]
//! "misc_rings.json" = "rings"
//! ```

use crate::error::{Result, WikiError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_TABLE_ID: &str = "tabelaDPL";
pub const DEFAULT_BASE_URL: &str = "https://www.tibiawiki.com.br";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct WikiConfig {
    pub extract: ExtractConfig,
    pub items: ItemsConfig,
}

/// Settings for scraping item tables out of saved pages.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExtractConfig {
    /// `id` attribute of the item table.
    pub table_id: String,
    /// Origin prefixed to relative image paths.
    pub base_url: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            table_id: DEFAULT_TABLE_ID.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// What to do with an intermediate file that is not valid item JSON.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MalformedFilePolicy {
    /// Stop the whole run.
    #[default]
    Abort,
    /// Log a warning and continue with the next file.
    Skip,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ItemsConfig {
    pub on_malformed: MalformedFilePolicy,
    /// Exact file name -> item type, bypassing the file name rule.
    pub type_overrides: BTreeMap<String, String>,
}

impl WikiConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            WikiError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config from {:?}: {}", path, e),
            ))
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| WikiError::Config(format!("Failed to parse config TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = WikiConfig::from_str("").unwrap();
        assert_eq!(config.extract.table_id, "tabelaDPL");
        assert_eq!(config.extract.base_url, "https://www.tibiawiki.com.br");
        assert_eq!(config.items.on_malformed, MalformedFilePolicy::Abort);
        assert!(config.items.type_overrides.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[extract]
table_id = "tabelaItens"

[items]
on_malformed = "skip"

[items.type_overrides]
"misc_rings.json" = "rings"
"#;

        let config = WikiConfig::from_str(toml).unwrap();
        assert_eq!(config.extract.table_id, "tabelaItens");
        assert_eq!(config.extract.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.items.on_malformed, MalformedFilePolicy::Skip);
        assert_eq!(
            config.items.type_overrides.get("misc_rings.json").map(String::as_str),
            Some("rings")
        );
    }

    #[test]
    fn test_invalid_policy() {
        let result = WikiConfig::from_str("[items]\non_malformed = \"retry\"\n");
        assert!(matches!(result, Err(WikiError::Config(_))));
    }
}
