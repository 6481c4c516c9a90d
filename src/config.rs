use crate::query::session::DEFAULT_MIN_SUBMIT_CHARS;
use crate::query::{FieldMatching, FieldMeta, SearchFields};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Free-form label for the loaded profile.
    pub profile_name: String,
    pub min_submit_chars: usize,
    /// Field metadata keyed by alias
    pub fields: SearchFields,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            profile_name: "base".to_string(),
            min_submit_chars: DEFAULT_MIN_SUBMIT_CHARS,
            fields: default_fields(),
        }
    }
}

/// Native contact columns
fn default_fields() -> SearchFields {
    SearchFields::new()
        .with_field("name", FieldMeta::default())
        .with_field("email", FieldMeta::default())
        .with_field(
            "phone",
            FieldMeta {
                searchable: true,
                matching: FieldMatching::Equality,
            },
        )
}

pub fn load_config(path: Option<&Path>) -> Result<SearchConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<SearchConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    toml::from_str::<SearchConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

pub fn default_config() -> &'static SearchConfig {
    static DEFAULT_CONFIG: LazyLock<SearchConfig> = LazyLock::new(SearchConfig::default);
    &DEFAULT_CONFIG
}
