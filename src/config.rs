//! Application configuration: a TOML file plus environment overrides.
//!
//! ```toml
//! [compare]
//! max_results = 10
//! source_timeout_seconds = 20
//! relevance_filter = false
//!
//! [sources]
//! ebay_app_id = "..."
//! serpapi_key = "..."
//! mock_mode = false
//! ```
//!
//! `EBAY_APP_ID`, `SERPAPI_KEY` and `MOCK_MODE` in the environment take
//! precedence over the file.

use std::path::{Path, PathBuf};

use pricecheck_core::{CompareConfig, SourceCredentials};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable holding the eBay Finding API app id.
pub const ENV_EBAY_APP_ID: &str = "EBAY_APP_ID";
/// Environment variable holding the SerpAPI key.
pub const ENV_SERPAPI_KEY: &str = "SERPAPI_KEY";
/// Environment variable forcing the mock marketplace on (`true`/`false`).
pub const ENV_MOCK_MODE: &str = "MOCK_MODE";

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Ranking, time budget and filtering.
    pub compare: CompareConfig,
    /// Marketplace credentials.
    pub sources: SourceCredentials,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Load configuration the way the CLI does.
    ///
    /// Reads `path` if given (it must exist), otherwise the default config
    /// file if present, otherwise defaults; then applies environment
    /// overrides from the process environment and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing or malformed, or the
    /// resulting comparison config is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::default_config_path();
                if default_path.is_file() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.compare.validate()?;
        Ok(config)
    }

    /// Apply credential overrides from `lookup`, which maps an environment
    /// variable name to its value.
    ///
    /// Values that are present win over the file. `MOCK_MODE` is true only
    /// for a case-insensitive `"true"`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(app_id) = lookup(ENV_EBAY_APP_ID) {
            self.sources.ebay_app_id = Some(app_id);
        }
        if let Some(key) = lookup(ENV_SERPAPI_KEY) {
            self.sources.serpapi_key = Some(key);
        }
        if let Some(mock) = lookup(ENV_MOCK_MODE) {
            self.sources.mock_mode = mock.trim().eq_ignore_ascii_case("true");
        }
    }

    /// Returns the default config file path: `<config dir>/pricecheck/config.toml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pricecheck")
            .join("config.toml")
    }
}
