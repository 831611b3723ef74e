//! Application configuration.
//!
//! Every field has a default, so an empty JSON object (or `AppConfig::default()`)
//! yields the stock setup: API under `/api`, storage keys `adminToken` and
//! `locale`, mount anchor `#app`.

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub api_base: String,
    pub admin_token_key: String,
    pub locale_key: String,
    pub default_locale: String,
    pub fallback_locale: String,
    pub mount_selector: String,
    /// Set up the locale subsystem during mount.
    pub i18n: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: "/api".to_string(),
            admin_token_key: "adminToken".to_string(),
            locale_key: "locale".to_string(),
            default_locale: "en".to_string(),
            fallback_locale: "en".to_string(),
            mount_selector: "#app".to_string(),
            i18n: true,
        }
    }
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }
}
