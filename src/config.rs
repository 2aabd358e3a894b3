//! Configuration stored in ~/.farmstead/config.json
//!
//! Every field has a default, so a partial or absent file still yields a
//! usable config. The market/feed prices are the adjustable inputs of the
//! optimizer; the balance and per-head price feed the cash-flow forecast.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::forecast::ForecastParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmConfig {
    #[serde(default)]
    pub starting_balance: f64,
    #[serde(default = "default_market_price")]
    pub market_price_per_kg: f64,
    #[serde(default = "default_feed_cost")]
    pub feed_cost_per_kg: f64,
    /// Flat price used for projected sales in the forecast.
    #[serde(default = "default_sale_price_per_head")]
    pub sale_price_per_head: f64,
    #[serde(default)]
    pub shortage_threshold: f64,
    /// SQLite store location. Defaults to ~/.farmstead/farmstead.db.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<String>,
    #[serde(default)]
    pub text_service: TextServiceConfig,
    /// Endpoint for outgoing notification emails. Logged only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_webhook_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextServiceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for TextServiceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            endpoint: default_endpoint(),
        }
    }
}

fn default_market_price() -> f64 {
    3.5
}

fn default_feed_cost() -> f64 {
    0.45
}

fn default_sale_price_per_head() -> f64 {
    250.0
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            starting_balance: 0.0,
            market_price_per_kg: default_market_price(),
            feed_cost_per_kg: default_feed_cost(),
            sale_price_per_head: default_sale_price_per_head(),
            shortage_threshold: 0.0,
            store_path: None,
            text_service: TextServiceConfig::default(),
            email_webhook_url: None,
        }
    }
}

impl FarmConfig {
    pub fn forecast_params(&self) -> ForecastParams {
        ForecastParams {
            starting_balance: self.starting_balance,
            sale_price_per_head: self.sale_price_per_head,
            shortage_threshold: self.shortage_threshold,
        }
    }

    pub fn store_path(&self) -> Option<PathBuf> {
        self.store_path.as_ref().map(PathBuf::from)
    }
}

/// Resolve `~/.farmstead/config.json`.
pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".farmstead").join("config.json"))
}

/// Read and parse a config file.
pub fn read_config(path: &Path) -> Result<FarmConfig, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
}

/// Load the user's config, falling back to defaults when missing or invalid.
pub fn load_config() -> FarmConfig {
    let path = match config_path() {
        Ok(path) => path,
        Err(e) => {
            log::warn!("{}. Using default config.", e);
            return FarmConfig::default();
        }
    };

    if !path.exists() {
        log::info!("No config at {}; using defaults", path.display());
        return FarmConfig::default();
    }

    match read_config(&path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{}. Using default config.", e);
            FarmConfig::default()
        }
    }
}
