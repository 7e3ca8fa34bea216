use std::{collections::HashMap, fs};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_GEOCODE_URL: &str = "https://api.bigdatacloud.net/data/reverse-geocode-client";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub geocode_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            geocode_url: DEFAULT_GEOCODE_URL.into(),
        }
    }
}

impl Settings {
    pub fn api_base(&self) -> anyhow::Result<Url> {
        Url::parse(&self.api_base_url)
            .with_context(|| format!("invalid api base url '{}'", self.api_base_url))
    }

    pub fn geocode_endpoint(&self) -> anyhow::Result<Url> {
        Url::parse(&self.geocode_url)
            .with_context(|| format!("invalid geocode url '{}'", self.geocode_url))
    }
}

/// Defaults, overlaid by `client.toml` if present, overlaid by environment
/// variables.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("client.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("api_base_url") {
                settings.api_base_url = v.clone();
            }
            if let Some(v) = file_cfg.get("geocode_url") {
                settings.geocode_url = v.clone();
            }
        }
    }

    if let Ok(v) = std::env::var("CITIES_API_URL") {
        settings.api_base_url = v;
    }
    if let Ok(v) = std::env::var("GEOCODE_API_URL") {
        settings.geocode_url = v;
    }

    settings
}
