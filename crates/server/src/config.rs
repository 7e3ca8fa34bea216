use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub data_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8000".into(),
            data_file: "data/cities.json".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("bind_addr") {
                settings.server_bind = v.clone();
            }
            if let Some(v) = file_cfg.get("data_file") {
                settings.data_file = v.clone();
            }
        }
    }

    if let Ok(v) = std::env::var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Ok(v) = std::env::var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Ok(v) = std::env::var("CITIES_DATA_FILE") {
        settings.data_file = v;
    }
    if let Ok(v) = std::env::var("APP__DATA_FILE") {
        settings.data_file = v;
    }

    settings
}

/// Makes sure the data file's parent directory exists so the first write
/// after a mutation cannot fail on a missing directory.
pub fn prepare_data_file(data_file: &str) -> anyhow::Result<()> {
    let Some(parent) = Path::new(data_file).parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for data file '{data_file}'",
            parent.display()
        )
    })?;
    Ok(())
}
