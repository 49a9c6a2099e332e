use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::entities::manga::DEFAULT_COVER_PLACEHOLDER;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(skip)]
    path: PathBuf,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    #[serde(default = "default_data_path")]
    pub data_path: String,
    #[serde(default = "default_percentage_floor")]
    pub percentage_floor: f64,
    #[serde(default = "default_restore_delay_ms")]
    pub restore_delay_ms: u64,
    #[serde(default = "default_cover_placeholder")]
    pub cover_placeholder: String,
    #[serde(default = "default_page_height")]
    pub page_height: f64,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: hondana_home().join("config.yml"),
            api_url: default_api_url(),
            page_size: default_page_size(),
            data_path: default_data_path(),
            percentage_floor: default_percentage_floor(),
            restore_delay_ms: default_restore_delay_ms(),
            cover_placeholder: default_cover_placeholder(),
            page_height: default_page_height(),
            viewport_height: default_viewport_height(),
        }
    }
}

fn hondana_home() -> PathBuf {
    match std::env::var("HONDANA_HOME") {
        Ok(path) => PathBuf::from(path),
        Err(_) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".hondana"),
    }
}

fn default_api_url() -> String {
    "https://script.google.com/macros/s/AKfycbzutjzuXt-7-O8c0O_OOpSj4NkX6-qF_zithhbgp4GrkemDnG7sE-qA-A8uZhcYXFkx/exec".to_string()
}

fn default_page_size() -> i64 {
    20
}

fn default_data_path() -> String {
    hondana_home().join("data").display().to_string()
}

fn default_percentage_floor() -> f64 {
    5.0
}

fn default_restore_delay_ms() -> u64 {
    100
}

fn default_cover_placeholder() -> String {
    DEFAULT_COVER_PLACEHOLDER.to_string()
}

fn default_page_height() -> f64 {
    1200.0
}

fn default_viewport_height() -> f64 {
    800.0
}

impl Config {
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Config, anyhow::Error> {
        let config_path = match path {
            Some(p) => PathBuf::new().join(p),
            None => hondana_home().join("config.yml"),
        };

        match std::fs::File::open(&config_path) {
            Ok(file) => {
                info!("Open config from {:?}", config_path);
                let mut cfg: Self = serde_yml::from_reader(file)?;
                cfg.path = config_path;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Config {
                    path: config_path,
                    ..Default::default()
                };
                cfg.save()?;
                info!("Write default config at {:?}", cfg.path);
                Ok(cfg)
            }
        }
    }

    pub fn save(&self) -> Result<(), anyhow::Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_yml::to_string(&self)?)?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
