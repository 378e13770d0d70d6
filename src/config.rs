use crate::error::{FarmaidError, Result};
use farmaid_common::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// ベースURLを上書きする環境変数
pub const API_URL_ENV: &str = "FARMAID_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    #[serde(flatten)]
    pub client: ClientConfig,
    /// アップロード前に縮小する最大辺（px）
    pub max_image_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            max_image_size: 1568,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;

        // 環境変数を優先
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.client.base_url = url.trim().to_string();
            }
        }

        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// ~/.config/farmaid
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| FarmaidError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("farmaid"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn set_base_url(&mut self, url: String) -> Result<()> {
        let url = url.trim().trim_end_matches('/').to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(FarmaidError::Config(format!(
                "ベースURLは http:// または https:// で始まる必要があります: {}",
                url
            )));
        }
        self.client.base_url = url;
        Ok(())
    }

    pub fn set_timeout_ms(&mut self, timeout_ms: u64) -> Result<()> {
        if timeout_ms == 0 {
            return Err(FarmaidError::Config("タイムアウトは1ms以上を指定してください".into()));
        }
        self.client.timeout_ms = timeout_ms;
        Ok(())
    }
}
