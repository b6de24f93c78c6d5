use crate::error::{EcoPulseError, Result};
use ecopulse_common::Symbology;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// APIキーを読む環境変数（先頭優先）
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
    pub tip_interval_seconds: u64,
    /// バッジ描画用TrueTypeフォント
    pub badge_font: Option<PathBuf>,
    /// バッジ保存先（未指定ならダウンロードフォルダ）
    pub downloads_dir: Option<PathBuf>,
    /// スキャナで受け付けるシンボル体系
    pub symbologies: Vec<Symbology>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".into(),
            api_base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            temperature: 0.2,
            timeout_seconds: 60,
            tip_interval_seconds: 6,
            badge_font: None,
            downloads_dir: None,
            symbologies: Symbology::ALL.to_vec(),
        }
    }
}

impl Config {
    /// 設定ファイルを読み込み、環境変数のAPIキーを反映
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        if let Some(key) = key_from_env() {
            config.api_key = Some(key);
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| EcoPulseError::Config("Home directory not found".into()))?;
        Ok(home.join(".config").join("ecopulse").join("config.json"))
    }

    /// APIキー（未設定・空文字は CredentialMissing）
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(EcoPulseError::CredentialMissing)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    /// バッジ保存先
    pub fn badge_output_dir(&self) -> PathBuf {
        self.downloads_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn key_from_env() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|key| !key.trim().is_empty())
}
