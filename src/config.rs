use crate::api::ScanEndpoint;
use crate::error::{AttendanceError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// APIのURLを上書きする環境変数
pub const API_URL_ENV: &str = "PALM_ATTENDANCE_API_URL";

const DEFAULT_BASE_URL: &str = "http://192.168.25.39:8000/api";
const APP_DIR: &str = "palm-attendance";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    /// スキャン送信先
    pub scan_endpoint: ScanEndpoint,
    /// 画面内メッセージの表示秒数
    pub notice_seconds: u64,
    /// 一時画像の保存先（省略時はOSのキャッシュディレクトリ）
    pub temp_dir: Option<PathBuf>,
    /// 同梱モデルの代わりに使うモデルファイル
    pub model_path: Option<PathBuf>,
    /// 未設定ならHTTPクライアントの既定タイムアウト
    pub request_timeout_seconds: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            scan_endpoint: ScanEndpoint::default(),
            notice_seconds: 5,
            temp_dir: None,
            model_path: None,
            request_timeout_seconds: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
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

    /// 設定ディレクトリ（config.json / session.json の置き場）
    pub fn config_dir() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .ok_or_else(|| AttendanceError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(base.join(APP_DIR))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn session_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("session.json"))
    }

    /// 環境変数を優先
    pub fn api_base_url(&self) -> String {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => url,
            _ => self.base_url.clone(),
        }
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|d| d.join(APP_DIR)))
            .unwrap_or_else(|| std::env::temp_dir().join(APP_DIR))
    }

    pub fn set_base_url(&mut self, url: String) -> Result<()> {
        if url.trim().is_empty() {
            return Err(AttendanceError::Config("base_url kosong".into()));
        }
        self.base_url = url.trim_end_matches('/').to_string();
        Ok(())
    }
}
