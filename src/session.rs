//! セッション（トークン・プロフィール）管理
//!
//! ローカルのキーバリューストア（`session.json`）に `token` と `userData` を保存する。
//! 認証が必要な処理には `Session` を明示的に渡す。

use crate::error::{AttendanceError, Result};
use palm_attendance_common::UserProfile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// トークンを上書きする環境変数
pub const TOKEN_ENV: &str = "PALM_ATTENDANCE_TOKEN";

/// Bearerトークン
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value.trim().to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token(***)")
    }
}

/// 保存内容
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct SessionData {
    token: Option<String>,
    #[serde(rename = "userData")]
    user_data: Option<UserProfile>,
}

pub trait TokenStore: Send + Sync {
    /// 保存済みトークンを取得（なければ Unauthenticated）
    fn get_token(&self) -> Result<Token>;
    fn set_token(&self, token: &str) -> Result<()>;
    /// ログアウト（トークンとプロフィールを削除）
    fn clear(&self) -> Result<()>;
    fn cached_profile(&self) -> Option<UserProfile>;
    fn cache_profile(&self, profile: &UserProfile) -> Result<()>;
}

/// JSONファイルに保存するストア
///
/// 毎回ファイルから読み直す。
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> SessionData {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    fn write(&self, data: &SessionData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(data)?)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get_token(&self) -> Result<Token> {
        self.read()
            .token
            .and_then(Token::new)
            .ok_or(AttendanceError::Unauthenticated)
    }

    fn set_token(&self, token: &str) -> Result<()> {
        let token = Token::new(token)
            .ok_or_else(|| AttendanceError::Config("token kosong".into()))?;
        let mut data = self.read();
        data.token = Some(token.0);
        self.write(&data)
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn cached_profile(&self) -> Option<UserProfile> {
        self.read().user_data
    }

    fn cache_profile(&self, profile: &UserProfile) -> Result<()> {
        let mut data = self.read();
        data.user_data = Some(profile.clone());
        self.write(&data)
    }
}

/// メモリ上のストア（テスト用）
#[derive(Default)]
pub struct MemoryTokenStore {
    data: Mutex<SessionData>,
}

impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        let store = Self::default();
        if let Ok(mut data) = store.data.lock() {
            data.token = Some(token.to_string());
        }
        store
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, SessionData>> {
        self.data
            .lock()
            .map_err(|_| AttendanceError::Config("session store poisoned".into()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn get_token(&self) -> Result<Token> {
        self.lock()?
            .token
            .clone()
            .and_then(Token::new)
            .ok_or(AttendanceError::Unauthenticated)
    }

    fn set_token(&self, token: &str) -> Result<()> {
        self.lock()?.token = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = SessionData::default();
        Ok(())
    }

    fn cached_profile(&self) -> Option<UserProfile> {
        self.lock().ok().and_then(|d| d.user_data.clone())
    }

    fn cache_profile(&self, profile: &UserProfile) -> Result<()> {
        self.lock()?.user_data = Some(profile.clone());
        Ok(())
    }
}

/// 認証コンテキスト
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
    env_token: Option<Token>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store, env_token: None }
    }

    /// 環境変数のトークンを優先するセッション
    pub fn with_env(store: Arc<dyn TokenStore>) -> Self {
        let env_token = std::env::var(TOKEN_ENV).ok().and_then(Token::new);
        if env_token.is_some() {
            debug!("{} からトークンを使用", TOKEN_ENV);
        }
        Self { store, env_token }
    }

    pub fn get_token(&self) -> Result<Token> {
        match &self.env_token {
            Some(token) => Ok(token.clone()),
            None => self.store.get_token(),
        }
    }

    pub fn store(&self) -> &dyn TokenStore {
        self.store.as_ref()
    }
}
