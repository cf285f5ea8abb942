//! リモートAPIゲートウェイ
//!
//! 固定のベースURLに対して認証付きの GET/POST/DELETE を行い、
//! 成功時はJSONボディを返す。失敗は3種類に区別する:
//! - トークンなし → `AttendanceError::Unauthenticated`（ネットワークには出ない）
//! - HTTPエラー → `AttendanceError::Server`（サーバーのメッセージつき）
//! - 通信エラー → `AttendanceError::Transport`

mod endpoints;
mod envelopes;
mod scan;

pub use endpoints::AdminDashboard;
pub use envelopes::{extract_list, extract_object};
pub use scan::{ScanEndpoint, ScanRequest, ScanResponse, ScanTarget, ScanUploader};

use crate::config::Config;
use crate::error::{AttendanceError, Result};
use crate::session::Session;
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Session, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("palm-attendance/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| AttendanceError::Transport(e.to_string()))?;

        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn from_config(config: &Config, session: Session) -> Result<Self> {
        let timeout = config.request_timeout_seconds.map(Duration::from_secs);
        Self::new(config.api_base_url(), session, timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// トークンを付けたリクエストを作る（トークンがなければここで失敗）
    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.session.get_token()?;
        Ok(self
            .http
            .request(method, self.url(path))
            .bearer_auth(token.as_str()))
    }

    pub async fn get_json(&self, path: &str) -> Result<Value> {
        let req = self.authorized(Method::GET, path)?;
        self.send(req, "GET", path).await
    }

    pub async fn get_json_query(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let req = self.authorized(Method::GET, path)?.query(query);
        self.send(req, "GET", path).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let req = self.authorized(Method::POST, path)?.json(body);
        self.send(req, "POST", path).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        let req = self.authorized(Method::DELETE, path)?;
        self.send(req, "DELETE", path).await
    }

    pub async fn post_multipart(&self, path: &str, form: Form) -> Result<Value> {
        let req = self.authorized(Method::POST, path)?.multipart(form);
        self.send(req, "POST", path).await
    }

    async fn send(&self, req: RequestBuilder, method: &str, path: &str) -> Result<Value> {
        debug!(method, path, "API request");

        let response = req.send().await.map_err(|e| {
            warn!(method, path, error = %e, "API transport error");
            AttendanceError::Transport(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AttendanceError::Transport(e.to_string()))?;
        debug!(method, path, status = status.as_u16(), "API response");

        classify(status, &body)
    }
}

/// ステータスとボディから結果を判定
fn classify(status: StatusCode, body: &str) -> Result<Value> {
    if status.is_success() {
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        return Ok(serde_json::from_str(body)?);
    }

    if status == StatusCode::UNAUTHORIZED {
        return Err(AttendanceError::Unauthenticated);
    }

    let message = serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(server_message);

    Err(AttendanceError::Server {
        status: status.as_u16(),
        message,
    })
}

/// エラーボディからメッセージを取り出す（message / error / detail の順）
pub(crate) fn server_message(body: &Value) -> Option<String> {
    ["message", "error", "detail"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(|v| v.as_str().map(str::to_string))
        .filter(|s| !s.trim().is_empty())
}
