//! レスポンスの包み（エンベロープ）の解除
//!
//! エンドポイントごとに形が異なる:
//! `{"courses": [...]}`, `{"data": {"classes": [...]}}`, `{"data": [...]}`,
//! `{"status": "success", "data": {"history": [...]}}`、プロフィールは
//! `{"data": {...}}` または素のオブジェクト。

use crate::api::server_message;
use crate::error::{AttendanceError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// `key` の配列を取り出す。見つからなければ空
pub fn extract_list<T: DeserializeOwned>(body: &Value, key: &str) -> Result<Vec<T>> {
    check_status(body)?;

    let found = body
        .get(key)
        .or_else(|| body.get("data").and_then(|d| d.get(key)))
        .or_else(|| body.get("data").filter(|d| d.is_array()))
        .or_else(|| Some(body).filter(|b| b.is_array()));

    match found {
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(value) => Ok(Vec::<T>::deserialize(value)?),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ObjectEnvelope<T> {
    Wrapped { data: T },
    Bare(T),
}

/// 単一オブジェクトを取り出す
pub fn extract_object<T: DeserializeOwned>(body: &Value) -> Result<T> {
    check_status(body)?;
    match ObjectEnvelope::<T>::deserialize(body)? {
        ObjectEnvelope::Wrapped { data } => Ok(data),
        ObjectEnvelope::Bare(value) => Ok(value),
    }
}

const FAILED_STATUSES: &[&str] = &["error", "fail", "failed"];

/// `status` が失敗を示していればエラー
fn check_status(body: &Value) -> Result<()> {
    match body.get("status").and_then(Value::as_str) {
        Some(status) if FAILED_STATUSES.iter().any(|s| status.eq_ignore_ascii_case(s)) => Err(AttendanceError::Server {
            status: 200,
            message: server_message(body),
        }),
        _ => Ok(()),
    }
}
