//! 手のひらスキャンの送信
//!
//! 送信先は2種類あり、設定で切り替える:
//! - `attendance-scan`: `POST /attendance/scan`（meeting_id のみ）
//! - `scan-hand`: `POST /scan-hand`（meeting_id または course_id）

use super::ApiClient;
use crate::error::{AttendanceError, Result};
use palm_attendance_common::ScanDirection;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::path::PathBuf;
use tracing::info;

/// マルチパートの画像パート
const IMAGE_FIELD: &str = "image";
const IMAGE_FILE_NAME: &str = "scan.jpg";
const IMAGE_MIME: &str = "image/jpeg";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ScanEndpoint {
    AttendanceScan,
    #[default]
    ScanHand,
}

impl ScanEndpoint {
    pub fn path(&self) -> &'static str {
        match self {
            ScanEndpoint::AttendanceScan => "/attendance/scan",
            ScanEndpoint::ScanHand => "/scan-hand",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanEndpoint::AttendanceScan => "attendance-scan",
            ScanEndpoint::ScanHand => "scan-hand",
        }
    }

    /// 対象の種類を受け付けるか
    pub fn accepts(&self, target: ScanTarget) -> bool {
        match (self, target) {
            (ScanEndpoint::AttendanceScan, ScanTarget::Course(_)) => false,
            _ => true,
        }
    }
}

impl std::fmt::Display for ScanEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// スキャン対象（授業回 or 科目）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTarget {
    Meeting(i64),
    Course(i64),
}

impl ScanTarget {
    pub fn field(&self) -> (&'static str, i64) {
        match self {
            ScanTarget::Meeting(id) => ("meeting_id", *id),
            ScanTarget::Course(id) => ("course_id", *id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub endpoint: ScanEndpoint,
    pub target: ScanTarget,
    pub direction: ScanDirection,
    /// 送信するJPEG（一時ファイル）
    pub image_path: PathBuf,
}

impl ScanRequest {
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.accepts(self.target) {
            Ok(())
        } else {
            Err(AttendanceError::Config(format!(
                "endpoint {} hanya menerima meeting_id",
                self.endpoint
            )))
        }
    }
}

/// サーバーの構造化レスポンス
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanResponse {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<Value>,
}

pub trait ScanUploader: Send + Sync {
    fn upload(&self, request: &ScanRequest) -> impl Future<Output = Result<ScanResponse>> + Send;
}

impl ScanUploader for ApiClient {
    async fn upload(&self, request: &ScanRequest) -> Result<ScanResponse> {
        request.validate()?;

        let bytes = tokio::fs::read(&request.image_path).await?;
        let image = Part::bytes(bytes)
            .file_name(IMAGE_FILE_NAME)
            .mime_str(IMAGE_MIME)
            .map_err(|e| AttendanceError::Transport(e.to_string()))?;

        let (field, id) = request.target.field();
        let form = Form::new()
            .part(IMAGE_FIELD, image)
            .text(field, id.to_string())
            .text("scan_type", request.direction.as_str());

        info!(
            endpoint = request.endpoint.path(),
            field,
            id,
            scan_type = request.direction.as_str(),
            "スキャン送信"
        );
        let body = self.post_multipart(request.endpoint.path(), form).await?;
        Ok(serde_json::from_value(body)?)
    }
}
