//! 撮影 → 一時保存 → 送信 → 後始末 のパイプライン
//!
//! 同時に実行できるのは1回だけ。実行中に来た要求は何もせず `None` を返す。
//! 一時ファイルは固定パス（1スロット）で、結果にかかわらず削除する。

pub mod camera;
pub mod notice;

pub use camera::{Camera, CameraError, CapturedPhoto, FileCamera};
pub use notice::{AfterScan, Notice, NoticeBoard, NoticeKind};

use crate::api::{ScanEndpoint, ScanRequest, ScanTarget, ScanUploader};
use crate::error::{AttendanceError, ErrorKind};
use palm_attendance_common::ScanDirection;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

pub const TEMP_FILE_NAME: &str = "temp_scan.jpg";
/// サーバーからメッセージがない場合の表示
pub const SCAN_FAILED_MESSAGE: &str = "Gagal memproses scan tangan";
const SCAN_OK_MESSAGE: &str = "Scan berhasil";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Idle,
    Capturing,
    Uploading,
    Cleaning,
}

/// 1回のスキャンの結果
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// `success: true`
    Accepted { message: String, data: Option<Value> },
    /// `success: false` またはサーバーのエラーメッセージ
    Rejected { message: String },
    /// 撮影失敗・通信エラーなど
    Failed { message: String, kind: ErrorKind },
}

impl ScanOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ScanOutcome::Accepted { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            ScanOutcome::Accepted { message, .. }
            | ScanOutcome::Rejected { message }
            | ScanOutcome::Failed { message, .. } => message,
        }
    }

    fn from_error(err: AttendanceError) -> Self {
        if let Some(message) = err.server_message() {
            return ScanOutcome::Rejected { message: message.to_string() };
        }
        let kind = err.kind();
        let message = match (&err, kind) {
            (AttendanceError::JsonParse(_), _)
            | (_, ErrorKind::Transport | ErrorKind::Server | ErrorKind::LocalIo) => SCAN_FAILED_MESSAGE.to_string(),
            _ => err.to_string(),
        };
        ScanOutcome::Failed { message, kind }
    }
}

pub struct CapturePipeline<C, U> {
    camera: C,
    uploader: U,
    endpoint: ScanEndpoint,
    temp_dir: PathBuf,
    phase: Mutex<PipelinePhase>,
}

impl<C: Camera, U: ScanUploader> CapturePipeline<C, U> {
    pub fn new(camera: C, uploader: U, endpoint: ScanEndpoint, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            camera,
            uploader,
            endpoint,
            temp_dir: temp_dir.into(),
            phase: Mutex::new(PipelinePhase::Idle),
        }
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    pub fn phase(&self) -> PipelinePhase {
        *lock(&self.phase)
    }

    pub fn is_busy(&self) -> bool {
        self.phase() != PipelinePhase::Idle
    }

    pub fn temp_path(&self) -> PathBuf {
        self.temp_dir.join(TEMP_FILE_NAME)
    }

    /// Idle のときだけ Capturing に進める（確認と設定を同じロック内で行う）
    fn try_begin(&self) -> Option<PhaseGuard<'_>> {
        let mut phase = lock(&self.phase);
        if *phase != PipelinePhase::Idle {
            return None;
        }
        *phase = PipelinePhase::Capturing;
        Some(PhaseGuard {
            phase: &self.phase,
            temp_path: self.temp_path(),
            cleaned: false,
        })
    }

    /// スキャンを1回実行。実行中なら `None`
    pub async fn run(&self, target: ScanTarget, direction: ScanDirection) -> Option<ScanOutcome> {
        let Some(mut guard) = self.try_begin() else {
            debug!("スキャン処理中のため要求を無視");
            return None;
        };

        let outcome = match self.attempt(&guard, target, direction).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "スキャン失敗");
                ScanOutcome::from_error(e)
            }
        };

        guard.cleanup().await;
        info!(success = outcome.is_success(), message = outcome.message(), "スキャン完了");
        Some(outcome)
    }

    async fn attempt(
        &self,
        guard: &PhaseGuard<'_>,
        target: ScanTarget,
        direction: ScanDirection,
    ) -> crate::error::Result<ScanOutcome> {
        let request = ScanRequest {
            endpoint: self.endpoint,
            target,
            direction,
            image_path: guard.temp_path.clone(),
        };
        request.validate()?;

        // 1. 撮影（失敗時はネットワークに出ない）
        let photo = self.camera.capture().await?;
        let bytes = photo.decode()?;

        // 2. 一時ファイルに保存（前回分は上書き）
        tokio::fs::create_dir_all(&self.temp_dir).await?;
        tokio::fs::write(&request.image_path, &bytes).await?;
        debug!(path = %request.image_path.display(), size = bytes.len(), "一時ファイル作成");

        // 3. 送信
        guard.set(PipelinePhase::Uploading);
        let response = self.uploader.upload(&request).await?;

        let message = response.message.filter(|m| !m.trim().is_empty());
        Ok(if response.success {
            ScanOutcome::Accepted {
                message: message.unwrap_or_else(|| SCAN_OK_MESSAGE.to_string()),
                data: response.data,
            }
        } else {
            ScanOutcome::Rejected {
                message: message.unwrap_or_else(|| SCAN_FAILED_MESSAGE.to_string()),
            }
        })
    }
}

/// 実行中フラグの保持者。Drop で必ず Idle に戻し、一時ファイルを消す
struct PhaseGuard<'a> {
    phase: &'a Mutex<PipelinePhase>,
    temp_path: PathBuf,
    cleaned: bool,
}

impl PhaseGuard<'_> {
    fn set(&self, next: PipelinePhase) {
        *lock(self.phase) = next;
    }

    async fn cleanup(&mut self) {
        self.set(PipelinePhase::Cleaning);
        match tokio::fs::remove_file(&self.temp_path).await {
            Ok(()) => debug!(path = %self.temp_path.display(), "一時ファイル削除"),
            Err(e) => log_remove_error(&self.temp_path, e),
        }
        self.cleaned = true;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if !self.cleaned {
            if let Err(e) = std::fs::remove_file(&self.temp_path) {
                log_remove_error(&self.temp_path, e);
            }
        }
        *lock(self.phase) = PipelinePhase::Idle;
    }
}

/// 存在しないファイルの削除は成功扱い
fn log_remove_error(path: &Path, e: std::io::Error) {
    if e.kind() != std::io::ErrorKind::NotFound {
        warn!(path = %path.display(), error = %e, "一時ファイルの削除に失敗");
    }
}

fn lock(phase: &Mutex<PipelinePhase>) -> MutexGuard<'_, PipelinePhase> {
    phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
