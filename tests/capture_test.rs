//! スキャンパイプラインのテスト
//!
//! カメラと送信をスタブに置き換えて、単一実行・一時ファイル削除・結果の判定を検証

use palm_attendance::api::{ScanEndpoint, ScanRequest, ScanResponse, ScanTarget, ScanUploader};
use palm_attendance::capture::{
    Camera, CameraError, CapturePipeline, CapturedPhoto, PipelinePhase, ScanOutcome,
    SCAN_FAILED_MESSAGE, TEMP_FILE_NAME,
};
use palm_attendance::{AttendanceError, ErrorKind, Result};
use palm_attendance_common::ScanDirection;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::tempdir;

const PHOTO: &[u8] = b"\xFF\xD8\xFF\xE0fake-jpeg";

#[derive(Default)]
struct StubCamera {
    fail: bool,
    captures: AtomicUsize,
}

impl Camera for StubCamera {
    async fn capture(&self) -> std::result::Result<CapturedPhoto, CameraError> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.fail {
            return Err(CameraError::NotReady("stub".into()));
        }
        Ok(CapturedPhoto::from_jpeg(PHOTO, 1, 1))
    }
}

enum Behavior {
    Respond(ScanResponse),
    Transport,
    ServerMessage(String),
    ServerStatus(u16),
    Hang,
}

struct SeenUpload {
    path: PathBuf,
    bytes: Option<Vec<u8>>,
    target: ScanTarget,
    direction: ScanDirection,
}

struct StubUploader {
    behavior: Behavior,
    seen: Mutex<Vec<SeenUpload>>,
}

impl StubUploader {
    fn new(behavior: Behavior) -> Self {
        Self { behavior, seen: Mutex::new(Vec::new()) }
    }

    fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl ScanUploader for StubUploader {
    async fn upload(&self, request: &ScanRequest) -> Result<ScanResponse> {
        self.seen.lock().unwrap().push(SeenUpload {
            path: request.image_path.clone(),
            bytes: std::fs::read(&request.image_path).ok(),
            target: request.target,
            direction: request.direction,
        });
        match &self.behavior {
            Behavior::Respond(response) => Ok(response.clone()),
            Behavior::Transport => Err(AttendanceError::Transport("connection refused".into())),
            Behavior::ServerMessage(message) => Err(AttendanceError::Server {
                status: 400,
                message: Some(message.clone()),
            }),
            Behavior::ServerStatus(status) => Err(AttendanceError::Server { status: *status, message: None }),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

fn accepted(message: &str) -> Behavior {
    Behavior::Respond(ScanResponse {
        success: true,
        message: Some(message.to_string()),
        data: Some(serde_json::json!({"student": "Ani"})),
    })
}

fn pipeline(
    camera: StubCamera,
    behavior: Behavior,
    endpoint: ScanEndpoint,
    dir: &std::path::Path,
) -> CapturePipeline<StubCamera, StubUploader> {
    CapturePipeline::new(camera, StubUploader::new(behavior), endpoint, dir)
}

/// 成功時はサーバーのメッセージを返し、一時ファイルは残らない
#[tokio::test]
async fn test_accepted_scan_cleans_up() {
    let dir = tempdir().expect("Failed to create temp dir");
    let p = pipeline(StubCamera::default(), accepted("Absensi masuk berhasil"), ScanEndpoint::ScanHand, dir.path());

    let outcome = p.run(ScanTarget::Meeting(5), ScanDirection::In).await.unwrap();
    match &outcome {
        ScanOutcome::Accepted { message, data } => {
            assert_eq!(message, "Absensi masuk berhasil");
            assert!(data.is_some());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let seen = p.uploader().seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].path, dir.path().join(TEMP_FILE_NAME));
    assert_eq!(seen[0].bytes.as_deref(), Some(PHOTO));
    assert_eq!(seen[0].target, ScanTarget::Meeting(5));
    assert_eq!(seen[0].direction, ScanDirection::In);

    assert!(!dir.path().join(TEMP_FILE_NAME).exists());
    assert_eq!(p.phase(), PipelinePhase::Idle);
}

/// 実行中の2回目の要求は何もしない
#[tokio::test]
async fn test_concurrent_run_is_noop() {
    let dir = tempdir().expect("Failed to create temp dir");
    let p = pipeline(StubCamera::default(), accepted("ok"), ScanEndpoint::ScanHand, dir.path());

    let (a, b) = tokio::join!(
        p.run(ScanTarget::Course(1), ScanDirection::In),
        p.run(ScanTarget::Course(1), ScanDirection::In),
    );

    assert_eq!([a.is_some(), b.is_some()].iter().filter(|x| **x).count(), 1);
    assert_eq!(p.camera().captures.load(Ordering::SeqCst), 1);
    assert_eq!(p.uploader().calls(), 1);

    // 終了後は再び実行できる
    assert!(p.run(ScanTarget::Course(1), ScanDirection::Out).await.is_some());
    assert_eq!(p.uploader().calls(), 2);
}

/// success: false はサーバーのメッセージ、なければ既定メッセージ
#[tokio::test]
async fn test_rejected_response() {
    let dir = tempdir().expect("Failed to create temp dir");
    let p = pipeline(
        StubCamera::default(),
        Behavior::Respond(ScanResponse {
            success: false,
            message: Some("Telapak tangan tidak dikenali".into()),
            data: None,
        }),
        ScanEndpoint::ScanHand,
        dir.path(),
    );
    let outcome = p.run(ScanTarget::Meeting(2), ScanDirection::In).await.unwrap();
    assert!(matches!(outcome, ScanOutcome::Rejected { .. }));
    assert_eq!(outcome.message(), "Telapak tangan tidak dikenali");

    let silent = pipeline(
        StubCamera::default(),
        Behavior::Respond(ScanResponse { success: false, message: None, data: None }),
        ScanEndpoint::ScanHand,
        dir.path(),
    );
    let outcome = silent.run(ScanTarget::Meeting(2), ScanDirection::In).await.unwrap();
    assert_eq!(outcome.message(), SCAN_FAILED_MESSAGE);
    assert!(!dir.path().join(TEMP_FILE_NAME).exists());
}

/// HTTPエラーのメッセージはそのまま表示
#[tokio::test]
async fn test_server_error_message() {
    let dir = tempdir().expect("Failed to create temp dir");
    let p = pipeline(
        StubCamera::default(),
        Behavior::ServerMessage("Pertemuan belum dimulai".into()),
        ScanEndpoint::ScanHand,
        dir.path(),
    );
    let outcome = p.run(ScanTarget::Meeting(2), ScanDirection::In).await.unwrap();
    assert!(matches!(outcome, ScanOutcome::Rejected { .. }));
    assert_eq!(outcome.message(), "Pertemuan belum dimulai");
}

/// メッセージのないHTTPエラーは既定メッセージ
#[tokio::test]
async fn test_server_error_without_message() {
    let dir = tempdir().expect("Failed to create temp dir");
    let p = pipeline(StubCamera::default(), Behavior::ServerStatus(500), ScanEndpoint::ScanHand, dir.path());

    let outcome = p.run(ScanTarget::Meeting(2), ScanDirection::In).await.unwrap();
    assert!(matches!(outcome, ScanOutcome::Failed { kind: ErrorKind::Server, .. }));
    assert_eq!(outcome.message(), SCAN_FAILED_MESSAGE);
    assert!(!dir.path().join(TEMP_FILE_NAME).exists());
}

/// 通信エラーは既定メッセージ、一時ファイルは削除
#[tokio::test]
async fn test_transport_error() {
    let dir = tempdir().expect("Failed to create temp dir");
    let p = pipeline(StubCamera::default(), Behavior::Transport, ScanEndpoint::ScanHand, dir.path());

    let outcome = p.run(ScanTarget::Meeting(2), ScanDirection::Out).await.unwrap();
    match &outcome {
        ScanOutcome::Failed { message, kind } => {
            assert_eq!(message, SCAN_FAILED_MESSAGE);
            assert_eq!(*kind, ErrorKind::Transport);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(!dir.path().join(TEMP_FILE_NAME).exists());
    assert_eq!(p.phase(), PipelinePhase::Idle);
}

/// 撮影失敗ではネットワークに出ない
#[tokio::test]
async fn test_camera_failure_skips_upload() {
    let dir = tempdir().expect("Failed to create temp dir");
    let camera = StubCamera { fail: true, ..Default::default() };
    let p = pipeline(camera, accepted("ok"), ScanEndpoint::ScanHand, dir.path());

    let outcome = p.run(ScanTarget::Meeting(2), ScanDirection::In).await.unwrap();
    assert!(matches!(outcome, ScanOutcome::Failed { kind: ErrorKind::Device, .. }));
    assert_eq!(p.uploader().calls(), 0);
    assert!(!dir.path().join(TEMP_FILE_NAME).exists());
    assert_eq!(p.phase(), PipelinePhase::Idle);
}

/// 前回の一時ファイルは上書きされる
#[tokio::test]
async fn test_stale_temp_file_is_overwritten() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join(TEMP_FILE_NAME), b"stale").unwrap();
    let p = pipeline(StubCamera::default(), accepted("ok"), ScanEndpoint::ScanHand, dir.path());

    p.run(ScanTarget::Meeting(1), ScanDirection::In).await.unwrap();
    let seen = p.uploader().seen.lock().unwrap();
    assert_eq!(seen[0].bytes.as_deref(), Some(PHOTO));
    assert!(!dir.path().join(TEMP_FILE_NAME).exists());
}

/// attendance-scan は科目IDを受け付けない（撮影前に失敗）
#[tokio::test]
async fn test_attendance_scan_with_course_target() {
    let dir = tempdir().expect("Failed to create temp dir");
    let p = pipeline(StubCamera::default(), accepted("ok"), ScanEndpoint::AttendanceScan, dir.path());

    let outcome = p.run(ScanTarget::Course(3), ScanDirection::In).await.unwrap();
    assert!(matches!(outcome, ScanOutcome::Failed { kind: ErrorKind::Other, .. }));
    assert_eq!(p.camera().captures.load(Ordering::SeqCst), 0);
    assert_eq!(p.uploader().calls(), 0);
}

/// 送信中に中断されてもフラグと一時ファイルは戻る
#[tokio::test]
async fn test_cancelled_run_resets_guard() {
    let dir = tempdir().expect("Failed to create temp dir");
    let p = pipeline(StubCamera::default(), Behavior::Hang, ScanEndpoint::ScanHand, dir.path());

    let result = tokio::time::timeout(
        Duration::from_millis(100),
        p.run(ScanTarget::Meeting(1), ScanDirection::In),
    )
    .await;
    assert!(result.is_err());

    assert_eq!(p.uploader().calls(), 1);
    assert_eq!(p.phase(), PipelinePhase::Idle);
    assert!(!p.is_busy());
    assert!(!dir.path().join(TEMP_FILE_NAME).exists());
}
