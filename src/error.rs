use crate::capture::camera::CameraError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttendanceError {
    #[error("Token tidak ditemukan. Silakan login kembali (`palm-attendance login --token <TOKEN>`)")]
    Unauthenticated,

    #[error("Gagal terhubung ke server: {0}")]
    Transport(String),

    #[error("{}", server_text(.status, .message))]
    Server { status: u16, message: Option<String> },

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Kesalahan konfigurasi: {0}")]
    Config(String),

    #[error("Respons server tidak valid: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Model error: {0}")]
    Model(String),

    #[error(transparent)]
    Common(#[from] palm_attendance_common::Error),
}

/// 画面側での扱いを決めるためのエラー分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// ログイン画面へ戻す
    Authentication,
    /// 汎用メッセージを表示
    Transport,
    /// サーバーのメッセージをそのまま表示
    Server,
    /// カメラ権限・撮影失敗（再試行ボタンつき）
    Device,
    /// 一時ファイル等（ログのみ）
    LocalIo,
    Other,
}

impl AttendanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AttendanceError::Unauthenticated => ErrorKind::Authentication,
            AttendanceError::Transport(_) => ErrorKind::Transport,
            AttendanceError::Server { .. } => ErrorKind::Server,
            AttendanceError::Camera(_) => ErrorKind::Device,
            AttendanceError::Io(_) => ErrorKind::LocalIo,
            _ => ErrorKind::Other,
        }
    }

    /// サーバーが返したメッセージ（空なら None）
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AttendanceError::Server { message: Some(message), .. } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

/// メッセージがなければステータスだけ表示
fn server_text(status: &u16, message: &Option<String>) -> String {
    match message.as_deref().map(str::trim) {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => format!("HTTP {}", status),
    }
}

pub type Result<T> = std::result::Result<T, AttendanceError>;
