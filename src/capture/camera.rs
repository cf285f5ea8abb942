//! カメラの抽象化
//!
//! 端末のカメラの代わりに、画像ファイル（またはフォルダ内の最新画像）を撮影結果として扱う。

use base64::{engine::general_purpose::STANDARD, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Tidak ada akses kamera: {0}")]
    PermissionDenied(String),

    #[error("Kamera belum siap: {0}")]
    NotReady(String),

    #[error("Gagal mengambil gambar: {0}")]
    CaptureFailed(String),
}

/// 撮影結果（JPEGのbase64）
#[derive(Debug, Clone)]
pub struct CapturedPhoto {
    pub base64: String,
    pub width: u32,
    pub height: u32,
}

impl CapturedPhoto {
    pub fn from_jpeg(bytes: &[u8], width: u32, height: u32) -> Self {
        Self {
            base64: STANDARD.encode(bytes),
            width,
            height,
        }
    }

    /// base64をバイト列に戻す
    pub fn decode(&self) -> Result<Vec<u8>, CameraError> {
        STANDARD
            .decode(&self.base64)
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))
    }
}

pub trait Camera: Send + Sync {
    /// 静止画を1枚撮影（最高画質）
    fn capture(&self) -> impl Future<Output = Result<CapturedPhoto, CameraError>> + Send;
}

/// ファイル/フォルダをカメラとして使う
pub struct FileCamera {
    source: PathBuf,
}

impl FileCamera {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self { source: source.into() }
    }

    /// 撮影対象のファイルを決める
    pub fn resolve(&self) -> Result<PathBuf, CameraError> {
        if self.source.is_file() {
            return Ok(self.source.clone());
        }
        if self.source.is_dir() {
            return newest_image(&self.source).ok_or_else(|| {
                CameraError::NotReady(format!("tidak ada gambar di {}", self.source.display()))
            });
        }
        Err(CameraError::PermissionDenied(self.source.display().to_string()))
    }
}

impl Camera for FileCamera {
    async fn capture(&self) -> Result<CapturedPhoto, CameraError> {
        let path = self.resolve()?;
        debug!(path = %path.display(), "撮影");

        tokio::task::spawn_blocking(move || encode_as_jpeg(&path))
            .await
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// フォルダ直下で最も新しい画像
fn newest_image(folder: &Path) -> Option<PathBuf> {
    WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_image(e.path()))
        .filter_map(|e| {
            let modified = e.metadata().ok()?.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            Some((modified, e.into_path()))
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, path)| path)
}

/// JPEGはそのまま、それ以外は再エンコード
fn encode_as_jpeg(path: &Path) -> Result<CapturedPhoto, CameraError> {
    let bytes = std::fs::read(path).map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
    let img = image::load_from_memory(&bytes).map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
    let (width, height) = (img.width(), img.height());

    if matches!(image::guess_format(&bytes), Ok(ImageFormat::Jpeg)) {
        return Ok(CapturedPhoto::from_jpeg(&bytes, width, height));
    }

    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut jpeg, 100);
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
    debug!(width, height, "PNG等をJPEGに変換");

    Ok(CapturedPhoto::from_jpeg(&jpeg, width, height))
}
