//! 端末内推論（補助機能）
//!
//! `initialize()` が成功してから `predict()` を呼ぶ。モデルは最初の予測時に1回だけ読み込む。
//! 失敗はログに出して `None` を返す。

mod model;
mod preprocess;

pub use model::{LinearModel, BUNDLED_MODEL};
pub use preprocess::features;

use crate::error::{AttendanceError, Result};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
    /// (ラベル, スコア) をモデルのラベル順で
    pub scores: Vec<(String, f32)>,
}

#[derive(Debug, Clone)]
enum ModelSource {
    Bundled,
    File(PathBuf),
}

pub struct Classifier {
    source: ModelSource,
    initialized: AtomicBool,
    model: OnceCell<LinearModel>,
}

impl Classifier {
    pub fn bundled() -> Self {
        Self::with_source(ModelSource::Bundled)
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::with_source(ModelSource::File(path.into()))
    }

    /// 設定に model_path があればそれを使う
    pub fn from_config(config: &crate::config::Config) -> Self {
        match &config.model_path {
            Some(path) => Self::from_path(path),
            None => Self::bundled(),
        }
    }

    fn with_source(source: ModelSource) -> Self {
        Self {
            source,
            initialized: AtomicBool::new(false),
            model: OnceCell::new(),
        }
    }

    /// 何度呼んでもよい
    pub fn initialize(&self) -> bool {
        if self.initialized.load(Ordering::Acquire) {
            return true;
        }
        let ready = match &self.source {
            ModelSource::Bundled => true,
            ModelSource::File(path) => path.is_file(),
        };
        if ready {
            self.initialized.store(true, Ordering::Release);
            debug!("推論の初期化完了");
        } else {
            warn!(source = ?self.source, "推論の初期化に失敗");
        }
        ready
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    fn model(&self) -> Result<&LinearModel> {
        self.model.get_or_try_init(|| -> Result<LinearModel> {
            let json = match &self.source {
                ModelSource::Bundled => BUNDLED_MODEL.to_string(),
                ModelSource::File(path) => std::fs::read_to_string(path)?,
            };
            let model = LinearModel::from_json(&json)?;
            info!(name = %model.name, labels = model.labels.len(), "モデル読み込み");
            Ok(model)
        })
    }

    pub fn predict(&self, image_path: &Path) -> Option<Prediction> {
        if !self.is_initialized() {
            warn!("initialize() の前に predict() が呼ばれました");
            return None;
        }
        match self.try_predict(image_path) {
            Ok(prediction) => Some(prediction),
            Err(e) => {
                warn!(path = %image_path.display(), error = %e, "予測失敗");
                None
            }
        }
    }

    fn try_predict(&self, image_path: &Path) -> Result<Prediction> {
        let model = self.model()?;
        let img = image::open(image_path).map_err(|e| AttendanceError::Model(e.to_string()))?;
        let feats = features(&img, model.input_size, model.grid);
        let scores = model.scores(&feats)?;

        let (best, confidence) = scores
            .iter()
            .cloned()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |acc, (i, s)| if s > acc.1 { (i, s) } else { acc });

        Ok(Prediction {
            label: model.labels[best].clone(),
            confidence,
            scores: model.labels.iter().cloned().zip(scores).collect(),
        })
    }
}
