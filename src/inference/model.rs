//! JSON形式の線形分類モデル

use crate::error::{AttendanceError, Result};
use serde::Deserialize;

/// 同梱モデル
pub const BUNDLED_MODEL: &str = include_str!("../../assets/model.json");

#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    #[serde(default)]
    pub name: String,
    /// リサイズ後の一辺（px）
    pub input_size: u32,
    /// 平均プーリングの分割数（一辺あたり）
    pub grid: u32,
    pub labels: Vec<String>,
    /// ラベルごとの重み（grid × grid × 3）
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

impl LinearModel {
    pub fn from_json(json: &str) -> Result<Self> {
        let model: LinearModel = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    pub fn feature_len(&self) -> usize {
        (self.grid * self.grid * 3) as usize
    }

    fn validate(&self) -> Result<()> {
        if self.labels.is_empty() {
            return Err(AttendanceError::Model("labels kosong".into()));
        }
        // セルが1px未満になると平均が取れない
        if self.grid == 0 || self.input_size < self.grid || self.input_size % self.grid != 0 {
            return Err(AttendanceError::Model(format!(
                "input_size {} tidak habis dibagi grid {}",
                self.input_size, self.grid
            )));
        }
        if self.weights.len() != self.labels.len() || self.bias.len() != self.labels.len() {
            return Err(AttendanceError::Model("jumlah weights/bias tidak sama dengan labels".into()));
        }
        if let Some(row) = self.weights.iter().position(|w| w.len() != self.feature_len()) {
            return Err(AttendanceError::Model(format!(
                "weights[{}] harus berisi {} nilai",
                row,
                self.feature_len()
            )));
        }
        Ok(())
    }

    /// softmax済みのスコア（ラベル順）
    pub fn scores(&self, features: &[f32]) -> Result<Vec<f32>> {
        if features.len() != self.feature_len() {
            return Err(AttendanceError::Model(format!(
                "fitur {} != {}",
                features.len(),
                self.feature_len()
            )));
        }

        let logits: Vec<f32> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(w, b)| w.iter().zip(features).map(|(w, x)| w * x).sum::<f32>() + b)
            .collect();

        Ok(softmax(&logits))
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}
