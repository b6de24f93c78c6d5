//! 解析結果の型定義
//!
//! CLIとテストで共有される型:
//! - EcoScore: 3つのサブスコア（0-100）
//! - Impact: 年間換算の環境インパクト
//! - EcoScoreResponse: モデルの応答全体

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// サブスコアの範囲
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

/// エコスコア（高いほど良い）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EcoScore {
    pub carbon: f64,
    pub recyclability: f64,
    pub sourcing: f64,
}

impl EcoScore {
    /// (フィールド名, 値) の組で列挙
    pub fn entries(&self) -> [(&'static str, f64); 3] {
        [
            ("carbon", self.carbon),
            ("recyclability", self.recyclability),
            ("sourcing", self.sourcing),
        ]
    }
}

/// 代替品に切り替えた場合の年間インパクト
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub co2_per_year_kg: f64,
    pub trees_saved_per_year: f64,
    pub plastic_bottles_avoided: f64,
}

/// モデル応答
///
/// `barcode_detected` 以外は必須。欠けている場合はデシリアライズで失敗する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcoScoreResponse {
    pub eco_score: EcoScore,
    pub analysis: String,
    pub impact: Impact,
    pub alternatives: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode_detected: Option<String>,
}

impl EcoScoreResponse {
    /// 形状チェック後の値検証
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.eco_score.entries() {
            if !value.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&value) {
                return Err(Error::Validation(format!(
                    "eco_score.{} out of range: {}",
                    name, value
                )));
            }
        }

        let impact = [
            ("co2_per_year_kg", self.impact.co2_per_year_kg),
            ("trees_saved_per_year", self.impact.trees_saved_per_year),
            ("plastic_bottles_avoided", self.impact.plastic_bottles_avoided),
        ];
        for (name, value) in impact {
            if !value.is_finite() {
                return Err(Error::Validation(format!("impact.{} is not a number", name)));
            }
        }

        Ok(())
    }

    /// 空文字のバーコードは未検出として扱う
    pub fn detected_barcode(&self) -> Option<&str> {
        self.barcode_detected
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}
