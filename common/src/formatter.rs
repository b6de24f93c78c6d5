//! 結果フォーマッタ
//!
//! スコアの平均・丸め・色帯判定と、インパクト数値の表示形式。

use crate::types::{EcoScore, EcoScoreResponse, Impact};

/// キャプション表示の閾値（丸め後の値がこれを超えたら表示）
pub const CAPTION_THRESHOLD: i64 = 75;

/// スコアの色帯
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Good,
    Medium,
    Poor,
}

impl ScoreBand {
    /// `> 70` → Good, `> 40` → Medium, それ以外 → Poor
    pub fn for_score(score: f64) -> Self {
        if score > 70.0 {
            ScoreBand::Good
        } else if score > 40.0 {
            ScoreBand::Medium
        } else {
            ScoreBand::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBand::Good => "good",
            ScoreBand::Medium => "medium",
            ScoreBand::Poor => "poor",
        }
    }

    /// 端末表示用の色マーカー
    pub fn marker(&self) -> &'static str {
        match self {
            ScoreBand::Good => "🟢",
            ScoreBand::Medium => "🟡",
            ScoreBand::Poor => "🔴",
        }
    }
}

/// サブスコアの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubScoreKind {
    Carbon,
    Recyclability,
    Sourcing,
}

impl SubScoreKind {
    pub const ALL: [SubScoreKind; 3] = [
        SubScoreKind::Carbon,
        SubScoreKind::Recyclability,
        SubScoreKind::Sourcing,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SubScoreKind::Carbon => "Carbon Footprint",
            SubScoreKind::Recyclability => "Recyclability",
            SubScoreKind::Sourcing => "Ethical Sourcing",
        }
    }

    pub fn caption(&self) -> &'static str {
        match self {
            SubScoreKind::Carbon => "Low carbon impact",
            SubScoreKind::Recyclability => "Highly recyclable",
            SubScoreKind::Sourcing => "Sustainably sourced",
        }
    }

    pub fn value(&self, score: &EcoScore) -> f64 {
        match self {
            SubScoreKind::Carbon => score.carbon,
            SubScoreKind::Recyclability => score.recyclability,
            SubScoreKind::Sourcing => score.sourcing,
        }
    }
}

/// 表示用サブスコア行
#[derive(Debug, Clone, PartialEq)]
pub struct SubScoreLine {
    pub kind: SubScoreKind,
    pub value: i64,
    pub band: ScoreBand,
    pub caption: Option<&'static str>,
}

/// 表示用スコアカード
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    pub overall: i64,
    pub overall_band: ScoreBand,
    pub lines: Vec<SubScoreLine>,
}

/// 3つのサブスコアの算術平均
pub fn overall_score(score: &EcoScore) -> f64 {
    (score.carbon + score.recyclability + score.sourcing) / 3.0
}

/// 表示用の丸め（0.5は切り上げ）
pub fn display_score(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// キャプションは丸め後の値が閾値を超えた場合のみ
pub fn caption_for(kind: SubScoreKind, value: f64) -> Option<&'static str> {
    (display_score(value) > CAPTION_THRESHOLD).then(|| kind.caption())
}

/// スコアカードを構築
///
/// 色帯は丸め前の値で判定する。
pub fn score_card(score: &EcoScore) -> ScoreCard {
    let overall = overall_score(score);
    let lines = SubScoreKind::ALL
        .iter()
        .map(|&kind| {
            let value = kind.value(score);
            SubScoreLine {
                kind,
                value: display_score(value),
                band: ScoreBand::for_score(value),
                caption: caption_for(kind, value),
            }
        })
        .collect();

    ScoreCard {
        overall: display_score(overall),
        overall_band: ScoreBand::for_score(overall),
        lines,
    }
}

/// 小数1桁
pub fn format_decimal(value: f64) -> String {
    format!("{:.1}", value)
}

/// 整数なら小数点なし、それ以外はそのまま
pub fn format_count(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// インパクト3項目を (値, ラベル) で返す
pub fn impact_lines(impact: &Impact) -> [(String, &'static str); 3] {
    [
        (format!("{} kg", format_decimal(impact.co2_per_year_kg)), "CO₂ saved/year"),
        (format_decimal(impact.trees_saved_per_year), "Trees saved/year"),
        (format_count(impact.plastic_bottles_avoided), "Plastic bottles avoided"),
    ]
}

/// 表示するバーコード（応答の検出値を優先）
pub fn display_barcode<'a>(response: &'a EcoScoreResponse, known: Option<&'a str>) -> Option<&'a str> {
    response
        .detected_barcode()
        .or_else(|| known.map(str::trim).filter(|code| !code.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(carbon: f64, recyclability: f64, sourcing: f64) -> EcoScore {
        EcoScore { carbon, recyclability, sourcing }
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(ScoreBand::for_score(71.0), ScoreBand::Good);
        assert_eq!(ScoreBand::for_score(70.0), ScoreBand::Medium);
        assert_eq!(ScoreBand::for_score(41.0), ScoreBand::Medium);
        assert_eq!(ScoreBand::for_score(40.0), ScoreBand::Poor);
        assert_eq!(ScoreBand::for_score(0.0), ScoreBand::Poor);
        assert_eq!(ScoreBand::for_score(100.0), ScoreBand::Good);
    }

    #[test]
    fn test_band_uses_unrounded_value() {
        // 70.4 は表示上 70 だが帯は Good
        assert_eq!(ScoreBand::for_score(70.4), ScoreBand::Good);
        assert_eq!(display_score(70.4), 70);
    }

    #[test]
    fn test_overall_score_scenario() {
        let s = score(80.0, 90.0, 70.0);
        assert_eq!(display_score(overall_score(&s)), 80);
        assert_eq!(ScoreBand::for_score(overall_score(&s)), ScoreBand::Good);
    }

    #[test]
    fn test_overall_rounding() {
        // (70 + 71 + 71) / 3 = 70.666...
        let s = score(70.0, 71.0, 71.0);
        assert_eq!(display_score(overall_score(&s)), 71);
        // (10 + 10 + 11) / 3 = 10.333...
        let s = score(10.0, 10.0, 11.0);
        assert_eq!(display_score(overall_score(&s)), 10);
        assert_eq!(display_score(40.5), 41);
    }

    #[test]
    fn test_overall_for_all_integer_triples_sampled() {
        for carbon in (0..=100).step_by(7) {
            for recyclability in (0..=100).step_by(11) {
                for sourcing in (0..=100).step_by(13) {
                    let s = score(carbon as f64, recyclability as f64, sourcing as f64);
                    let sum = carbon + recyclability + sourcing;
                    let expected = ((sum as f64) / 3.0).round() as i64;
                    assert_eq!(display_score(overall_score(&s)), expected);
                }
            }
        }
    }

    #[test]
    fn test_caption_threshold() {
        assert_eq!(caption_for(SubScoreKind::Carbon, 76.0), Some("Low carbon impact"));
        assert_eq!(caption_for(SubScoreKind::Carbon, 75.0), None);
        // 75.5 は丸めて 76
        assert_eq!(caption_for(SubScoreKind::Recyclability, 75.5), Some("Highly recyclable"));
        assert_eq!(caption_for(SubScoreKind::Sourcing, 75.4), None);
    }

    #[test]
    fn test_score_card() {
        let card = score_card(&score(80.0, 90.0, 35.0));
        assert_eq!(card.overall, 68);
        assert_eq!(card.overall_band, ScoreBand::Medium);
        assert_eq!(card.lines.len(), 3);
        assert_eq!(card.lines[0].kind, SubScoreKind::Carbon);
        assert_eq!(card.lines[0].caption, Some("Low carbon impact"));
        assert_eq!(card.lines[2].band, ScoreBand::Poor);
        assert_eq!(card.lines[2].caption, None);
    }

    #[test]
    fn test_impact_formatting() {
        let impact = Impact {
            co2_per_year_kg: 12.345,
            trees_saved_per_year: 2.0,
            plastic_bottles_avoided: 150.0,
        };
        let lines = impact_lines(&impact);
        assert_eq!(lines[0].0, "12.3 kg");
        assert_eq!(lines[1].0, "2.0");
        assert_eq!(lines[2].0, "150");
        assert_eq!(format_count(12.5), "12.5");
    }

    #[test]
    fn test_display_barcode_prefers_detected() {
        let response = EcoScoreResponse {
            eco_score: score(1.0, 2.0, 3.0),
            analysis: String::new(),
            impact: Impact { co2_per_year_kg: 0.0, trees_saved_per_year: 0.0, plastic_bottles_avoided: 0.0 },
            alternatives: vec![],
            barcode_detected: Some("111".to_string()),
        };
        assert_eq!(display_barcode(&response, Some("222")), Some("111"));

        let response = EcoScoreResponse { barcode_detected: None, ..response };
        assert_eq!(display_barcode(&response, Some("222")), Some("222"));
        assert_eq!(display_barcode(&response, Some("")), None);
    }
}
