//! 構造化出力スキーマ
//!
//! Gemini `responseSchema` 形式（OpenAPIサブセット、型名は大文字）。

use serde_json::{json, Value};

/// 必須トップレベルフィールド
pub const REQUIRED_FIELDS: &[&str] = &["eco_score", "analysis", "impact", "alternatives"];

/// EcoScoreResponse の出力スキーマ
pub fn eco_score_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "eco_score": {
                "type": "OBJECT",
                "properties": {
                    "carbon": { "type": "NUMBER", "description": "Score from 0-100 for carbon footprint. Higher is better." },
                    "recyclability": { "type": "NUMBER", "description": "Score from 0-100 for recyclability. Higher is better." },
                    "sourcing": { "type": "NUMBER", "description": "Score from 0-100 for ethical sourcing. Higher is better." }
                },
                "required": ["carbon", "recyclability", "sourcing"]
            },
            "analysis": { "type": "STRING", "description": "A brief analysis of the product's environmental impact." },
            "impact": {
                "type": "OBJECT",
                "properties": {
                    "co2_per_year_kg": { "type": "NUMBER", "description": "Estimated CO2 saved per year in kg by choosing a better alternative." },
                    "trees_saved_per_year": { "type": "NUMBER", "description": "Equivalent number of trees saved per year by choosing a better alternative." },
                    "plastic_bottles_avoided": { "type": "NUMBER", "description": "Equivalent number of plastic bottles avoided per year by choosing a better alternative." }
                },
                "required": ["co2_per_year_kg", "trees_saved_per_year", "plastic_bottles_avoided"]
            },
            "alternatives": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "A list of more sustainable alternative products."
            },
            "barcode_detected": { "type": "STRING", "description": "The barcode detected from the image, if any." }
        },
        "required": REQUIRED_FIELDS
    })
}
