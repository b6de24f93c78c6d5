//! 解析ゲートウェイ
//!
//! 画像・URL・バーコードの入力をプロンプト＋出力スキーマに変換してモデルを呼び出し、
//! 応答を検証済みの EcoScoreResponse か分類済みエラーにして返す。
//! リトライはしない（1回のみ）。

mod gemini;

pub use gemini::{generate_content_url, GeminiClient};

use crate::error::{EcoPulseError, Result};
use async_trait::async_trait;
use ecopulse_common::{
    build_barcode_prompt, build_image_prompt, build_url_prompt, eco_score_response_schema,
    parse_eco_score_response, EcoScoreResponse,
};
use tracing::{info, warn};

/// 画像データ（エンコード前）
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// モデル呼び出し1回分
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub image: Option<InlineImage>,
    pub response_schema: serde_json::Value,
    pub temperature: f32,
}

/// リモートモデル `generate(prompt, image?, schema, temperature) -> text`
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<String>;
}

/// 解析リクエスト
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    Image {
        bytes: Vec<u8>,
        mime_type: String,
        known_barcode: Option<String>,
    },
    Url(String),
    Barcode(String),
}

impl AnalysisRequest {
    pub fn describe(&self) -> &'static str {
        match self {
            AnalysisRequest::Image { .. } => "image",
            AnalysisRequest::Url(_) => "url",
            AnalysisRequest::Barcode(_) => "barcode",
        }
    }
}

/// コントローラから見た解析機能
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<EcoScoreResponse>;
}

pub struct Gateway<M> {
    model: M,
    temperature: f32,
    schema: serde_json::Value,
}

impl<M: ModelClient> Gateway<M> {
    pub fn new(model: M, temperature: f32) -> Self {
        Self {
            model,
            temperature,
            schema: eco_score_response_schema(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// 画像から採点（既知バーコードがあれば照合を指示）
    pub async fn score_from_image(
        &self,
        image_bytes: &[u8],
        mime_type: &str,
        known_barcode: Option<&str>,
    ) -> Result<EcoScoreResponse> {
        let prompt = build_image_prompt(known_barcode);
        let image = InlineImage {
            mime_type: mime_type.to_string(),
            data: image_bytes.to_vec(),
        };
        self.score(prompt, Some(image)).await
    }

    pub async fn score_from_url(&self, url: &str) -> Result<EcoScoreResponse> {
        self.score(build_url_prompt(url), None).await
    }

    pub async fn score_from_barcode(&self, code: &str) -> Result<EcoScoreResponse> {
        self.score(build_barcode_prompt(code), None).await
    }

    async fn score(&self, prompt: String, image: Option<InlineImage>) -> Result<EcoScoreResponse> {
        let request = GenerateRequest {
            prompt,
            image,
            response_schema: self.schema.clone(),
            temperature: self.temperature,
        };

        let text = self.model.generate(request).await.map_err(normalize_failure)?;

        parse_eco_score_response(&text).map_err(|e| {
            warn!("Model reply rejected: {e}");
            EcoPulseError::MalformedModelReply(e.to_string())
        })
    }
}

/// ゲートウェイが返すのは分類済みエラーのみ
fn normalize_failure(err: EcoPulseError) -> EcoPulseError {
    match err {
        EcoPulseError::CredentialMissing
        | EcoPulseError::MalformedModelReply(_)
        | EcoPulseError::UpstreamFailure(_) => err,
        EcoPulseError::Common(e) => EcoPulseError::MalformedModelReply(e.to_string()),
        EcoPulseError::JsonParse(e) => EcoPulseError::MalformedModelReply(e.to_string()),
        other => EcoPulseError::upstream(other.to_string()),
    }
}

#[async_trait]
impl<M: ModelClient> Analyzer for Gateway<M> {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<EcoScoreResponse> {
        info!(input = request.describe(), "Requesting eco-score");
        match request {
            AnalysisRequest::Image { bytes, mime_type, known_barcode } => {
                self.score_from_image(bytes, mime_type, known_barcode.as_deref()).await
            }
            AnalysisRequest::Url(url) => self.score_from_url(url).await,
            AnalysisRequest::Barcode(code) => self.score_from_barcode(code).await,
        }
    }
}
