//! Gemini API連携
//!
//! `generateContent` に構造化出力スキーマ付きで1回だけリクエストし、
//! 応答テキストを返す。HTTPエラーはここで分類する。

use super::{GenerateRequest, ModelClient};
use crate::config::Config;
use crate::error::{classify_failure, EcoPulseError, Result};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

/// Gemini APIレスポンス
#[derive(Deserialize, Default)]
#[serde(default)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: Option<ResponseContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

/// Gemini エラーボディ `{"error": {"code", "message", "status"}}`
#[derive(Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Gemini REST クライアント
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    /// 設定から生成（APIキー未設定は CredentialMissing）
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key()?.to_string();
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| EcoPulseError::Config(format!("HTTP client error: {e}")))?;

        Ok(Self {
            http,
            endpoint: generate_content_url(&config.api_base_url, &config.model),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// `{base}/models/{model}:generateContent`
pub fn generate_content_url(api_base_url: &str, model: &str) -> String {
    let model = model.strip_prefix("models/").unwrap_or(model);
    format!("{}/models/{}:generateContent", api_base_url.trim_end_matches('/'), model)
}

fn build_request(request: GenerateRequest) -> GeminiRequest {
    let mut parts = Vec::new();

    if let Some(image) = request.image {
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type,
                data: base64::engine::general_purpose::STANDARD.encode(&image.data),
            },
        });
    }
    parts.push(Part::Text { text: request.prompt });

    GeminiRequest {
        contents: vec![Content { parts }],
        generation_config: GenerationConfig {
            temperature: request.temperature,
            response_mime_type: "application/json".to_string(),
            response_schema: request.response_schema,
        },
    }
}

/// 応答から本文テキストを取り出す
fn extract_text(response: GeminiResponse) -> Result<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(EcoPulseError::upstream(format!(
            "The request was blocked by the model ({reason})."
        )));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| EcoPulseError::upstream("The model returned no candidates."))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(EcoPulseError::upstream(format!(
            "The model returned an empty reply (finish reason: {reason})."
        )));
    }

    Ok(text)
}

/// HTTPエラー応答を分類
fn classify_http_error(status: reqwest::StatusCode, body: &str) -> EcoPulseError {
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return EcoPulseError::CredentialMissing;
    }

    match serde_json::from_str::<GeminiErrorBody>(body) {
        Ok(parsed) => {
            let message = parsed.error.message;
            if parsed.error.status == "UNAUTHENTICATED" {
                return EcoPulseError::CredentialMissing;
            }
            match classify_failure(&message) {
                // 上流の "Invalid JSON payload" 等はリクエスト側の問題なので応答不正扱いにしない
                EcoPulseError::MalformedModelReply(_) => EcoPulseError::upstream(message),
                other => other,
            }
        }
        Err(_) => EcoPulseError::upstream(format!("API error: {status}")),
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let has_image = request.image.is_some();
        let body = build_request(request);

        debug!(endpoint = %self.endpoint, has_image, "Sending generateContent request");

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EcoPulseError::upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(%status, "Gemini API returned an error");
            return Err(classify_http_error(status, &text));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| EcoPulseError::upstream(format!("Unreadable API response: {e}")))?;

        let text = extract_text(parsed)?;
        debug!(chars = text.len(), "Received model reply");
        Ok(text)
    }
}
