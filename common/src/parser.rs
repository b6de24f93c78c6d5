//! APIレスポンスパーサー
//!
//! モデルの応答テキストからMarkdownのコードフェンスを取り除き、
//! EcoScoreResponseとしてパース・検証する

use crate::error::{Error, Result};
use crate::types::EcoScoreResponse;

const FENCE: &str = "```";

/// 応答テキストからコードフェンスを除去
///
/// コードフェンス（json言語タグ付き・なし）で囲まれている場合は中身を返し、
/// フェンスが無ければ前後の空白を除いたテキストをそのまま返す。
/// 閉じフェンス以降の文章は捨てる。
///
/// # Examples
/// ```
/// use ecopulse_common::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```json{\"a\":1}```"), "{\"a\":1}");
/// assert_eq!(strip_code_fences("  {\"a\":1}\n"), "{\"a\":1}");
/// ```
pub fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };

    // 言語タグ
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);

    match rest.find(FENCE) {
        Some(end) => rest[..end].trim(),
        None => rest.trim(),
    }
}

/// エコスコア応答をパース
///
/// # Returns
/// * `Ok(EcoScoreResponse)` - パースと値検証に成功
/// * `Err` - 空応答、JSON不正、必須フィールド欠落、範囲外の値
pub fn parse_eco_score_response(response: &str) -> Result<EcoScoreResponse> {
    let json_str = strip_code_fences(response);
    if json_str.is_empty() {
        return Err(Error::Parse("empty model reply".into()));
    }

    let parsed: EcoScoreResponse = serde_json::from_str(json_str)?;
    parsed.validate()?;
    Ok(parsed)
}
