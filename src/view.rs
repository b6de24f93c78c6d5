//! 端末表示（状態 → 文字列）
//!
//! 描画は純粋関数のみ。出力は呼び出し側が `println!` する。

use crate::controller::{Failure, Session, SessionInput, View};
use crate::error::ErrorKind;
use ecopulse_common::formatter::{display_barcode, impact_lines};
use ecopulse_common::{score_card, EcoScoreResponse};
use std::fmt::Write;

const BAR_WIDTH: usize = 20;

pub fn render_header() -> String {
    "🌱 EcoPulse α\n   Your AI-powered sustainability assistant.\n".to_string()
}

/// 現在のビューを描画
pub fn render_session(session: &Session) -> String {
    match session.view() {
        View::Idle => render_idle(session),
        View::Scanning => render_scanning(),
        View::Loading => render_loading(session.input()),
        View::Result => match session.response() {
            Some(response) => render_result(response, session.barcode()),
            None => render_idle(session),
        },
        View::Error => match session.failure() {
            Some(failure) => render_error(failure),
            None => render_idle(session),
        },
    }
}

pub fn render_idle(session: &Session) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📷 Choose an image, paste a product URL, or scan a barcode.");
    let _ = writeln!(out, "   Analyze a product to get its eco-score.");

    if let Some(code) = session.barcode() {
        if session.response().is_none() {
            let _ = writeln!(out, "\n🔖 Scanned barcode: {}. Upload an image to add context.", code);
        }
    }
    if let Some(failure) = session.failure().filter(|f| f.kind == ErrorKind::InvalidInput) {
        let _ = writeln!(out, "\n⚠ {}", failure.message);
    }
    out
}

pub fn render_scanning() -> String {
    "📡 Point your scanner at a barcode.\n   Press Enter on an empty line to cancel.\n".to_string()
}

pub fn render_loading(input: Option<&SessionInput>) -> String {
    let mut out = String::new();
    match input {
        Some(SessionInput::Image(upload)) => {
            let _ = writeln!(out, "🖼  {}", upload.file_name);
        }
        Some(SessionInput::Url(url)) => {
            let _ = writeln!(out, "🔗 {}", url);
        }
        None => {}
    }
    let _ = writeln!(out, "⏳ Analyzing your product...");
    let _ = writeln!(out, "   This might take a moment.");
    out
}

/// スコアバー（5点で1マス）
pub fn score_bar(value: i64) -> String {
    let filled = (value.clamp(0, 100) as usize * BAR_WIDTH + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn render_result(response: &EcoScoreResponse, known_barcode: Option<&str>) -> String {
    let card = score_card(&response.eco_score);
    let mut out = String::new();

    let _ = writeln!(out, "🌍 Eco-Score Analysis");
    let _ = writeln!(out, "─────────────────────────────────────────");
    let _ = writeln!(out, "{} Overall Score: {}", card.overall_band.marker(), card.overall);
    if let Some(code) = display_barcode(response, known_barcode) {
        let _ = writeln!(out, "   Barcode: {}", code);
    }
    let _ = writeln!(out);

    for line in &card.lines {
        let _ = writeln!(
            out,
            "{} {:<17} {} {:>3}",
            line.band.marker(),
            line.kind.label(),
            score_bar(line.value),
            line.value
        );
        if let Some(caption) = line.caption {
            let _ = writeln!(out, "   {}", caption);
        }
    }

    let _ = writeln!(out, "\n📝 Expert Analysis");
    let _ = writeln!(out, "   {}", response.analysis.trim());

    let _ = writeln!(out, "\n📊 Impact");
    for (value, label) in impact_lines(&response.impact) {
        let _ = writeln!(out, "   {:>10}  {}", value, label);
    }

    if !response.alternatives.is_empty() {
        let _ = writeln!(out, "\n♻ Sustainable Alternatives");
        for alt in &response.alternatives {
            let _ = writeln!(out, "   • {}", alt);
        }
    }
    out
}

pub fn render_error(failure: &Failure) -> String {
    let mut out = format!("❌ Error: {}\n", failure.message);
    if failure.retryable {
        out.push_str("   Please try again.\n");
    }
    out
}

pub fn render_tip(tip: &str) -> String {
    format!("💡 Eco Tips to Save the Planet\n   \"{}\"\n", tip)
}
