//! 対話モード
//!
//! メニューで操作を選び、`Controller` を通して解析する。
//! 解析中は Ctrl-C で取り消せる。

use crate::badge::{save_badge, BadgeFonts, BadgeLevel, BadgeSpec};
use crate::config::Config;
use crate::controller::{Controller, PendingRequest, RunOutcome, TipRotation, View};
use crate::error::{EcoPulseError, ErrorKind, Result};
use crate::gateway::Analyzer;
use crate::input::ImageUpload;
use crate::scanner;
use crate::view;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// メニュー項目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Image,
    Url,
    Barcode,
    Scan,
    Badge,
    Reset,
    Quit,
}

impl MenuAction {
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::Image => "Analyze a product photo",
            MenuAction::Url => "Paste a product URL",
            MenuAction::Barcode => "Type a barcode",
            MenuAction::Scan => "Scan a barcode",
            MenuAction::Badge => "Generate your eco-badge",
            MenuAction::Reset => "Analyze another product",
            MenuAction::Quit => "Quit",
        }
    }
}

/// ビューごとに選べる操作
pub fn menu_for(view: View) -> Vec<MenuAction> {
    use MenuAction::*;
    match view {
        View::Idle => vec![Image, Url, Barcode, Scan, Quit],
        View::Error => vec![Reset, Image, Url, Barcode, Scan, Quit],
        View::Result => vec![Badge, Reset, Image, Url, Barcode, Quit],
        View::Loading | View::Scanning => vec![Quit],
    }
}

/// 解析中のスピナー
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Ctrl-C で完了するフューチャ
pub async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        // シグナルを待てない環境では取り消さない
        std::future::pending::<()>().await;
    }
}

/// スピナーを出しながら解析を実行
pub async fn run_with_spinner<A: Analyzer>(
    controller: &mut Controller<A>,
    pending: PendingRequest,
    show_spinner: bool,
) -> RunOutcome {
    let pb = show_spinner.then(|| spinner("Analyzing your product... (Ctrl-C to cancel)"));
    let outcome = controller.run(pending, ctrl_c()).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    if outcome == RunOutcome::Cancelled {
        println!("⏹ Analysis cancelled.");
    }
    outcome
}

/// 対話ループ
pub async fn run<A: Analyzer>(mut controller: Controller<A>, config: &Config) -> Result<()> {
    let tips = TipRotation::start(Duration::from_secs(config.tip_interval_seconds));

    println!("{}", view::render_header());

    loop {
        println!("{}", view::render_session(controller.session()));
        println!("{}", view::render_tip(tips.tip()));

        let actions = menu_for(controller.view());
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        let choice = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()
            .map_err(|e| EcoPulseError::Prompt(e.to_string()))?;

        let action = actions[choice];
        debug!(?action, "Menu action selected");

        let pending = match action {
            MenuAction::Quit => break,
            MenuAction::Reset => {
                controller.reset();
                continue;
            }
            MenuAction::Badge => {
                prompt_badge(config)?;
                continue;
            }
            MenuAction::Image => {
                let path: String = prompt_text("Image file path", false)?;
                match ImageUpload::from_path(&PathBuf::from(path.trim())) {
                    Ok(upload) => controller.session_mut().begin_image(upload),
                    Err(e) => {
                        println!("⚠ {}", e);
                        continue;
                    }
                }
            }
            MenuAction::Url => {
                let url = prompt_text("Product URL", false)?;
                controller.session_mut().begin_url(&url)
            }
            MenuAction::Barcode => {
                let code = prompt_text("Barcode", false)?;
                controller.session_mut().begin_barcode(&code)
            }
            MenuAction::Scan => {
                println!("{}", view::render_scanning());
                match controller.scan(scanner::stdin(), &config.symbologies).await {
                    Ok(Some(pending)) => Ok(pending),
                    Ok(None) => continue,
                    Err(e) => Err(e),
                }
            }
        };

        match pending {
            Ok(pending) => {
                println!("{}", view::render_loading(controller.session().input()));
                run_with_spinner(&mut controller, pending, true).await;
            }
            // 入力エラーとエラービューは次の描画で表示される
            Err(e) if e.kind() == ErrorKind::InvalidInput || controller.view() == View::Error => {
                debug!("Action rejected: {e}");
            }
            Err(e) => println!("⚠ {}", e),
        }
    }

    println!("👋 Bye!");
    Ok(())
}

fn prompt_text(prompt: &str, allow_empty: bool) -> Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(allow_empty)
        .interact_text()
        .map_err(|e| EcoPulseError::Prompt(e.to_string()))
}

fn prompt_badge(config: &Config) -> Result<()> {
    let name = prompt_text("Your Name (e.g., Alex)", true)?;
    let labels: Vec<&str> = BadgeLevel::ALL.iter().map(|l| l.label()).collect();
    let level = Select::new()
        .with_prompt("Eco level")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(|e| EcoPulseError::Prompt(e.to_string()))?;

    let spec = BadgeSpec::new(&name, Some(BadgeLevel::ALL[level]));
    let fonts = BadgeFonts::load(config);
    match save_badge(&spec, fonts.as_ref(), &config.badge_output_dir())? {
        Some(path) => println!("🏅 Badge saved: {}", path.display()),
        None => println!("⚠ The badge could not be drawn."),
    }
    Ok(())
}
