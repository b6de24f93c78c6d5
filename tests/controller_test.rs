//! コントローラの統合テスト
//!
//! 解析器とスキャナを差し替えて、状態遷移・取り消し・古い結果の破棄を検証

use async_trait::async_trait;
use ecopulse::controller::{Completion, Controller, RunOutcome, View};
use ecopulse::error::{EcoPulseError, ErrorKind, Result};
use ecopulse::gateway::{AnalysisRequest, Analyzer};
use ecopulse::input::ImageUpload;
use ecopulse::scanner::{BarcodeSource, KeyboardWedgeSource};
use ecopulse_common::{EcoScore, EcoScoreResponse, Impact, Symbology};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn response(barcode: Option<&str>) -> EcoScoreResponse {
    EcoScoreResponse {
        eco_score: EcoScore { carbon: 60.0, recyclability: 85.0, sourcing: 40.0 },
        analysis: "Aluminium can with partial recycled content.".into(),
        impact: Impact { co2_per_year_kg: 1.5, trees_saved_per_year: 0.05, plastic_bottles_avoided: 12.0 },
        alternatives: vec!["Glass bottle".into(), "Tap water".into()],
        barcode_detected: barcode.map(str::to_string),
    }
}

/// 応答を順に返し、受け取ったリクエストを記録する
struct StubAnalyzer {
    replies: Mutex<VecDeque<Result<EcoScoreResponse>>>,
    seen: Mutex<Vec<AnalysisRequest>>,
    delay: Option<Duration>,
    dropped: Arc<AtomicBool>,
}

impl StubAnalyzer {
    fn new(replies: Vec<Result<EcoScoreResponse>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
            delay: None,
            dropped: Arc::new(AtomicBool::new(false)),
        }
    }

    fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// 完了前に破棄されたことを記録
struct DropFlag {
    flag: Arc<AtomicBool>,
    armed: bool,
}

impl Drop for DropFlag {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(true, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl Analyzer for StubAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<EcoScoreResponse> {
        self.seen.lock().unwrap().push(request.clone());
        let mut guard = DropFlag { flag: Arc::clone(&self.dropped), armed: true };
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        guard.armed = false;
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(EcoPulseError::upstream("")))
    }
}

fn jpeg() -> ImageUpload {
    ImageUpload::new("can.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0])
}

/// 画像 → 結果表示、検出バーコードを採用
#[tokio::test]
async fn test_image_analysis_success() {
    let mut controller = Controller::new(StubAnalyzer::new(vec![Ok(response(Some("5449000000996")))]));

    let completion = controller.analyze_image(jpeg()).await.unwrap();
    assert_eq!(completion, Completion::Applied(View::Result));
    assert_eq!(controller.session().barcode(), Some("5449000000996"));
    assert!(!controller.session().is_loading());

    let seen = controller.analyzer().seen.lock().unwrap();
    assert!(matches!(&seen[0], AnalysisRequest::Image { known_barcode: None, .. }));
}

/// 上流エラー → エラービュー
#[tokio::test]
async fn test_upstream_failure_shows_error() {
    let mut controller = Controller::new(StubAnalyzer::new(vec![Err(EcoPulseError::upstream(""))]));

    let completion = controller.analyze_url("https://example.com/p/1").await.unwrap();
    assert_eq!(completion, Completion::Applied(View::Error));
    let failure = controller.session().failure().unwrap();
    assert_eq!(failure.kind, ErrorKind::UpstreamFailure);
    assert!(failure.message.starts_with("Failed to get a valid eco-score"));
}

/// 認証エラーの文言
#[tokio::test]
async fn test_credential_failure_message() {
    let mut controller = Controller::new(StubAnalyzer::new(vec![Err(EcoPulseError::CredentialMissing)]));
    controller.analyze_barcode("036000291452").await.unwrap();
    let failure = controller.session().failure().unwrap();
    assert!(failure.message.starts_with("Invalid or missing API Key"));
    assert!(!failure.retryable);
}

/// 入力エラーは解析器を呼ばない
#[tokio::test]
async fn test_invalid_input_never_reaches_analyzer() {
    let mut controller = Controller::new(StubAnalyzer::new(vec![]));

    let err = controller
        .analyze_image(ImageUpload::new("doc.pdf", "application/pdf", vec![1]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(controller.analyzer().seen.lock().unwrap().is_empty());
    assert_eq!(controller.view(), View::Idle);
}

/// 取り消しで解析フューチャを破棄し、Idle に戻る
#[tokio::test(start_paused = true)]
async fn test_cancel_drops_request_and_resets() {
    let analyzer = StubAnalyzer::new(vec![Ok(response(None))]).slow(Duration::from_secs(30));
    let dropped = Arc::clone(&analyzer.dropped);
    let mut controller = Controller::new(analyzer);

    let pending = controller.session_mut().begin_url("https://example.com/p/2").unwrap();
    let outcome = controller
        .run(pending, tokio::time::sleep(Duration::from_secs(1)))
        .await;

    assert_eq!(outcome, RunOutcome::Cancelled);
    assert!(dropped.load(Ordering::SeqCst));
    assert_eq!(controller.view(), View::Idle);
    assert!(controller.session().response().is_none());
}

/// 取り消しが来なければ通常どおり完了
#[tokio::test(start_paused = true)]
async fn test_run_completes_before_cancel() {
    let analyzer = StubAnalyzer::new(vec![Ok(response(None))]).slow(Duration::from_secs(2));
    let mut controller = Controller::new(analyzer);

    let pending = controller.session_mut().begin_barcode("96385074").unwrap();
    let outcome = controller
        .run(pending, tokio::time::sleep(Duration::from_secs(60)))
        .await;

    assert_eq!(outcome, RunOutcome::Completed(Completion::Applied(View::Result)));
    assert!(!controller.analyzer().dropped.load(Ordering::SeqCst));
}

/// リセット後に届いた結果は破棄
#[tokio::test]
async fn test_result_after_reset_is_discarded() {
    let mut controller = Controller::new(StubAnalyzer::new(vec![Ok(response(None))]));

    let pending = controller.session_mut().begin_url("https://example.com/p/3").unwrap();
    controller.reset();
    let completion = controller.drive(pending).await;

    assert_eq!(completion, Completion::Discarded);
    assert_eq!(controller.view(), View::Idle);
}

/// 解析中の2件目は拒否
#[tokio::test]
async fn test_requests_are_serialized() {
    let mut controller = Controller::new(StubAnalyzer::new(vec![Ok(response(None))]));
    let pending = controller.session_mut().begin_url("https://example.com/p/4").unwrap();

    let err = controller.session_mut().begin_barcode("123").unwrap_err();
    assert!(matches!(err, EcoPulseError::RequestInFlight));

    controller.drive(pending).await;
    assert_eq!(controller.analyzer().seen.lock().unwrap().len(), 1);
}

/// スキャン → 検出 → バーコード解析
#[tokio::test]
async fn test_scan_then_analyze() {
    let mut controller = Controller::new(StubAnalyzer::new(vec![Ok(response(None))]));
    let source = KeyboardWedgeSource::new(&b"not-a-barcode!\n036000291452\n"[..]);

    let pending = controller
        .scan(source, &[Symbology::UpcA, Symbology::Ean13])
        .await
        .unwrap()
        .expect("a barcode should be detected");
    assert_eq!(controller.view(), View::Loading);

    controller.drive(pending).await;
    assert_eq!(controller.view(), View::Result);
    assert_eq!(controller.session().barcode(), Some("036000291452"));
    let seen = controller.analyzer().seen.lock().unwrap();
    assert_eq!(seen[0], AnalysisRequest::Barcode("036000291452".into()));
}

/// 空行でスキャン取り消し
#[tokio::test]
async fn test_scan_cancel() {
    let mut controller = Controller::new(StubAnalyzer::new(vec![]));
    let source = KeyboardWedgeSource::new(&b"\n"[..]);

    assert!(controller.scan(source, &Symbology::ALL).await.unwrap().is_none());
    assert_eq!(controller.view(), View::Idle);
}

struct BrokenScanner {
    released: Arc<AtomicUsize>,
}

#[async_trait]
impl BarcodeSource for BrokenScanner {
    async fn open(&mut self) -> Result<()> {
        Err(EcoPulseError::DeviceUnavailable("no camera found".into()))
    }

    async fn next_code(&mut self) -> Result<Option<String>> {
        Ok(None)
    }

    fn release(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// スキャナ初期化失敗はエラービュー
#[tokio::test]
async fn test_scanner_unavailable_shows_error() {
    let mut controller = Controller::new(StubAnalyzer::new(vec![]));
    let released = Arc::new(AtomicUsize::new(0));

    let err = controller
        .scan(BrokenScanner { released: Arc::clone(&released) }, &Symbology::ALL)
        .await
        .unwrap_err();
    assert!(matches!(err, EcoPulseError::DeviceUnavailable(_)));
    assert_eq!(controller.view(), View::Error);
    assert_eq!(released.load(Ordering::SeqCst), 0);

    // Error からはリセットで Idle
    controller.reset();
    assert_eq!(controller.view(), View::Idle);
}
