//! セッション状態（ビュー／リクエスト状態機械）
//!
//! I/Oを持たない同期的な状態遷移のみ。非同期の駆動は `Controller` が行う。
//!
//! ```text
//! Idle --image/url/barcode--> Loading --ok--> Result
//!   |                            \--err--> Error
//!   \--scan--> Scanning --detected--> Loading
//!                  \--cancel--> Idle
//! (any) --reset--> Idle
//! ```

use crate::error::{EcoPulseError, ErrorKind, Result};
use crate::gateway::AnalysisRequest;
use crate::input::{validate_barcode, validate_image, validate_url, ImageUpload};
use ecopulse_common::EcoScoreResponse;
use tracing::debug;

/// 表示中のビュー（常にどれか1つ）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Idle,
    Scanning,
    Loading,
    Result,
    Error,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Idle => "idle",
            View::Scanning => "scanning",
            View::Loading => "loading",
            View::Result => "showing a result",
            View::Error => "showing an error",
        }
    }
}

/// リクエスト世代トークン
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// 送信待ちのリクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub generation: Generation,
    pub request: AnalysisRequest,
}

/// 現在の入力
#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
    Image(ImageUpload),
    Url(String),
}

/// 画面に表示する失敗
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl From<&EcoPulseError> for Failure {
    fn from(err: &EcoPulseError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

/// 結果の適用有無
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied(View),
    /// 世代が古い（リセット後などに届いた）ので破棄
    Discarded,
}

#[derive(Debug, Default)]
pub struct Session {
    input: Option<SessionInput>,
    url_text: String,
    barcode: Option<String>,
    response: Option<EcoScoreResponse>,
    loading: bool,
    failure: Option<Failure>,
    scanning: bool,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        if self.scanning {
            View::Scanning
        } else if self.loading {
            View::Loading
        } else if self.response.is_some() {
            View::Result
        } else if self
            .failure
            .as_ref()
            .is_some_and(|f| f.kind != ErrorKind::InvalidInput)
        {
            View::Error
        } else {
            View::Idle
        }
    }

    pub fn input(&self) -> Option<&SessionInput> {
        self.input.as_ref()
    }

    pub fn url_text(&self) -> &str {
        &self.url_text
    }

    pub fn barcode(&self) -> Option<&str> {
        self.barcode.as_deref()
    }

    pub fn response(&self) -> Option<&EcoScoreResponse> {
        self.response.as_ref()
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub fn current_generation(&self) -> Generation {
        Generation(self.generation)
    }

    /// 画像を選択（クリック／ドロップ）
    pub fn begin_image(&mut self, upload: ImageUpload) -> Result<PendingRequest> {
        self.ensure_can_start("analyze an image")?;
        if let Err(err) = validate_image(&upload) {
            return Err(self.reject(err));
        }

        let request = AnalysisRequest::Image {
            bytes: upload.bytes.clone(),
            mime_type: upload.mime_type.clone(),
            known_barcode: self.barcode.clone(),
        };
        self.input = Some(SessionInput::Image(upload));
        Ok(self.start(request))
    }

    /// 商品URLを送信
    pub fn begin_url(&mut self, text: &str) -> Result<PendingRequest> {
        self.ensure_can_start("analyze a URL")?;
        self.url_text = text.to_string();
        let url = match validate_url(text) {
            Ok(url) => url.to_string(),
            Err(err) => return Err(self.reject(err)),
        };

        self.input = Some(SessionInput::Url(url.clone()));
        Ok(self.start(AnalysisRequest::Url(url)))
    }

    /// 手入力バーコードで解析
    pub fn begin_barcode(&mut self, text: &str) -> Result<PendingRequest> {
        self.ensure_can_start("analyze a barcode")?;
        let code = match validate_barcode(text) {
            Ok(code) => code.to_string(),
            Err(err) => return Err(self.reject(err)),
        };

        self.input = None;
        self.barcode = Some(code.clone());
        Ok(self.start(AnalysisRequest::Barcode(code)))
    }

    /// 既知のバーコードを設定（画像解析時に照合させる）
    pub fn set_barcode(&mut self, text: &str) -> Result<()> {
        self.ensure_can_start("set a barcode")?;
        match validate_barcode(text) {
            Ok(code) => {
                self.barcode = Some(code.to_string());
                Ok(())
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    /// スキャン開始（Idle / Error から）
    pub fn begin_scan(&mut self) -> Result<()> {
        match self.view() {
            View::Idle | View::Error => {
                self.failure = None;
                self.scanning = true;
                debug!("Entered scanning");
                Ok(())
            }
            View::Loading => Err(EcoPulseError::RequestInFlight),
            other => Err(EcoPulseError::InvalidTransition {
                action: "start scanning",
                state: other.as_str(),
            }),
        }
    }

    /// スキャンでコードを検出 → そのまま Loading へ
    pub fn barcode_detected(&mut self, code: &str) -> Result<PendingRequest> {
        if !self.scanning {
            return Err(EcoPulseError::InvalidTransition {
                action: "accept a scanned barcode",
                state: self.view().as_str(),
            });
        }
        self.scanning = false;

        let code = code.trim().to_string();
        self.input = None;
        self.barcode = Some(code.clone());
        Ok(self.start(AnalysisRequest::Barcode(code)))
    }

    /// スキャンを取り消し（Scanning 以外では何もしない）
    pub fn cancel_scan(&mut self) -> bool {
        let was_scanning = self.scanning;
        self.scanning = false;
        was_scanning
    }

    /// スキャナ初期化失敗を Error ビューとして表示
    pub fn scan_failed(&mut self, err: &EcoPulseError) {
        self.scanning = false;
        self.failure = Some(Failure::from(err));
    }

    /// 解析結果を適用
    pub fn complete(
        &mut self,
        generation: Generation,
        result: Result<EcoScoreResponse>,
    ) -> Completion {
        if generation != self.current_generation() || !self.loading {
            debug!(?generation, current = self.generation, "Discarding stale analysis result");
            return Completion::Discarded;
        }

        self.loading = false;
        match result {
            Ok(response) => {
                if self.barcode.is_none() {
                    self.barcode = response.detected_barcode().map(str::to_string);
                }
                self.response = Some(response);
            }
            Err(err) => {
                self.failure = Some(Failure::from(&err));
            }
        }
        Completion::Applied(self.view())
    }

    /// 全てクリアして Idle へ（処理中の結果は以後破棄される）
    pub fn reset(&mut self) {
        self.input = None;
        self.url_text.clear();
        self.barcode = None;
        self.response = None;
        self.failure = None;
        self.loading = false;
        self.scanning = false;
        self.generation += 1;
    }

    fn ensure_can_start(&self, action: &'static str) -> Result<()> {
        match self.view() {
            View::Loading => Err(EcoPulseError::RequestInFlight),
            View::Scanning => Err(EcoPulseError::InvalidTransition {
                action,
                state: View::Scanning.as_str(),
            }),
            View::Idle | View::Error | View::Result => Ok(()),
        }
    }

    /// 入力検証エラーを記録（リクエストは送らない）
    ///
    /// 前回の結果は破棄して Idle に戻し、エラーをインライン表示させる。
    fn reject(&mut self, err: EcoPulseError) -> EcoPulseError {
        self.response = None;
        self.failure = Some(Failure::from(&err));
        err
    }

    fn start(&mut self, request: AnalysisRequest) -> PendingRequest {
        self.response = None;
        self.failure = None;
        self.loading = true;
        self.generation += 1;
        debug!(generation = self.generation, input = request.describe(), "Analysis started");
        PendingRequest {
            generation: Generation(self.generation),
            request,
        }
    }
}
