//! アプリケーションコントローラ
//!
//! `Session` の状態遷移と `Analyzer` 呼び出しを結びつける。
//! 同時に走る解析は1件のみ（Loading 中の開始は `RequestInFlight`）。

mod session;
mod tips;

pub use session::{Completion, Failure, Generation, PendingRequest, Session, SessionInput, View};
pub use tips::{TipRotation, ECO_TIPS};

use crate::error::Result;
use crate::gateway::Analyzer;
use crate::input::ImageUpload;
use crate::scanner::{BarcodeCapture, BarcodeSource};
use ecopulse_common::Symbology;
use std::future::Future;
use tracing::{debug, info};

/// `Controller::run` の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(Completion),
    /// 完了前に取り消された（セッションはリセット済み）
    Cancelled,
}

pub struct Controller<A> {
    analyzer: A,
    session: Session,
}

impl<A: Analyzer> Controller<A> {
    pub fn new(analyzer: A) -> Self {
        Self {
            analyzer,
            session: Session::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    pub fn view(&self) -> View {
        self.session.view()
    }

    /// 解析を実行して結果を反映
    pub async fn drive(&mut self, pending: PendingRequest) -> Completion {
        let result = self.analyzer.analyze(&pending.request).await;
        self.apply(pending.generation, result)
    }

    /// 解析と `cancel` を競わせる
    ///
    /// `cancel` が先に完了した場合は解析フューチャを破棄し、セッションをリセットする。
    pub async fn run<F>(&mut self, pending: PendingRequest, cancel: F) -> RunOutcome
    where
        F: Future<Output = ()>,
    {
        let result = tokio::select! {
            result = self.analyzer.analyze(&pending.request) => Some(result),
            _ = cancel => None,
        };

        match result {
            Some(result) => RunOutcome::Completed(self.apply(pending.generation, result)),
            None => {
                info!(generation = ?pending.generation, "Analysis cancelled");
                self.session.reset();
                RunOutcome::Cancelled
            }
        }
    }

    pub async fn analyze_image(&mut self, upload: ImageUpload) -> Result<Completion> {
        let pending = self.session.begin_image(upload)?;
        Ok(self.drive(pending).await)
    }

    pub async fn analyze_url(&mut self, text: &str) -> Result<Completion> {
        let pending = self.session.begin_url(text)?;
        Ok(self.drive(pending).await)
    }

    pub async fn analyze_barcode(&mut self, code: &str) -> Result<Completion> {
        let pending = self.session.begin_barcode(code)?;
        Ok(self.drive(pending).await)
    }

    /// スキャンしてバーコード解析リクエストを作る
    ///
    /// 取り消し（入力終了）時は `Ok(None)` で Idle に戻る。
    /// スキャナを確保できない場合は Error ビューになる。
    pub async fn scan<S: BarcodeSource>(
        &mut self,
        source: S,
        symbologies: &[Symbology],
    ) -> Result<Option<PendingRequest>> {
        self.session.begin_scan()?;

        let capture = match BarcodeCapture::start(source, symbologies).await {
            Ok(capture) => capture,
            Err(e) => {
                self.session.scan_failed(&e);
                return Err(e);
            }
        };

        let session = &mut self.session;
        let detected = capture
            .detect(|found| session.barcode_detected(&found.code))
            .await;
        match detected {
            Ok(Some(pending)) => pending.map(Some),
            Ok(None) => {
                self.session.cancel_scan();
                Ok(None)
            }
            Err(e) => {
                self.session.scan_failed(&e);
                Err(e)
            }
        }
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    fn apply(
        &mut self,
        generation: Generation,
        result: Result<ecopulse_common::EcoScoreResponse>,
    ) -> Completion {
        let completion = self.session.complete(generation, result);
        debug!(?completion, "Analysis finished");
        completion
    }
}
