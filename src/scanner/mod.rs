//! バーコード読み取りアダプタ
//!
//! デバイス（キーボードウェッジ型スキャナなど）は `BarcodeSource` の裏に隠す。
//! `BarcodeCapture` がデバイスの確保と解放を受け持ち、解放はどの経路でもちょうど1回。

mod wedge;

pub use wedge::{stdin, KeyboardWedgeSource};

use crate::error::{EcoPulseError, Result};
use async_trait::async_trait;
use ecopulse_common::{classify, Symbology};
use tracing::{debug, info, warn};

/// デコード済みのコードを1件ずつ返すデバイス
#[async_trait]
pub trait BarcodeSource: Send {
    /// デバイスを確保する
    async fn open(&mut self) -> Result<()>;

    /// 次のコード（`None` は入力終了＝取り消し）
    async fn next_code(&mut self) -> Result<Option<String>>;

    fn release(&mut self);
}

/// 受理したコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub code: String,
    pub symbology: Symbology,
}

/// 確保済みのスキャナ
pub struct BarcodeCapture<S: BarcodeSource> {
    source: Option<S>,
    symbologies: Vec<Symbology>,
}

impl<S: BarcodeSource> BarcodeCapture<S> {
    /// デバイスを確保（失敗は `DeviceUnavailable`）
    pub async fn start(mut source: S, symbologies: &[Symbology]) -> Result<Self> {
        if let Err(e) = source.open().await {
            warn!("Barcode scanner initialization failed: {e}");
            return Err(match e {
                EcoPulseError::DeviceUnavailable(_) => e,
                other => EcoPulseError::DeviceUnavailable(other.to_string()),
            });
        }
        info!("Barcode scanner started");

        Ok(Self {
            source: Some(source),
            symbologies: symbologies.to_vec(),
        })
    }

    /// 有効な体系のコードを1件待ち、`on_detect` に渡してから解放する
    ///
    /// 入力が終わった（取り消された）場合は `Ok(None)`。
    pub async fn detect<F, T>(mut self, on_detect: F) -> Result<Option<T>>
    where
        F: FnOnce(Detection) -> T,
    {
        let detection = self.next_detection().await;
        let outcome = detection.map(|found| found.map(on_detect));
        self.release();
        outcome
    }

    /// 取り消し
    pub fn stop(mut self) {
        self.release();
    }

    async fn next_detection(&mut self) -> Result<Option<Detection>> {
        let Some(source) = self.source.as_mut() else {
            return Ok(None);
        };

        loop {
            let code = source
                .next_code()
                .await
                .map_err(|e| EcoPulseError::DeviceUnavailable(e.to_string()))?;
            let Some(code) = code else {
                debug!("Barcode input ended without a detection");
                return Ok(None);
            };

            let code = code.trim();
            match classify(code, &self.symbologies) {
                Some(symbology) => {
                    info!(code, symbology = symbology.name(), "Barcode detected");
                    return Ok(Some(Detection {
                        code: code.to_string(),
                        symbology,
                    }));
                }
                None => debug!(code, "Skipping code outside the enabled symbologies"),
            }
        }
    }

    fn release(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.release();
            debug!("Barcode scanner released");
        }
    }
}

impl<S: BarcodeSource> Drop for BarcodeCapture<S> {
    fn drop(&mut self) {
        self.release();
    }
}
