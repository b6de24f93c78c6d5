use super::BarcodeSource;
use crate::error::{EcoPulseError, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};

/// キーボードウェッジ型スキャナ
///
/// デコード済みのコードを1行ずつ入力してくる。空行かEOFで取り消し。
pub struct KeyboardWedgeSource<R> {
    reader: R,
    opened: bool,
}

impl<R> KeyboardWedgeSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, opened: false }
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }
}

/// 標準入力をスキャナとして使う
pub fn stdin() -> KeyboardWedgeSource<BufReader<Stdin>> {
    KeyboardWedgeSource::new(BufReader::new(tokio::io::stdin()))
}

#[async_trait]
impl<R> BarcodeSource for KeyboardWedgeSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn open(&mut self) -> Result<()> {
        self.opened = true;
        Ok(())
    }

    async fn next_code(&mut self) -> Result<Option<String>> {
        if !self.opened {
            return Err(EcoPulseError::DeviceUnavailable("scanner is not open".into()));
        }

        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }

        let code = line.trim();
        if code.is_empty() {
            Ok(None)
        } else {
            Ok(Some(code.to_string()))
        }
    }

    fn release(&mut self) {
        self.opened = false;
    }
}
