//! 入力（画像ファイル・商品URL・バーコード）の読み込みと検証

use crate::error::{EcoPulseError, Result};
use image::ImageFormat;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref ABSOLUTE_URL: Regex = Regex::new(r"^(?i)https?://\S+$").expect("valid regex");
}

/// 受け付けた画像
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// ファイルを読み込み、メディアタイプを判定
    ///
    /// 判定は内容（マジックバイト）優先、次に拡張子。どちらでも分からなければ
    /// `application/octet-stream`。画像かどうかの検証はここでは行わない。
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(EcoPulseError::InvalidInput(format!(
                "File not found: {}",
                path.display()
            )));
        }

        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let mime_type = detect_mime_type(path, &bytes);

        Ok(Self { file_name, mime_type, bytes })
    }

    pub fn is_image(&self) -> bool {
        is_image_mime(&self.mime_type)
    }
}

/// メディアタイプ判定
pub fn detect_mime_type(path: &Path, bytes: &[u8]) -> String {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type().to_string();
    }
    if let Ok(format) = ImageFormat::from_path(path) {
        return format.to_mime_type().to_string();
    }
    match path.extension().and_then(|e| e.to_str()).map(str::to_lowercase).as_deref() {
        Some("txt") => "text/plain".to_string(),
        Some("pdf") => "application/pdf".to_string(),
        Some("json") => "application/json".to_string(),
        _ => "application/octet-stream".to_string(),
    }
}

pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.trim().to_ascii_lowercase().starts_with("image/")
}

/// 画像入力の検証
pub fn validate_image(upload: &ImageUpload) -> Result<()> {
    if !upload.is_image() {
        return Err(EcoPulseError::InvalidInput("Please upload an image file.".into()));
    }
    if upload.bytes.is_empty() {
        return Err(EcoPulseError::InvalidInput("The selected image is empty.".into()));
    }
    Ok(())
}

/// 商品URLの検証（前後空白を除いた値を返す）
pub fn validate_url(text: &str) -> Result<&str> {
    let url = text.trim();
    if url.is_empty() || !ABSOLUTE_URL.is_match(url) {
        return Err(EcoPulseError::InvalidInput("Please enter a valid product URL.".into()));
    }
    Ok(url)
}

/// 手入力バーコードの検証
pub fn validate_barcode(text: &str) -> Result<&str> {
    let code = text.trim();
    if code.is_empty() {
        return Err(EcoPulseError::InvalidInput("Please enter a barcode.".into()));
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn test_detect_mime_from_content() {
        assert_eq!(detect_mime_type(Path::new("photo.bin"), PNG_MAGIC), "image/png");
        assert_eq!(detect_mime_type(Path::new("noext"), JPEG_MAGIC), "image/jpeg");
    }

    #[test]
    fn test_detect_mime_from_extension() {
        assert_eq!(detect_mime_type(Path::new("photo.webp"), b"????"), "image/webp");
        assert_eq!(detect_mime_type(Path::new("notes.txt"), b"hello"), "text/plain");
        assert_eq!(detect_mime_type(Path::new("blob"), b"hello"), "application/octet-stream");
    }

    #[test]
    fn test_validate_image_rejects_text() {
        let upload = ImageUpload::new("notes.txt", "text/plain", b"hello".to_vec());
        let err = validate_image(&upload).unwrap_err();
        assert!(matches!(err, EcoPulseError::InvalidInput(_)));
        assert_eq!(err.to_string(), "Please upload an image file.");
    }

    #[test]
    fn test_validate_image_accepts_any_image_subtype() {
        for mime in ["image/jpeg", "image/png", "IMAGE/HEIC", "image/webp"] {
            let upload = ImageUpload::new("x", mime, vec![1, 2, 3]);
            assert!(validate_image(&upload).is_ok(), "{} should be accepted", mime);
        }
    }

    #[test]
    fn test_validate_image_rejects_empty_bytes() {
        let upload = ImageUpload::new("x.jpg", "image/jpeg", vec![]);
        assert!(validate_image(&upload).is_err());
    }

    #[test]
    fn test_validate_url() {
        assert_eq!(validate_url("  https://shop.example.com/p/42 ").unwrap(), "https://shop.example.com/p/42");
        assert!(validate_url("HTTP://EXAMPLE.COM").is_ok());
        assert!(validate_url("").is_err());
        assert!(validate_url("   ").is_err());
        assert!(validate_url("example.com/product").is_err());
        assert!(validate_url("ftp://example.com/file").is_err());
        assert!(validate_url("https://").is_err());
        assert!(validate_url("https://exa mple.com").is_err());
    }

    #[test]
    fn test_validate_barcode() {
        assert_eq!(validate_barcode(" 4006381333931\n").unwrap(), "4006381333931");
        assert!(validate_barcode("  ").is_err());
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = ImageUpload::from_path(Path::new("/nonexistent/photo-12345.jpg")).unwrap_err();
        assert!(matches!(err, EcoPulseError::InvalidInput(_)));
    }
}
