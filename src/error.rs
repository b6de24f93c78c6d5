use thiserror::Error;

/// 認証情報エラー時の表示文言
pub const CREDENTIAL_MESSAGE: &str =
    "Invalid or missing API Key. Please ensure your API_KEY is correctly configured.";

/// 応答不正時の表示文言
pub const MALFORMED_REPLY_MESSAGE: &str = "The model returned an invalid response. Please try again.";

/// 上流エラーにメッセージが無い場合の表示文言
pub const UPSTREAM_FALLBACK_MESSAGE: &str =
    "Failed to get a valid eco-score from the API. The service may be temporarily unavailable.";

#[derive(Error, Debug)]
pub enum EcoPulseError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{}", CREDENTIAL_MESSAGE)]
    CredentialMissing,

    #[error("{}", MALFORMED_REPLY_MESSAGE)]
    MalformedModelReply(String),

    #[error("{0}")]
    UpstreamFailure(String),

    #[error("An analysis is already running. Please wait for it to finish.")]
    RequestInFlight,

    #[error("Cannot {action} while {state}")]
    InvalidTransition { action: &'static str, state: &'static str },

    #[error("Barcode scanner unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error(transparent)]
    Common(#[from] ecopulse_common::Error),
}

/// 画面に出すエラー分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    CredentialMissing,
    MalformedModelReply,
    UpstreamFailure,
    Other,
}

impl EcoPulseError {
    /// 上流エラーを生成（空メッセージは汎用文言に置換）
    pub fn upstream(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            EcoPulseError::UpstreamFailure(UPSTREAM_FALLBACK_MESSAGE.to_string())
        } else {
            EcoPulseError::UpstreamFailure(message)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EcoPulseError::InvalidInput(_) => ErrorKind::InvalidInput,
            EcoPulseError::CredentialMissing => ErrorKind::CredentialMissing,
            EcoPulseError::MalformedModelReply(_) | EcoPulseError::Common(_) => {
                ErrorKind::MalformedModelReply
            }
            EcoPulseError::UpstreamFailure(_) | EcoPulseError::DeviceUnavailable(_) => {
                ErrorKind::UpstreamFailure
            }
            _ => ErrorKind::Other,
        }
    }

    /// ユーザーが同じ操作を繰り返せば回復しうるか
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::MalformedModelReply | ErrorKind::UpstreamFailure
        )
    }
}

/// 生の失敗メッセージを分類
///
/// - `API_KEY` / `API key` を含む → CredentialMissing
/// - `JSON` を含む → MalformedModelReply
/// - それ以外 → UpstreamFailure（空なら汎用文言）
pub fn classify_failure(message: &str) -> EcoPulseError {
    let lower = message.to_lowercase();
    if lower.contains("api_key") || lower.contains("api key") {
        EcoPulseError::CredentialMissing
    } else if message.contains("JSON") {
        EcoPulseError::MalformedModelReply(message.to_string())
    } else {
        EcoPulseError::upstream(message)
    }
}

pub type Result<T> = std::result::Result<T, EcoPulseError>;
