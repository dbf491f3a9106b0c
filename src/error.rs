use teloxide::RequestError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExpenseBotError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] RequestError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Malformed export file: {message}")]
    MalformedExport { message: String },

    #[error("Conversation not available from source: {id}")]
    UnknownConversation { id: i64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExpenseBotError>;

impl ExpenseBotError {
    pub fn malformed_export(message: impl Into<String>) -> Self {
        Self::MalformedExport {
            message: message.into(),
        }
    }

    /// 检查错误是否为可重试的类型
    pub fn is_retryable(&self) -> bool {
        match self {
            ExpenseBotError::Telegram(e) => matches!(
                e,
                RequestError::Network(_) | RequestError::RetryAfter(_) | RequestError::Io(_)
            ),
            ExpenseBotError::Io(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let io = ExpenseBotError::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "timed out",
        ));
        assert!(io.is_retryable());

        assert!(!ExpenseBotError::malformed_export("missing messages").is_retryable());
        assert!(!ExpenseBotError::Config(anyhow::anyhow!("bad")).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = ExpenseBotError::malformed_export("no chats");
        assert_eq!(err.to_string(), "Malformed export file: no chats");
    }
}
