use crate::domain::model::RecognitionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Voice recognition is not supported on this platform")]
    CapabilityUnavailable,

    #[error("{0}")]
    Recognition(#[from] RecognitionError),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("{message}")]
    Application { message: String },

    #[error("A voice order is already in progress")]
    SessionActive,

    #[error("Invalid input: {message}")]
    Validation { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// 錯誤分類，對應使用者看到的訊息來源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    CapabilityUnavailable,
    Recognition,
    Transport,
    Application,
    Usage,
    Configuration,
}

impl StorefrontError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StorefrontError::CapabilityUnavailable => ErrorCategory::CapabilityUnavailable,
            StorefrontError::Recognition(_) => ErrorCategory::Recognition,
            StorefrontError::Transport(_) | StorefrontError::MalformedResponse { .. } => {
                ErrorCategory::Transport
            }
            StorefrontError::Application { .. } => ErrorCategory::Application,
            StorefrontError::SessionActive | StorefrontError::Validation { .. } => {
                ErrorCategory::Usage
            }
            StorefrontError::IoError(_)
            | StorefrontError::ConfigError { .. }
            | StorefrontError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    /// 給 CLI 使用者看的一行說明
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::CapabilityUnavailable => {
                "Speech recognition is unavailable; use --transcript instead".to_string()
            }
            ErrorCategory::Recognition => format!("Speech was not recognised ({})", self),
            ErrorCategory::Transport => format!("Could not reach the storefront: {}", self),
            ErrorCategory::Application => format!("The storefront rejected the request: {}", self),
            ErrorCategory::Usage => self.to_string(),
            ErrorCategory::Configuration => format!("Check your configuration: {}", self),
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        StorefrontError::MalformedResponse {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_error_displays_server_message() {
        let err = StorefrontError::Application {
            message: "item out of stock".to_string(),
        };
        assert_eq!(err.to_string(), "item out of stock");
        assert_eq!(err.category(), ErrorCategory::Application);
    }

    #[test]
    fn test_recognition_error_uses_platform_description() {
        let err: StorefrontError = RecognitionError::NoSpeech.into();
        assert_eq!(err.to_string(), "no-speech");
        assert_eq!(err.category(), ErrorCategory::Recognition);
        assert!(err.user_friendly_message().contains("no-speech"));
    }

    #[test]
    fn test_malformed_response_is_transport_category() {
        let err = StorefrontError::malformed("missing field `count`");
        assert_eq!(err.category(), ErrorCategory::Transport);
    }
}
