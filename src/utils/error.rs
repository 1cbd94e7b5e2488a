use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// 遠端呼叫失敗：網路錯誤、非 2xx 狀態，或回應中帶有錯誤碼
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub status: Option<u16>,
    pub code: Option<String>,
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Game engine error")?;
        if let Some(status) = self.status {
            write!(f, ": {}", status)?;
        }
        if let Some(code) = &self.code {
            write!(f, ": {}", code)?;
        }
        write!(f, " - {}", self.message)
    }
}

impl std::error::Error for TransportError {}

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Persistent storage unavailable: {message}")]
    PersistenceUnavailable { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Remote,
    Protocol,
    Request,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GameError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn persistence(message: impl fmt::Display) -> Self {
        Self::PersistenceUnavailable {
            message: message.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            GameError::Transport(_) => ErrorCategory::Remote,
            GameError::MalformedResponse { .. } | GameError::SerializationError(_) => {
                ErrorCategory::Protocol
            }
            GameError::InvalidRequest { .. } => ErrorCategory::Request,
            GameError::PersistenceUnavailable { .. } | GameError::IoError(_) => {
                ErrorCategory::Storage
            }
            GameError::ConfigError { .. }
            | GameError::ConfigValidationError { .. }
            | GameError::InvalidConfigValueError { .. }
            | GameError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 本地儲存失敗不影響本次操作
            ErrorCategory::Storage => ErrorSeverity::Low,
            ErrorCategory::Remote => ErrorSeverity::Medium,
            ErrorCategory::Protocol | ErrorCategory::Request => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Remote => "Check that the game engine is reachable and try again",
            ErrorCategory::Protocol => {
                "The game engine returned unexpected data; run `reset` and fetch again"
            }
            ErrorCategory::Request => "Pick at least one card from today's pool",
            ErrorCategory::Storage => "Check permissions on the storage directory",
            ErrorCategory::Configuration => "Fix the configuration file or command-line flags",
        }
    }

    /// 回給 UI 的 HTTP 狀態碼
    pub fn status_code(&self) -> StatusCode {
        match self {
            GameError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            GameError::Transport(e) => e.message.clone(),
            GameError::MalformedResponse { message } | GameError::InvalidRequest { message } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
