use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("A generation is already in progress for this session")]
    Busy,

    #[error("{message}")]
    Transport { status: Option<u16>, message: String },

    #[error("{0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JS interop error: {0}")]
    JsInterop(String),

    #[error("{0}")]
    Other(String),
}

impl ChatError {
    /// Network-level failure with no HTTP status attached.
    pub fn network(message: impl Into<String>) -> Self {
        ChatError::Transport { status: None, message: message.into() }
    }

    /// Non-success HTTP status.
    pub fn http(status: u16, status_text: &str) -> Self {
        ChatError::Transport {
            status: Some(status),
            message: format!("HTTP error! status: {} {}", status, status_text)
                .trim_end()
                .to_string(),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ChatError::Auth(_))
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(e: serde_json::Error) -> Self {
        ChatError::Serialization(e.to_string())
    }
}
