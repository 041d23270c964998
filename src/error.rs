use thiserror::Error;

/// Streamgate application error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid channel record: {message}")]
    InvalidChannel { message: String },
}

impl Error {
    pub fn invalid_channel(message: impl Into<String>) -> Self {
        Self::InvalidChannel {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
