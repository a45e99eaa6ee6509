use thiserror::Error;

/// Top-level error type for the Echo system.
///
/// Subsystem crates define their own error types for DOM, clipboard and
/// channel failures and convert into or out of `EchoError` where the `?`
/// operator has to cross a crate boundary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EchoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl From<toml::de::Error> for EchoError {
    fn from(err: toml::de::Error) -> Self {
        EchoError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for EchoError {
    fn from(err: toml::ser::Error) -> Self {
        EchoError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for EchoError {
    fn from(err: serde_json::Error) -> Self {
        EchoError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Echo operations.
pub type Result<T> = std::result::Result<T, EchoError>;
