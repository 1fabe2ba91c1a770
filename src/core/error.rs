use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AkiError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),
}

impl From<toml::de::Error> for AkiError {
    fn from(e: toml::de::Error) -> Self {
        AkiError::ConfigError(e.to_string())
    }
}

impl From<toml::ser::Error> for AkiError {
    fn from(e: toml::ser::Error) -> Self {
        AkiError::ConfigError(e.to_string())
    }
}
