#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Git command failed: {0}")]
    GitCommandError(String),

    #[error("Failed to create temporary directory: {0}")]
    TempDirError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Could not parse git log output: {0}")]
    LogParseError(String),

    #[error("Failed to serialize report: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
