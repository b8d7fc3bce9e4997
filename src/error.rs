use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Configuration error: {0}")]
    Config(String),
    /// One repository/branch/user query failed; the run can continue without it.
    #[error("Fetch failed: {0}")]
    TransientFetch(String),
    /// Authentication, authorization or a missing organization; aborts the run.
    #[error("Fatal GitHub error: {0}")]
    FatalFetch(String),
    #[error("HTTP client error: {0}")]
    Http(String),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    pub fn is_fatal(&self) -> bool {
        !matches!(self, TrackerError::TransientFetch(_))
    }
}
