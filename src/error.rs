use thiserror::Error;

pub type Result<T> = std::result::Result<T, TfvcLabelsError>;

#[derive(Debug, Error)]
pub enum TfvcLabelsError {
    /// The label source rejected or failed a request.
    #[error("label source error: {0}")]
    Source(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Generic(String),
}

impl From<String> for TfvcLabelsError {
    fn from(message: String) -> Self {
        TfvcLabelsError::Generic(message)
    }
}

impl From<&str> for TfvcLabelsError {
    fn from(message: &str) -> Self {
        TfvcLabelsError::Generic(message.to_string())
    }
}
