use thiserror::Error;

/// Client-side failure taxonomy. Every operation that touches the network
/// settles into one of these; validation failures never leave the client.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("network error: {0}")]
    Network(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation error: {0}")]
    Validation(String),
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.status() == Some(reqwest::StatusCode::NOT_FOUND) {
            CoreError::NotFound(err.to_string())
        } else {
            CoreError::Network(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
