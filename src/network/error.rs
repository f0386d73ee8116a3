use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Could not resolve {0}")]
    ResolveFailed(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Short write: sent {written} of {expected} bytes")]
    ShortWrite { expected: usize, written: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
