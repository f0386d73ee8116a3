use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Traffic generation already running")]
    AlreadyRunning,

    #[error("Cannot modify configuration while running")]
    ConfigLocked,

    #[error("Invalid configuration: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Observer error: {0}")]
    Delivery(#[from] crate::broadcast::DeliveryError),
}

impl EngineError {
    /// Rejected because of the Idle/Running state rather than the input
    pub fn is_state_conflict(&self) -> bool {
        matches!(self, EngineError::AlreadyRunning | EngineError::ConfigLocked)
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
