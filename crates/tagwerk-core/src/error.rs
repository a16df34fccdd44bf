use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid condition operator: {0}")]
    InvalidOperator(String),
    #[error("Unknown state component: {0}")]
    UnknownComponent(String),
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("Invalid regime table: {0}")]
    InvalidRegimeTable(String),
    #[error("Source failed: {0}")]
    Source(String),
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
