use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplError {
    #[error("Insufficient points: need at least {required}, got {actual}")]
    InsufficientPoints { required: usize, actual: usize },

    #[error("Invalid point count {count} for {mode} spline")]
    InvalidPointCount { mode: &'static str, count: usize },

    #[error("Index {index} out of range for {len} points")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Non-finite value: {0}")]
    NonFinite(String),

    #[error("Arc-length cache has not been built")]
    CacheNotBuilt,

    #[error("Arc-length cache is stale: built at revision {built}, spline is at revision {current}")]
    StaleCache { built: u64, current: u64 },

    #[error("Junction cycle: {0}")]
    JunctionCycle(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, SplError>;
