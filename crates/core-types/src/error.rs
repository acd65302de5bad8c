use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Unknown range option '{0}' (expected one of 1M, 6M, 1Y, 3Y, 5Y)")]
    UnknownRange(String),
}
