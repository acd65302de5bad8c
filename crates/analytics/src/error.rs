use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// One of the input series has no rows. Fatal for the current request.
    #[error("Not enough data to perform calculation: the {0} series is empty")]
    InsufficientData(String),

    #[error("Error in calculation: {0}")]
    Calculation(String),
}
