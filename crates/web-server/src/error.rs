use analytics::AnalyticsError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Shown whenever the subject or benchmark has no rows in the selected window.
pub const NO_DATA_MESSAGE: &str = "No data available for this period.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Price loader error: {0}")]
    Loader(#[from] database::DbError),
    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether the request stopped because the window had no data.
    pub fn is_no_data(&self) -> bool {
        matches!(self, AppError::Analytics(AnalyticsError::InsufficientData(_)))
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Loader(db_err) => {
                tracing::error!(error = ?db_err, "Price loader error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal data access error occurred".to_string(),
                )
            }
            AppError::Analytics(AnalyticsError::InsufficientData(which)) => {
                tracing::warn!(%which, "No data for the requested window.");
                (StatusCode::NOT_FOUND, NO_DATA_MESSAGE.to_string())
            }
            AppError::Analytics(analytics_err) => {
                tracing::error!(error = ?analytics_err, "Analytics error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while computing metrics".to_string(),
                )
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_maps_to_not_found() {
        let err = AppError::from(AnalyticsError::InsufficientData("subject (AAPL)".to_string()));
        assert!(err.is_no_data());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn calculation_failures_are_server_errors() {
        let err = AppError::from(AnalyticsError::Calculation("overflow".to_string()));
        assert!(!err.is_no_data());
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_requests_keep_their_message() {
        let err = AppError::BadRequest("Unknown range option '2W'".to_string());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
