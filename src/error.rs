//! Error types for the dashboard

use crate::charts::RenderError;
use crate::data::ProcessorError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Result type for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Processor(#[from] ProcessorError),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// The dataset failed to load at startup; carries the loader message.
    #[error("Dados indisponíveis: {0}")]
    DataUnavailable(String),

    #[error("Unknown chart: {0}")]
    UnknownChart(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl DashboardError {
    pub fn status(&self) -> StatusCode {
        match self {
            DashboardError::DataUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            DashboardError::UnknownChart(_) => StatusCode::NOT_FOUND,
            DashboardError::Processor(ProcessorError::InvalidYearRange { .. }) => {
                StatusCode::BAD_REQUEST
            }
            DashboardError::Render(RenderError::Unsupported(_) | RenderError::Empty(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            DashboardError::Processor(_)
            | DashboardError::Render(_)
            | DashboardError::Config(_)
            | DashboardError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
