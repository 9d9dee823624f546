//! Maps `AppError` onto HTTP responses with the portal's error envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::AppError;
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::ValidationError(_) | AppError::InvalidState(_) => StatusCode::BAD_REQUEST,
        AppError::DuplicateClaim(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
        AppError::NotFound(..) => StatusCode::NOT_FOUND,
        AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = match &self.0 {
            AppError::ValidationError(msg)
            | AppError::DuplicateClaim(msg)
            | AppError::InvalidState(msg) => msg.clone(),
            AppError::Internal(msg) => {
                error!(error = %msg, "request failed");
                "Server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_errors_map_to_client_statuses() {
        assert_eq!(status_for(&AppError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&AppError::invalid_state("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&AppError::DuplicateClaim("x".into())), StatusCode::CONFLICT);
        assert_eq!(status_for(&AppError::Conflict("x".into())), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&AppError::NotFound("Item".into(), "1".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&AppError::Internal("db".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
