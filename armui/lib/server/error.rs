use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::ArmUiError;

use super::{ErrorResponse, ErrorType};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Result type of request handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// An [`ArmUiError`] on its way to becoming an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub ArmUiError);

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ApiError {
    /// A 404 with `detail`.
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self(ArmUiError::NotFound(detail.into()))
    }

    /// The status code and error type this error maps to.
    pub fn classify(&self) -> (StatusCode, ErrorType) {
        match &self.0 {
            ArmUiError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, ErrorType::ValidationError),
            ArmUiError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorType::NotFound),
            ArmUiError::MetadataConfig(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, ErrorType::ConfigurationError)
            }
            ArmUiError::UpstreamUnavailable(_) | ArmUiError::Database(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, ErrorType::UpstreamUnavailable)
            }
            ArmUiError::MetadataUnavailable(_) => {
                (StatusCode::BAD_GATEWAY, ErrorType::UpstreamUnavailable)
            }
            ArmUiError::UpstreamFailed(_) => (StatusCode::BAD_GATEWAY, ErrorType::UpstreamFailed),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, ErrorType::InternalError),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl From<ArmUiError> for ApiError {
    fn from(error: ArmUiError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.classify();
        let detail = match (&self.0, error_type) {
            (ArmUiError::Database(e), _) => {
                tracing::warn!("database mirror unavailable: {e}");
                "ARM database is unavailable".to_string()
            }
            (e, ErrorType::InternalError) => {
                tracing::error!("request failed: {e}");
                "Internal server error".to_string()
            }
            (e, _) => e.to_string(),
        };

        (
            status,
            Json(ErrorResponse::new(status.as_u16(), detail, error_type)),
        )
            .into_response()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
