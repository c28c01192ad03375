use serde::{Deserialize, Serialize};
use serde_json::Value;

//--------------------------------------------------------------------------------------------------
// Types: Requests
//--------------------------------------------------------------------------------------------------

/// Request body for toggling ripping.
#[derive(Debug, Deserialize)]
pub struct RippingEnabledRequest {
    /// Whether new discs should be ripped.
    pub enabled: bool,
}

/// Request body for a webhook test.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookTestRequest {
    /// Candidate secret. Empty or absent sends no secret.
    #[serde(default)]
    pub webhook_secret: Option<String>,
}

/// Query parameters of the movie/TV search.
#[derive(Debug, Deserialize)]
pub struct MetadataSearchQuery {
    /// Title to search for.
    #[serde(default)]
    pub q: String,

    /// Release year hint.
    #[serde(default)]
    pub year: Option<String>,
}

//--------------------------------------------------------------------------------------------------
// Types: Responses
//--------------------------------------------------------------------------------------------------

/// Response of the health endpoint.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: &'static str,

    /// Backend version.
    pub version: &'static str,
}

/// Transcoder statistics with an explicit availability flag.
#[derive(Debug, Serialize)]
pub struct TranscoderStatsResponse {
    /// Whether the transcoder answered.
    pub online: bool,

    /// Queue statistics.
    pub stats: Option<Value>,
}

/// One page of transcoder jobs.
#[derive(Debug, Serialize)]
pub struct TranscoderJobsResponse {
    /// The jobs.
    pub jobs: Vec<Value>,

    /// Total jobs matching the filter.
    pub total: u64,
}

/// Confirmation of a status change.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Short status word.
    pub status: &'static str,
}

//--------------------------------------------------------------------------------------------------
// Types: Error Response
//--------------------------------------------------------------------------------------------------

/// Standard error response format.
///
/// The web client shows `detail` to the user.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// HTTP status code.
    pub code: u16,

    /// Error message.
    pub detail: String,

    /// Error type for categorizing errors.
    pub error_type: ErrorType,
}

/// Types of errors that can occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Invalid request parameters or body.
    ValidationError,

    /// Resource not found.
    NotFound,

    /// The installation is misconfigured, e.g. no metadata API key.
    ConfigurationError,

    /// A dependency could not be reached.
    UpstreamUnavailable,

    /// A dependency answered with an explicit failure.
    UpstreamFailed,

    /// Internal server errors.
    InternalError,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ErrorResponse {
    /// Creates a new error response.
    pub fn new(code: u16, detail: impl Into<String>, error_type: ErrorType) -> Self {
        Self {
            code,
            detail: detail.into(),
            error_type,
        }
    }
}

impl StatusResponse {
    /// A `"deleted"` confirmation.
    pub fn deleted() -> Self {
        Self { status: "deleted" }
    }
}
