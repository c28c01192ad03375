use std::{
    error::Error,
    fmt::{self, Display},
};
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of an armui-related operation.
pub type ArmUiResult<T> = Result<T, ArmUiError>;

/// An error that occurred while serving the dashboard.
#[derive(pretty_error_debug::Debug, Error)]
pub enum ArmUiError {
    /// An I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An error that can represent any error.
    #[error(transparent)]
    Custom(#[from] AnyError),

    /// An error that occurred during an HTTP request.
    #[error("http request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// An error that occurred while reading the database mirror.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An error that occurred while decoding JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error that occurred while decoding YAML.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// No usable metadata provider is configured, or the provider rejected the key.
    #[error("{0}")]
    MetadataConfig(String),

    /// A metadata provider could not be reached.
    #[error("metadata provider unavailable: {0}")]
    MetadataUnavailable(String),

    /// An upstream service could not be reached.
    #[error("{0}")]
    UpstreamUnavailable(String),

    /// An upstream service answered with an explicit failure.
    #[error("{0}")]
    UpstreamFailed(String),

    /// A request argument was out of range or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(String),
}

/// An error that can represent any error.
#[derive(Debug)]
pub struct AnyError {
    error: anyhow::Error,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ArmUiError {
    /// Creates a new `Err` result.
    pub fn custom(error: impl Into<anyhow::Error>) -> ArmUiError {
        ArmUiError::Custom(AnyError {
            error: error.into(),
        })
    }
}

impl AnyError {
    /// Downcasts the error to a `T`.
    pub fn downcast<T>(&self) -> Option<&T>
    where
        T: Display + fmt::Debug + Send + Sync + 'static,
    {
        self.error.downcast_ref::<T>()
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl PartialEq for AnyError {
    fn eq(&self, other: &Self) -> bool {
        self.error.to_string() == other.error.to_string()
    }
}

impl Display for AnyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl Error for AnyError {}
