use serde_json::Value;

use crate::{ArmUiError, ArmUiResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The outcome of one call to an upstream service.
#[derive(Debug, Clone, PartialEq)]
pub enum Upstream<T> {
    /// The service answered with usable data.
    Ok(T),

    /// The service could not be asked: connection failure, timeout, non-2xx or garbage body.
    Unavailable,

    /// The service answered but explicitly reported a failure.
    Failed(String),
}

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Message used when a failure payload carries no message of its own.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Action failed";

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<T> Upstream<T> {
    /// Returns the value if the call succeeded.
    pub fn ok(self) -> Option<T> {
        match self {
            Upstream::Ok(value) => Some(value),
            _ => None,
        }
    }

    /// Returns `true` if the service answered, successfully or not.
    pub fn is_reachable(&self) -> bool {
        !matches!(self, Upstream::Unavailable)
    }

    /// Maps the successful value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Upstream<U> {
        match self {
            Upstream::Ok(value) => Upstream::Ok(f(value)),
            Upstream::Unavailable => Upstream::Unavailable,
            Upstream::Failed(message) => Upstream::Failed(message),
        }
    }

    /// Converts the outcome into a result, naming `service` when it could not be reached.
    pub fn into_result(self, service: &str) -> ArmUiResult<T> {
        match self {
            Upstream::Ok(value) => Ok(value),
            Upstream::Unavailable => Err(ArmUiError::UpstreamUnavailable(format!(
                "{service} is unreachable"
            ))),
            Upstream::Failed(message) => Err(ArmUiError::UpstreamFailed(message)),
        }
    }

    /// Borrows the successful value.
    pub fn as_ref(&self) -> Upstream<&T> {
        match self {
            Upstream::Ok(value) => Upstream::Ok(value),
            Upstream::Unavailable => Upstream::Unavailable,
            Upstream::Failed(message) => Upstream::Failed(message.clone()),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Folds a raw HTTP result into an [`Upstream`] JSON outcome.
///
/// A body of the form `{"success": false, ...}` becomes [`Upstream::Failed`] whatever the
/// status code. Otherwise non-2xx statuses, transport errors and undecodable bodies are
/// [`Upstream::Unavailable`].
pub(crate) async fn fold_response(
    result: Result<reqwest::Response, reqwest::Error>,
) -> Upstream<Value> {
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("upstream request failed: {e}");
            return Upstream::Unavailable;
        }
    };

    let status = response.status();
    let url = response.url().clone();
    let body = match response.json::<Value>().await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!("upstream {url} returned {status} with undecodable body: {e}");
            return Upstream::Unavailable;
        }
    };

    if let Some(message) = failure_message(&body) {
        tracing::debug!("upstream {url} reported failure: {message}");
        return Upstream::Failed(message);
    }

    if !status.is_success() {
        tracing::debug!("upstream {url} returned {status}");
        return Upstream::Unavailable;
    }

    Upstream::Ok(body)
}

/// Returns the failure message if `body` is an explicit `success: false` payload.
pub fn failure_message(body: &Value) -> Option<String> {
    let object = body.as_object()?;
    if object.get("success")? != &Value::Bool(false) {
        return None;
    }

    let message = ["error", "Error"]
        .iter()
        .filter_map(|key| object.get(*key))
        .find_map(|v| v.as_str().filter(|s| !s.is_empty()).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());

    Some(message)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
