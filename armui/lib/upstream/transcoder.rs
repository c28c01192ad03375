use getset::Getters;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client, StatusCode, Url,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    config::{TRANSCODER_REQUEST_TIMEOUT, UPSTREAM_CONNECT_TIMEOUT},
    logs::{LogReadQuery, StructuredLogQuery},
    ArmUiError, ArmUiResult,
};

use super::{fold_response, Upstream};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Header carrying the transcoder API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Header carrying the webhook shared secret.
pub const WEBHOOK_SECRET_HEADER: &str = "X-Webhook-Secret";

/// Reported when a transcoder log name could leave the logs endpoint.
const INVALID_LOG_FILENAME: &str = "Invalid log filename";

/// Default page size for transcoder job listings.
pub const DEFAULT_TRANSCODER_JOB_LIMIT: u32 = 50;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Client for the transcoding service.
///
/// Holds two connection pools: the API pool sends the optional API key, the webhook pool
/// never does and sends the webhook secret instead.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub with_prefix")]
pub struct TranscoderClient {
    /// Pool for API calls, with the API key as a default header.
    client: Client,

    /// Pool for webhook deliveries.
    webhook_client: Client,

    /// Base URL without a trailing slash.
    base_url: String,

    /// Secret attached to webhook deliveries.
    webhook_secret: Option<String>,
}

/// Filters for listing transcoder jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscoderJobQuery {
    /// Only jobs in this state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Page size.
    #[serde(default = "default_job_limit")]
    pub limit: u32,

    /// Number of jobs to skip.
    #[serde(default)]
    pub offset: u32,
}

/// Result of probing the transcoder from the settings page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConnectionTest {
    /// The health endpoint answered.
    pub reachable: bool,

    /// An authenticated endpoint accepted our key.
    pub auth_ok: bool,

    /// The transcoder requires an API key.
    pub auth_required: bool,

    /// Hardware encoder support reported by the transcoder.
    pub gpu_support: Option<Value>,

    /// Whether the transcoder's worker loop is running.
    pub worker_running: Option<bool>,

    /// Jobs waiting in the transcoder's queue.
    pub queue_size: Option<i64>,

    /// What went wrong, if anything.
    pub error: Option<String>,
}

/// Result of a webhook delivery.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WebhookDelivery {
    /// The transcoder accepted the webhook.
    pub success: bool,

    /// Why the delivery failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a test webhook delivery with a candidate secret.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WebhookTest {
    /// The webhook endpoint answered.
    pub reachable: bool,

    /// The secret was accepted.
    pub secret_ok: bool,

    /// The transcoder insists on a secret.
    pub secret_required: bool,

    /// What went wrong, if anything.
    pub error: Option<String>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl TranscoderClient {
    /// Creates a client for the transcoder at `base_url`.
    pub fn new(
        base_url: impl AsRef<str>,
        api_key: Option<&str>,
        webhook_secret: Option<&str>,
    ) -> ArmUiResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let mut value = HeaderValue::from_str(key)
                .map_err(|e| ArmUiError::InvalidArgument(format!("transcoder api key: {e}")))?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
        }

        let client = Client::builder()
            .connect_timeout(UPSTREAM_CONNECT_TIMEOUT)
            .timeout(TRANSCODER_REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        let webhook_client = Client::builder()
            .connect_timeout(UPSTREAM_CONNECT_TIMEOUT)
            .timeout(TRANSCODER_REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            webhook_client,
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            webhook_secret: webhook_secret.map(str::to_string),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Builds `logs/<filename>[/<suffix>]` with the filename as one encoded segment.
    fn log_url(&self, filename: &str, suffix: Option<&str>) -> Option<Url> {
        if filename.is_empty() || filename == "." || filename == ".." {
            return None;
        }
        if filename.contains(['/', '\\']) {
            return None;
        }

        let mut url = Url::parse(&self.url("logs")).ok()?;
        url.path_segments_mut().ok()?.push(filename).extend(suffix);
        Some(url)
    }

    async fn get(&self, path: &str) -> Upstream<Value> {
        fold_response(self.client.get(self.url(path)).send().await).await
    }

    /// Liveness, queue size, worker state and auth requirements.
    pub async fn health(&self) -> Upstream<Value> {
        self.get("health").await
    }

    /// Aggregate job counters.
    pub async fn stats(&self) -> Upstream<Value> {
        self.get("stats").await
    }

    /// Static hardware description of the transcoding host.
    pub async fn system_info(&self) -> Upstream<Value> {
        self.get("system/info").await
    }

    /// Live CPU, memory and GPU usage of the transcoding host.
    pub async fn system_stats(&self) -> Upstream<Value> {
        self.get("system/stats").await
    }

    /// Lists jobs, newest first.
    pub async fn jobs(&self, query: &TranscoderJobQuery) -> Upstream<Value> {
        let request = self.client.get(self.url("jobs")).query(query);
        fold_response(request.send().await).await
    }

    /// Fetches one job.
    pub async fn job(&self, job_id: i64) -> Upstream<Value> {
        self.get(&format!("jobs/{job_id}")).await
    }

    /// Requeues a failed job.
    pub async fn retry_job(&self, job_id: i64) -> Upstream<Value> {
        let url = self.url(&format!("jobs/{job_id}/retry"));
        fold_response(self.client.post(url).send().await).await
    }

    /// Deletes a job record.
    pub async fn delete_job(&self, job_id: i64) -> Upstream<Value> {
        let url = self.url(&format!("jobs/{job_id}"));
        fold_response(self.client.delete(url).send().await).await
    }

    /// Lists the transcoder's log files.
    pub async fn logs(&self) -> Upstream<Value> {
        self.get("logs").await
    }

    /// Reads a transcoder log file as plain text.
    pub async fn read_log(&self, filename: &str, query: &LogReadQuery) -> Upstream<Value> {
        let Some(url) = self.log_url(filename, None) else {
            return Upstream::Failed(INVALID_LOG_FILENAME.to_string());
        };
        let request = self.client.get(url).query(query);
        fold_response(request.send().await).await
    }

    /// Reads a transcoder log file as parsed entries.
    pub async fn read_structured_log(
        &self,
        filename: &str,
        query: &StructuredLogQuery,
    ) -> Upstream<Value> {
        let Some(url) = self.log_url(filename, Some("structured")) else {
            return Upstream::Failed(INVALID_LOG_FILENAME.to_string());
        };
        let request = self.client.get(url).query(query);
        fold_response(request.send().await).await
    }

    /// Reads the transcoder's runtime configuration.
    pub async fn config(&self) -> Upstream<Value> {
        self.get("config").await
    }

    /// Patches the transcoder's runtime configuration.
    pub async fn patch_config(&self, body: &Value) -> Upstream<Value> {
        let request = self.client.patch(self.url("config")).json(body);
        fold_response(request.send().await).await
    }

    /// Probes health, then an authenticated endpoint.
    pub async fn test_connection(&self) -> ConnectionTest {
        let health = match self.health().await {
            Upstream::Ok(health) => health,
            Upstream::Failed(message) => {
                return ConnectionTest {
                    reachable: true,
                    error: Some(message),
                    ..Default::default()
                }
            }
            Upstream::Unavailable => {
                return ConnectionTest {
                    error: Some(format!("Could not reach transcoder at {}", self.base_url)),
                    ..Default::default()
                }
            }
        };

        let mut result = ConnectionTest {
            reachable: true,
            auth_required: health["require_api_auth"].as_bool().unwrap_or(false),
            gpu_support: health.get("gpu_support").cloned(),
            worker_running: health["worker_running"].as_bool(),
            queue_size: health["queue_size"].as_i64(),
            ..Default::default()
        };

        match self.client.get(self.url("config")).send().await {
            Ok(response) if is_auth_rejection(response.status()) => {
                result.error = Some("API key rejected by transcoder".to_string());
            }
            Ok(response) if response.status().is_success() => result.auth_ok = true,
            Ok(response) => {
                result.error = Some(format!("Unexpected status {}", response.status()));
            }
            Err(e) => result.error = Some(e.to_string()),
        }

        result
    }

    /// Queues work on the transcoder through its webhook.
    pub async fn send_webhook(&self, payload: &Value) -> WebhookDelivery {
        match self.post_webhook(payload, self.webhook_secret.as_deref()).await {
            Ok(status) if status.is_success() => WebhookDelivery {
                success: true,
                error: None,
            },
            Ok(status) if is_auth_rejection(status) => WebhookDelivery {
                success: false,
                error: Some("Webhook secret rejected by transcoder".to_string()),
            },
            Ok(status) => WebhookDelivery {
                success: false,
                error: Some(format!("Transcoder returned {status}")),
            },
            Err(e) => {
                tracing::warn!("webhook delivery failed: {e}");
                WebhookDelivery {
                    success: false,
                    error: Some("Transcoder unreachable".to_string()),
                }
            }
        }
    }

    /// Sends a harmless webhook signed with `secret`.
    pub async fn test_webhook(&self, secret: Option<&str>) -> WebhookTest {
        let payload = json!({
            "title": "ARM UI webhook test",
            "body": "Connection test from ARM UI",
            "type": "test",
        });

        match self.post_webhook(&payload, secret).await {
            Ok(status) if is_auth_rejection(status) => WebhookTest {
                reachable: true,
                secret_ok: false,
                secret_required: true,
                error: Some("Webhook secret rejected".to_string()),
            },
            Ok(status) if status.is_success() => WebhookTest {
                reachable: true,
                secret_ok: true,
                secret_required: secret.is_some_and(|s| !s.is_empty()),
                error: None,
            },
            Ok(status) => WebhookTest {
                reachable: true,
                error: Some(format!("Unexpected status {status}")),
                ..Default::default()
            },
            Err(e) => WebhookTest {
                error: Some(e.to_string()),
                ..Default::default()
            },
        }
    }

    async fn post_webhook(
        &self,
        payload: &Value,
        secret: Option<&str>,
    ) -> Result<StatusCode, reqwest::Error> {
        let mut request = self.webhook_client.post(self.url("webhook/arm")).json(payload);
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            request = request.header(WEBHOOK_SECRET_HEADER, secret);
        }
        Ok(request.send().await?.status())
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn default_job_limit() -> u32 {
    DEFAULT_TRANSCODER_JOB_LIMIT
}

fn is_auth_rejection(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for TranscoderJobQuery {
    fn default() -> Self {
        Self {
            status: None,
            limit: DEFAULT_TRANSCODER_JOB_LIMIT,
            offset: 0,
        }
    }
}
