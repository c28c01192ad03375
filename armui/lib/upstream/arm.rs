use getset::Getters;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    config::{ARM_REQUEST_TIMEOUT, UPSTREAM_CONNECT_TIMEOUT},
    ArmUiResult,
};

use super::{fold_response, Upstream};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Client for the ripping service's JSON API (`/api/v1`).
///
/// Every call returns an [`Upstream`] outcome. Transport errors and non-2xx responses are
/// [`Upstream::Unavailable`]; a `success: false` body is [`Upstream::Failed`].
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub with_prefix")]
pub struct ArmClient {
    /// The shared HTTP connection pool.
    client: Client,

    /// Base URL without a trailing slash.
    base_url: String,
}

/// A lifecycle action on a single job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobAction {
    /// Abandon a running job.
    Abandon,

    /// Cancel a job waiting for input.
    Cancel,

    /// Start a job that is waiting for manual confirmation.
    Start,

    /// Pause a job before it starts ripping.
    Pause,

    /// Reset ownership and permissions on the job's output.
    FixPermissions,

    /// Submit the job's disc CRC to the community database.
    CrcSubmit,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ArmClient {
    /// Creates a client for the ripping service at `base_url`.
    pub fn new(base_url: impl AsRef<str>) -> ArmUiResult<Self> {
        let client = Client::builder()
            .connect_timeout(UPSTREAM_CONNECT_TIMEOUT)
            .timeout(ARM_REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{path}", self.base_url)
    }

    /// Runs a lifecycle action on a job.
    pub async fn job_action(&self, job_id: i64, action: JobAction) -> Upstream<Value> {
        let url = self.url(&format!("jobs/{job_id}/{}", action.path_segment()));
        fold_response(self.client.post(url).send().await).await
    }

    /// Deletes a finished job.
    pub async fn delete_job(&self, job_id: i64) -> Upstream<Value> {
        let url = self.url(&format!("jobs/{job_id}"));
        fold_response(self.client.delete(url).send().await).await
    }

    /// Updates a job's title, year, type and identifiers.
    pub async fn update_title(&self, job_id: i64, body: &Value) -> Upstream<Value> {
        let url = self.url(&format!("jobs/{job_id}/title"));
        fold_response(self.client.put(url).json(body).send().await).await
    }

    /// Updates the per-job config snapshot.
    pub async fn update_job_config(&self, job_id: i64, body: &Value) -> Upstream<Value> {
        let url = self.url(&format!("jobs/{job_id}/config"));
        fold_response(self.client.patch(url).json(body).send().await).await
    }

    /// Enables or disables ripping of newly inserted discs.
    pub async fn set_ripping_enabled(&self, enabled: bool) -> Upstream<Value> {
        let url = self.url("system/ripping-enabled");
        let body = json!({ "enabled": enabled });
        fold_response(self.client.post(url).json(&body).send().await).await
    }

    /// Updates a drive's user-editable fields.
    pub async fn update_drive(&self, drive_id: i64, body: &Value) -> Upstream<Value> {
        let url = self.url(&format!("drives/{drive_id}"));
        fold_response(self.client.patch(url).json(body).send().await).await
    }

    /// Reads the live `arm.yaml` configuration.
    pub async fn get_config(&self) -> Upstream<Value> {
        self.get("settings/config").await
    }

    /// Replaces the live `arm.yaml` configuration.
    pub async fn update_config(&self, body: &Value) -> Upstream<Value> {
        let url = self.url("settings/config");
        fold_response(self.client.put(url).json(body).send().await).await
    }

    /// Reports whether the ripping host has hardware encoders.
    pub async fn gpu_support(&self) -> Upstream<Value> {
        self.get("system/gpu").await
    }

    /// Static hardware description of the ripping host.
    pub async fn system_info(&self) -> Upstream<Value> {
        self.get("system/info").await
    }

    /// Live CPU, memory and disk usage of the ripping host.
    pub async fn system_stats(&self) -> Upstream<Value> {
        self.get("system/stats").await
    }

    /// Existence and permission checks of the configured media paths.
    pub async fn paths(&self) -> Upstream<Value> {
        self.get("system/paths").await
    }

    /// Version information of the ripping service.
    pub async fn version(&self) -> Upstream<Value> {
        self.get("system/version").await
    }

    async fn get(&self, path: &str) -> Upstream<Value> {
        fold_response(self.client.get(self.url(path)).send().await).await
    }
}

impl JobAction {
    /// The trailing path segment of the action's endpoint.
    pub fn path_segment(&self) -> &'static str {
        match self {
            JobAction::Abandon => "abandon",
            JobAction::Cancel => "cancel",
            JobAction::Start => "start",
            JobAction::Pause => "pause",
            JobAction::FixPermissions => "fix-permissions",
            JobAction::CrcSubmit => "crc-submit",
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() -> ArmUiResult<()> {
        let client = ArmClient::new("http://arm.local:8080/")?;
        assert_eq!(client.get_base_url(), "http://arm.local:8080");
        assert_eq!(
            client.url("jobs/4/abandon"),
            "http://arm.local:8080/api/v1/jobs/4/abandon"
        );
        Ok(())
    }

    #[test]
    fn test_job_action_deserializes_from_path_segment() -> ArmUiResult<()> {
        for action in [
            JobAction::Abandon,
            JobAction::Cancel,
            JobAction::Start,
            JobAction::Pause,
            JobAction::FixPermissions,
            JobAction::CrcSubmit,
        ] {
            let parsed: JobAction =
                serde_json::from_value(Value::String(action.path_segment().into()))?;
            assert_eq!(parsed, action);
        }
        Ok(())
    }
}
