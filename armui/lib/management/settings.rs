use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    config::{ConfigMap, ConfigResolver, MASK_TOKEN},
    metadata::MetadataKeyCache,
    upstream::{ArmClient, TranscoderClient},
    ArmUiResult,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Everything the settings page shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettingsResponse {
    /// The ripping service's configuration, masked.
    pub arm_config: Option<ConfigMap>,

    /// Which source the configuration came from: `api`, `database` or `file`.
    pub arm_config_source: Option<&'static str>,

    /// Hardware encoders the ripping host supports.
    pub arm_gpu_support: Option<Value>,

    /// The transcoder's runtime configuration.
    pub transcoder_config: Option<Value>,

    /// Whether the transcoder requires an API key and a webhook secret.
    pub transcoder_auth_status: Option<TranscoderAuthStatus>,

    /// Hardware encoders the transcoding host supports.
    pub transcoder_gpu_support: Option<Value>,

    /// HandBrake preset names available to the ripping service.
    pub hb_presets: Option<Vec<String>>,
}

/// Authentication requirements reported by the transcoder's health endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranscoderAuthStatus {
    /// API calls need `X-API-Key`.
    pub require_api_auth: bool,

    /// Webhook deliveries need `X-Webhook-Secret`.
    pub webhook_secret_configured: bool,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Gathers the settings page.
///
/// Every field is fetched concurrently and degrades to `None` on its own.
pub async fn settings_overview(
    resolver: &ConfigResolver,
    arm: &ArmClient,
    transcoder: &TranscoderClient,
    hb_presets_path: &Path,
) -> SettingsResponse {
    let (resolved, arm_gpu, transcoder_config, health, hb_presets) = tokio::join!(
        resolver.resolve(),
        arm.gpu_support(),
        transcoder.config(),
        transcoder.health(),
        read_hb_presets(hb_presets_path),
    );

    let health = health.ok();
    let (arm_config_source, arm_config) = match resolved {
        Some(resolved) => (Some(resolved.source), Some(resolved.config)),
        None => (None, None),
    };

    SettingsResponse {
        arm_config,
        arm_config_source,
        arm_gpu_support: arm_gpu.ok(),
        transcoder_config: transcoder_config.ok(),
        transcoder_auth_status: health.as_ref().map(|health| TranscoderAuthStatus {
            require_api_auth: health["require_api_auth"].as_bool().unwrap_or(false),
            webhook_secret_configured: health["webhook_secret_configured"]
                .as_bool()
                .unwrap_or(false),
        }),
        transcoder_gpu_support: health.and_then(|mut health| {
            health
                .get_mut("gpu_support")
                .map(Value::take)
                .filter(|gpu| !gpu.is_null())
        }),
        hb_presets,
    }
}

/// Saves the ripping service's configuration and forgets the cached metadata keys.
///
/// Values still holding the mask token are dropped so an unchanged secret is not overwritten
/// with `***`.
pub async fn save_arm_config(
    arm: &ArmClient,
    keys: &MetadataKeyCache,
    body: &Value,
) -> ArmUiResult<Value> {
    let body = strip_masked(body);
    let result = arm.update_config(&body).await.into_result("ARM")?;

    keys.invalidate().await;
    tracing::info!("saved ripping service configuration");
    Ok(result)
}

/// Patches the transcoder's runtime configuration.
pub async fn save_transcoder_config(transcoder: &TranscoderClient, body: &Value) -> ArmUiResult<Value> {
    let result = transcoder.patch_config(body).await.into_result("Transcoder")?;
    tracing::info!("patched transcoder configuration");
    Ok(result)
}

/// Reads the HandBrake preset list. A missing or malformed file yields `None`.
pub async fn read_hb_presets(path: &Path) -> Option<Vec<String>> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!("no handbrake presets at {}: {e}", path.display());
            return None;
        }
    };

    serde_json::from_str(&text)
        .map_err(|e| tracing::warn!("ignoring malformed presets file {}: {e}", path.display()))
        .ok()
}

/// Removes masked values from a config update, at the top level or under `config`.
pub fn strip_masked(body: &Value) -> Value {
    fn strip(map: &Map<String, Value>) -> Map<String, Value> {
        map.iter()
            .filter(|(_, v)| v.as_str() != Some(MASK_TOKEN))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    match body {
        Value::Object(map) => match map.get("config") {
            Some(Value::Object(config)) => {
                let mut outer = map.clone();
                outer.insert("config".to_string(), Value::Object(strip(config)));
                Value::Object(outer)
            }
            _ => Value::Object(strip(map)),
        },
        other => other.clone(),
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
