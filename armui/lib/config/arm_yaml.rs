use std::path::Path;

use serde_json::Value;

use crate::{ArmUiError, ArmUiResult};

use super::{is_truthy, ConfigMap};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Reads and parses the ripping service's `arm.yaml`.
///
/// An empty file parses to an empty map; a document that is not a mapping is an error.
pub async fn read_arm_yaml(path: &Path) -> ArmUiResult<ConfigMap> {
    let text = tokio::fs::read_to_string(path).await?;
    match serde_yaml::from_str::<Value>(&text)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(ConfigMap::new()),
        other => Err(ArmUiError::custom(anyhow::anyhow!(
            "expected a mapping in {}, found {}",
            path.display(),
            kind(&other)
        ))),
    }
}

/// Like [`read_arm_yaml`] but a missing or malformed file yields an empty map.
pub async fn load_arm_yaml(path: &Path) -> ConfigMap {
    match read_arm_yaml(path).await {
        Ok(map) => map,
        Err(ArmUiError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("config file not found: {}", path.display());
            ConfigMap::new()
        }
        Err(e) => {
            tracing::warn!("ignoring unreadable config file {}: {e}", path.display());
            ConfigMap::new()
        }
    }
}

/// Returns the value under `key` as a string if it is truthy.
pub fn config_string(config: &ConfigMap, key: &str) -> Option<String> {
    let value = config.get(key).filter(|v| is_truthy(v))?;
    Some(match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
