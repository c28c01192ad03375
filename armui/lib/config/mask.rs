use serde_json::Value;

use super::{sensitive_keys, ConfigMap, EXCLUDED_CONFIG_KEYS, MASK_TOKEN};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns a redacted copy of `config`.
///
/// Keys listed in `excluded` are dropped. Keys listed in `sensitive` whose value is truthy
/// are replaced with [`MASK_TOKEN`]. Empty or `null` sensitive values pass through untouched.
pub fn mask_config_with(config: &ConfigMap, sensitive: &[&str], excluded: &[&str]) -> ConfigMap {
    config
        .iter()
        .filter(|(key, _)| !excluded.contains(&key.as_str()))
        .map(|(key, value)| {
            let value = if sensitive.contains(&key.as_str()) && is_truthy(value) {
                Value::String(MASK_TOKEN.to_string())
            } else {
                value.clone()
            };
            (key.clone(), value)
        })
        .collect()
}

/// Masks `config` with the declared sensitive keys and drops identity columns.
pub fn mask_config(config: &ConfigMap) -> ConfigMap {
    mask_config_with(config, &sensitive_keys(), EXCLUDED_CONFIG_KEYS)
}

/// Truthiness of a config value: `null`, `false`, `0` and empty strings or collections are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn map(value: Value) -> ConfigMap {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_mask_config_masks_only_non_empty_sensitive_values() {
        let config = map(json!({
            "CONFIG_ID": 3,
            "job_id": 7,
            "RIPMETHOD": "mkv",
            "OMDB_API_KEY": "abc123",
            "TMDB_API_KEY": "",
            "PB_KEY": null,
        }));

        let masked = mask_config(&config);

        assert_eq!(
            Value::Object(masked),
            json!({
                "RIPMETHOD": "mkv",
                "OMDB_API_KEY": "***",
                "TMDB_API_KEY": "",
                "PB_KEY": null,
            })
        );
    }

    #[test]
    fn test_mask_config_is_idempotent() {
        let config = map(json!({
            "APPRISE": "json://host",
            "IFTTT_KEY": "",
            "MINLENGTH": "600",
        }));

        let once = mask_config(&config);
        let twice = mask_config(&once);
        assert_eq!(once, twice);
        assert_eq!(once["APPRISE"], json!("***"));
    }

    #[test]
    fn test_mask_config_with_custom_sets() {
        let config = map(json!({"id": 1, "token": "t", "name": "x", "empty": 0}));

        let masked = mask_config_with(&config, &["token", "empty"], &["id"]);

        assert_eq!(
            Value::Object(masked),
            json!({"token": "***", "name": "x", "empty": 0})
        );
    }

    #[test]
    fn test_mask_config_preserves_key_order() {
        let config = map(json!({"Z": 1, "A": 2, "PB_KEY": "k", "M": 3}));
        let keys: Vec<_> = mask_config(&config).keys().cloned().collect();
        assert_eq!(keys, ["Z", "A", "PB_KEY", "M"]);
    }
}
