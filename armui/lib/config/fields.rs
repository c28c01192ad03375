use serde_json::{Map, Value};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A flat configuration record, keys kept in insertion order.
pub type ConfigMap = Map<String, Value>;

/// A declared configuration key of the ripping service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigField {
    /// The key as it appears in the database and in `arm.yaml`.
    pub name: &'static str,

    /// Whether the value must be masked before leaving the process.
    pub sensitive: bool,
}

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Identity and foreign-key columns that never appear in config output.
pub const EXCLUDED_CONFIG_KEYS: &[&str] = &["CONFIG_ID", "job_id"];

/// Columns of the per-job config snapshot table, in table order.
pub const CONFIG_FIELDS: &[ConfigField] = &[
    field("ARM_CHECK_UDF"),
    field("GET_VIDEO_TITLE"),
    field("SKIP_TRANSCODE"),
    field("VIDEOTYPE"),
    field("MINLENGTH"),
    field("MAXLENGTH"),
    field("MANUAL_WAIT"),
    field("MANUAL_WAIT_TIME"),
    field("RAW_PATH"),
    field("TRANSCODE_PATH"),
    field("COMPLETED_PATH"),
    field("EXTRAS_SUB"),
    field("INSTALLPATH"),
    field("LOGPATH"),
    field("LOGLEVEL"),
    field("LOGLIFE"),
    field("DBFILE"),
    field("WEBSERVER_IP"),
    field("WEBSERVER_PORT"),
    field("SET_MEDIA_PERMISSIONS"),
    field("CHMOD_VALUE"),
    field("SET_MEDIA_OWNER"),
    field("CHOWN_USER"),
    field("CHOWN_GROUP"),
    field("RIPMETHOD"),
    field("MKV_ARGS"),
    field("DELRAWFILES"),
    field("HASHEDKEYS"),
    field("HB_PRESET_DVD"),
    field("HB_PRESET_BD"),
    field("DEST_EXT"),
    field("HANDBRAKE_CLI"),
    field("MAINFEATURE"),
    field("HB_ARGS_DVD"),
    field("HB_ARGS_BD"),
    field("EMBY_REFRESH"),
    field("EMBY_SERVER"),
    field("EMBY_PORT"),
    field("NOTIFY_RIP"),
    field("NOTIFY_TRANSCODE"),
    field("MAX_CONCURRENT_TRANSCODES"),
    secret("EMBY_API_KEY"),
    secret("IFTTT_KEY"),
    secret("PB_KEY"),
    secret("OMDB_API_KEY"),
    secret("TMDB_API_KEY"),
    secret("PO_USER_KEY"),
    secret("PO_APP_KEY"),
    secret("APPRISE"),
];

/// Credentials that only occur in the live configuration, never in snapshot rows.
pub const LIVE_ONLY_SECRET_KEYS: &[&str] = &["ARM_API_KEY", "EMBY_PASSWORD", "EMBY_USERID"];

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

const fn field(name: &'static str) -> ConfigField {
    ConfigField {
        name,
        sensitive: false,
    }
}

const fn secret(name: &'static str) -> ConfigField {
    ConfigField {
        name,
        sensitive: true,
    }
}

/// Returns every key whose value must be masked, snapshot columns first.
pub fn sensitive_keys() -> Vec<&'static str> {
    CONFIG_FIELDS
        .iter()
        .filter(|f| f.sensitive)
        .map(|f| f.name)
        .chain(LIVE_ONLY_SECRET_KEYS.iter().copied())
        .collect()
}

/// Returns `true` if `key` is declared sensitive.
pub fn is_sensitive(key: &str) -> bool {
    CONFIG_FIELDS.iter().any(|f| f.sensitive && f.name == key) || LIVE_ONLY_SECRET_KEYS.contains(&key)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_keys_cover_notification_secrets() {
        let keys = sensitive_keys();
        assert_eq!(keys.len(), 11);
        for key in ["OMDB_API_KEY", "TMDB_API_KEY", "APPRISE", "PB_KEY", "ARM_API_KEY"] {
            assert!(keys.contains(&key), "{key} should be sensitive");
        }
        assert!(!is_sensitive("RIPMETHOD"));
        assert!(is_sensitive("PO_APP_KEY"));
    }

    #[test]
    fn test_declared_fields_are_unique() {
        let mut names: Vec<_> = CONFIG_FIELDS.iter().map(|f| f.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CONFIG_FIELDS.len());
    }
}
