use std::path::PathBuf;

use tokio::sync::RwLock;

use crate::config::{config_string, load_arm_yaml};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Provider used when `arm.yaml` does not name one.
pub const DEFAULT_METADATA_PROVIDER: &str = "omdb";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Metadata provider selection and keys, as read from `arm.yaml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataKeys {
    /// Lower-cased `METADATA_PROVIDER`.
    pub provider: String,

    /// `OMDB_API_KEY`.
    pub omdb_api_key: Option<String>,

    /// `TMDB_API_KEY`.
    pub tmdb_api_key: Option<String>,
}

/// Caches [`MetadataKeys`] until the ripping configuration is saved.
#[derive(Debug)]
pub struct MetadataKeyCache {
    path: PathBuf,
    keys: RwLock<Option<MetadataKeys>>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl MetadataKeys {
    /// Reads the keys from the `arm.yaml` at `path`. A missing file yields no keys.
    pub async fn load(path: &std::path::Path) -> Self {
        let config = load_arm_yaml(path).await;
        Self {
            provider: config_string(&config, "METADATA_PROVIDER")
                .map(|p| p.trim().to_lowercase())
                .unwrap_or_else(|| DEFAULT_METADATA_PROVIDER.to_string()),
            omdb_api_key: config_string(&config, "OMDB_API_KEY"),
            tmdb_api_key: config_string(&config, "TMDB_API_KEY"),
        }
    }
}

impl MetadataKeyCache {
    /// Creates an empty cache over the `arm.yaml` at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keys: RwLock::new(None),
        }
    }

    /// Returns the cached keys, loading them on first use.
    pub async fn get(&self) -> MetadataKeys {
        if let Some(keys) = self.keys.read().await.as_ref() {
            return keys.clone();
        }

        let mut slot = self.keys.write().await;
        if let Some(keys) = slot.as_ref() {
            return keys.clone();
        }

        let keys = MetadataKeys::load(&self.path).await;
        tracing::debug!("loaded metadata keys for provider {}", keys.provider);
        *slot = Some(keys.clone());
        keys
    }

    /// Drops the cached keys so the next lookup rereads `arm.yaml`.
    pub async fn invalidate(&self) {
        self.keys.write().await.take();
    }

    /// Rereads `arm.yaml` now and caches the result.
    pub async fn refresh(&self) -> MetadataKeys {
        let keys = MetadataKeys::load(&self.path).await;
        *self.keys.write().await = Some(keys.clone());
        keys
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
