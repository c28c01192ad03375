use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::{
    mirror::MirrorReader,
    upstream::{ArmClient, Upstream},
};

use super::{load_arm_yaml, mask_config, ConfigMap};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Resolves the current ripping-service configuration from an ordered list of sources.
///
/// Sources are tried strictly in order and the first non-empty result wins. The winner is
/// always masked before it is returned.
pub struct ConfigResolver {
    sources: Vec<Box<dyn ConfigSource>>,
}

/// The resolved configuration and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    /// Name of the source that produced the configuration.
    pub source: &'static str,

    /// The masked configuration.
    pub config: ConfigMap,
}

/// The ripping service's live configuration endpoint.
pub struct LiveApiSource {
    client: ArmClient,
}

/// The newest config snapshot row in the database mirror.
pub struct MirrorSnapshotSource {
    mirror: Arc<dyn MirrorReader>,
}

/// The `arm.yaml` file on local disk.
pub struct YamlFileSource {
    path: PathBuf,
}

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// One place the current configuration can be read from.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Short name reported alongside the resolved configuration.
    fn name(&self) -> &'static str;

    /// Loads the raw configuration. `None` means unavailable or empty.
    async fn load(&self) -> Option<ConfigMap>;
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ConfigResolver {
    /// Creates a resolver that tries `sources` in order.
    pub fn new(sources: Vec<Box<dyn ConfigSource>>) -> Self {
        Self { sources }
    }

    /// Live API, then database snapshot, then `arm.yaml`.
    pub fn standard(
        client: ArmClient,
        mirror: Arc<dyn MirrorReader>,
        yaml_path: impl Into<PathBuf>,
    ) -> Self {
        Self::new(vec![
            Box::new(LiveApiSource::new(client)),
            Box::new(MirrorSnapshotSource::new(mirror)),
            Box::new(YamlFileSource::new(yaml_path)),
        ])
    }

    /// Returns the first non-empty configuration, masked.
    pub async fn resolve(&self) -> Option<ResolvedConfig> {
        for source in &self.sources {
            match source.load().await {
                Some(config) if !config.is_empty() => {
                    tracing::debug!("resolved configuration from {}", source.name());
                    return Some(ResolvedConfig {
                        source: source.name(),
                        config: mask_config(&config),
                    });
                }
                _ => tracing::debug!("configuration source {} is empty", source.name()),
            }
        }

        tracing::warn!("no configuration source produced data");
        None
    }
}

impl LiveApiSource {
    /// Creates a source backed by `client`.
    pub fn new(client: ArmClient) -> Self {
        Self { client }
    }
}

impl MirrorSnapshotSource {
    /// Creates a source backed by `mirror`.
    pub fn new(mirror: Arc<dyn MirrorReader>) -> Self {
        Self { mirror }
    }
}

impl YamlFileSource {
    /// Creates a source reading the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

#[async_trait]
impl ConfigSource for LiveApiSource {
    fn name(&self) -> &'static str {
        "api"
    }

    async fn load(&self) -> Option<ConfigMap> {
        match self.client.get_config().await {
            Upstream::Ok(Value::Object(mut body)) => match body.remove("config") {
                Some(Value::Object(config)) => Some(config),
                Some(other) => {
                    body.insert("config".to_string(), other);
                    Some(body)
                }
                None => Some(body),
            },
            _ => None,
        }
    }
}

#[async_trait]
impl ConfigSource for MirrorSnapshotSource {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn load(&self) -> Option<ConfigMap> {
        match self.mirror.latest_config().await {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("config snapshot unavailable: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl ConfigSource for YamlFileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load(&self) -> Option<ConfigMap> {
        Some(load_arm_yaml(&self.path).await)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
