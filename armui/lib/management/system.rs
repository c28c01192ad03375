use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::{
    mirror::MirrorReader,
    upstream::{ArmClient, HardwareCache, TranscoderClient, Upstream},
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Version of this backend.
pub const UI_VERSION: &str = env!("CARGO_PKG_VERSION");

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Versions, reachability and storage of the whole installation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInfo {
    /// Component versions.
    pub versions: Versions,

    /// Which dependencies answered.
    pub reachability: Reachability,

    /// Path checks reported by the ripping service.
    pub paths: Option<Value>,

    /// The database mirror.
    pub database: DatabaseInfo,
}

/// Component versions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Versions {
    /// This backend.
    pub ui: &'static str,

    /// The ripping service.
    pub arm: Option<String>,

    /// The transcoding service.
    pub transcoder: Option<String>,
}

/// Which dependencies answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reachability {
    /// The ripping service's API.
    pub arm: bool,

    /// The transcoder's API.
    pub transcoder: bool,

    /// The database mirror.
    pub database: bool,
}

/// Location and size of the database mirror.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseInfo {
    /// Path of the database file.
    pub path: PathBuf,

    /// File size, when the file exists.
    pub size_bytes: Option<u64>,
}

/// The hardware cache after a refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HardwareSnapshot {
    /// The ripping host.
    pub arm: Option<Value>,

    /// The transcoding host.
    pub transcoder: Option<Value>,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Collects versions, reachability, path checks and database size concurrently.
pub async fn system_info(
    mirror: &dyn MirrorReader,
    arm: &ArmClient,
    transcoder: &TranscoderClient,
    db_path: &Path,
) -> SystemInfo {
    let (arm_version, health, paths, database, size_bytes) = tokio::join!(
        arm.version(),
        transcoder.health(),
        arm.paths(),
        mirror.is_available(),
        file_size(db_path),
    );

    SystemInfo {
        reachability: Reachability {
            arm: arm_version.is_reachable(),
            transcoder: health.is_reachable(),
            database,
        },
        versions: Versions {
            ui: UI_VERSION,
            arm: version_of(arm_version, &["arm_version", "version"]),
            transcoder: version_of(health, &["version"]),
        },
        paths: paths.ok(),
        database: DatabaseInfo {
            path: db_path.to_path_buf(),
            size_bytes,
        },
    }
}

/// Refetches both hosts' hardware descriptions.
pub async fn refresh_hardware(
    hardware: &HardwareCache,
    arm: &ArmClient,
    transcoder: &TranscoderClient,
) -> HardwareSnapshot {
    hardware.refresh(arm, transcoder).await;
    HardwareSnapshot {
        arm: hardware.arm_info(),
        transcoder: hardware.transcoder_info(),
    }
}

fn version_of(outcome: Upstream<Value>, keys: &[&str]) -> Option<String> {
    let body = outcome.ok()?;
    if let Value::String(version) = body {
        return Some(version);
    }

    keys.iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

async fn file_size(path: &Path) -> Option<u64> {
    tokio::fs::metadata(path).await.ok().map(|m| m.len())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
