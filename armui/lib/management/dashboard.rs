//! The dashboard summary.
//!
//! The summary is built from four independent dependencies: the database mirror, the ripping
//! service's live stats, the transcoder and the hardware cache. Each has its own "unavailable"
//! representation in [`DashboardResponse`], so one dependency being slow or down never fails
//! the others.

use std::{collections::BTreeMap, path::Path};

use serde::Serialize;
use serde_json::Value;

use crate::{
    mirror::{ActiveJob, Drive, MirrorReader},
    upstream::{ArmClient, HardwareCache, TranscoderClient, TranscoderJobQuery, Upstream},
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Transcoder job status counted as an active transcode.
pub const PROCESSING_STATUS: &str = "processing";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Everything the dashboard page shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardResponse {
    /// Whether the database mirror could be opened.
    pub db_available: bool,

    /// In-progress jobs. Empty when the mirror is down.
    pub active_jobs: Vec<ActiveJob>,

    /// Number of drives known to the ripping service.
    pub drives_online: usize,

    /// Drive display names keyed by mount path and by `/dev/<name>` alias.
    pub drive_names: BTreeMap<String, String>,

    /// Notifications not yet seen.
    pub notification_count: i64,

    /// Whether new discs are ripped. `None` when the mirror is down.
    pub ripping_enabled: Option<bool>,

    /// Whether the ripping service's API answered.
    pub arm_online: bool,

    /// Whether the transcoder's health endpoint answered.
    pub transcoder_online: bool,

    /// Transcoder queue statistics.
    pub transcoder_stats: Option<Value>,

    /// Transcoder jobs currently processing.
    pub active_transcodes: Vec<Value>,

    /// Live CPU, memory and storage figures of the ripping host.
    pub system_stats: Option<Value>,

    /// Live CPU, memory and storage figures of the transcoding host.
    pub transcoder_system_stats: Option<Value>,

    /// Cached hardware description of the ripping host.
    pub system_info: Option<Value>,

    /// Cached hardware description of the transcoding host.
    pub transcoder_info: Option<Value>,
}

/// The mirror-backed part of the dashboard.
#[derive(Debug, Default)]
struct MirrorSummary {
    db_available: bool,
    active_jobs: Vec<ActiveJob>,
    drives_online: usize,
    drive_names: BTreeMap<String, String>,
    notification_count: i64,
    ripping_enabled: Option<bool>,
}

/// The transcoder part of the dashboard.
#[derive(Debug, Default)]
struct TranscoderSummary {
    online: bool,
    stats: Option<Value>,
    active_transcodes: Vec<Value>,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Builds the dashboard summary.
///
/// The mirror is checked once up front; when it is unavailable no other mirror query is
/// issued. Mirror reads, the ripping service's stats and the transcoder calls all run
/// concurrently.
///
/// ## Arguments
///
/// * `mirror` - The database mirror
/// * `arm` - Client for the ripping service
/// * `transcoder` - Client for the transcoding service
/// * `hardware` - Startup snapshot of both hosts' hardware
pub async fn dashboard(
    mirror: &dyn MirrorReader,
    arm: &ArmClient,
    transcoder: &TranscoderClient,
    hardware: &HardwareCache,
) -> DashboardResponse {
    let (summary, arm_stats, transcoder_summary, transcoder_system_stats) = tokio::join!(
        mirror_summary(mirror),
        arm.system_stats(),
        transcoder_summary(transcoder),
        transcoder.system_stats(),
    );

    DashboardResponse {
        db_available: summary.db_available,
        active_jobs: summary.active_jobs,
        drives_online: summary.drives_online,
        drive_names: summary.drive_names,
        notification_count: summary.notification_count,
        ripping_enabled: summary.ripping_enabled,
        arm_online: arm_stats.is_reachable(),
        transcoder_online: transcoder_summary.online,
        transcoder_stats: transcoder_summary.stats,
        active_transcodes: transcoder_summary.active_transcodes,
        system_stats: arm_stats.ok(),
        transcoder_system_stats: transcoder_system_stats.ok(),
        system_info: hardware.arm_info(),
        transcoder_info: hardware.transcoder_info(),
    }
}

/// Maps every drive's mount path, and its `/dev/<basename>` alias, to the drive's name.
///
/// Job records refer to drives by either form.
pub fn drive_name_index(drives: &[Drive]) -> BTreeMap<String, String> {
    let mut index = BTreeMap::new();
    for drive in drives {
        let (Some(mount), Some(name)) = (drive.mount.as_deref(), drive.name.as_deref()) else {
            continue;
        };

        index.insert(mount.to_string(), name.to_string());
        if let Some(basename) = Path::new(mount).file_name().and_then(|b| b.to_str()) {
            index.insert(format!("/dev/{basename}"), name.to_string());
        }
    }

    index
}

async fn mirror_summary(mirror: &dyn MirrorReader) -> MirrorSummary {
    if !mirror.is_available().await {
        return MirrorSummary::default();
    }

    let (active_jobs, drives, notification_count, paused) = tokio::join!(
        mirror.active_jobs(),
        mirror.drives(),
        mirror.unseen_notification_count(),
        mirror.ripping_paused(),
    );

    let drives = drives.unwrap_or_else(|e| {
        tracing::warn!("failed to read drives: {e}");
        Vec::new()
    });
    let drive_names = drive_name_index(&drives);

    let active_jobs = active_jobs
        .unwrap_or_else(|e| {
            tracing::warn!("failed to read active jobs: {e}");
            Vec::new()
        })
        .into_iter()
        .map(|mut active| {
            active.drive_name = [&active.job.devpath, &active.job.mountpoint]
                .into_iter()
                .flatten()
                .find_map(|path| drive_names.get(path).cloned());
            active
        })
        .collect();

    MirrorSummary {
        db_available: true,
        active_jobs,
        drives_online: drives.len(),
        drive_names,
        notification_count: notification_count.unwrap_or_else(|e| {
            tracing::warn!("failed to count notifications: {e}");
            0
        }),
        ripping_enabled: paused
            .map_err(|e| tracing::warn!("failed to read ripping state: {e}"))
            .ok()
            .map(|paused| !paused),
    }
}

async fn transcoder_summary(transcoder: &TranscoderClient) -> TranscoderSummary {
    if !matches!(transcoder.health().await, Upstream::Ok(_)) {
        return TranscoderSummary::default();
    }

    let query = TranscoderJobQuery {
        status: Some(PROCESSING_STATUS.to_string()),
        ..Default::default()
    };
    let (stats, jobs) = tokio::join!(transcoder.stats(), transcoder.jobs(&query));

    TranscoderSummary {
        online: true,
        stats: stats.ok(),
        active_transcodes: jobs
            .ok()
            .and_then(|mut body| match body.get_mut("jobs").map(Value::take) {
                Some(Value::Array(jobs)) => Some(jobs),
                _ => None,
            })
            .unwrap_or_default(),
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
