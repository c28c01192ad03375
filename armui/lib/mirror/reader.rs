use async_trait::async_trait;

use crate::{config::ConfigMap, ArmUiResult};

use super::{ActiveJob, Drive, Job, JobQuery, Notification, Track};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Lower-cased job statuses that count as in progress.
pub const ACTIVE_STATUSES: &[&str] = &[
    "active",
    "ripping",
    "transcoding",
    "waiting",
    "info",
    "waiting_transcode",
];

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// Read access to the mirrored ripping-service state.
///
/// Config maps returned here are raw. Callers mask them before they leave the process.
#[async_trait]
pub trait MirrorReader: Send + Sync {
    /// Returns `true` if the database can be opened and queried.
    async fn is_available(&self) -> bool;

    /// In-progress jobs, newest first, with track counters.
    async fn active_jobs(&self) -> ArmUiResult<Vec<ActiveJob>>;

    /// One page of jobs matching `query`, plus the total match count.
    async fn jobs_page(&self, query: &JobQuery) -> ArmUiResult<(Vec<Job>, u64)>;

    /// A single job.
    async fn job(&self, job_id: i64) -> ArmUiResult<Option<Job>>;

    /// Tracks of a job, in track order.
    async fn job_tracks(&self, job_id: i64) -> ArmUiResult<Vec<Track>>;

    /// The config snapshot taken for a job.
    async fn job_config(&self, job_id: i64) -> ArmUiResult<Option<ConfigMap>>;

    /// The most recent config snapshot of any job.
    async fn latest_config(&self) -> ArmUiResult<Option<ConfigMap>>;

    /// All drives with their current job attached.
    async fn drives(&self) -> ArmUiResult<Vec<Drive>>;

    /// Notifications that have not been cleared, newest first.
    async fn notifications(&self) -> ArmUiResult<Vec<Notification>>;

    /// Number of notifications not yet seen.
    async fn unseen_notification_count(&self) -> ArmUiResult<i64>;

    /// Whether ripping of new discs is paused.
    async fn ripping_paused(&self) -> ArmUiResult<bool>;
}
