use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    config::{config_string, load_arm_yaml, mask_config},
    mirror::{JobDetail, JobPage, JobQuery, MirrorReader},
    progress::ProgressReader,
    upstream::{CrcClient, CrcLookup, TranscoderClient},
    ArmUiError, ArmUiResult,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Key in `arm.yaml` holding the CRC database API key.
pub const CRC_API_KEY: &str = "ARM_API_KEY";

/// Transcoder job statuses that may be queued again.
pub const RETRANSCODABLE_STATUSES: &[&str] = &["completed", "failed"];

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Rip progress of a job together with its track counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobProgress {
    /// Percent complete of the current title.
    pub progress: Option<f64>,

    /// Current ripping stage.
    pub stage: Option<String>,

    /// Tracks found on the disc.
    pub tracks_total: usize,

    /// Tracks already ripped.
    pub tracks_ripped: usize,
}

/// Acknowledgement of a queued transcode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedTranscode {
    /// Always `"ok"`.
    pub status: &'static str,

    /// Human-readable confirmation.
    pub message: String,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Lists one page of jobs.
///
/// The query is validated before the mirror is touched. A mirror that cannot be read yields
/// an empty page.
pub async fn list_jobs(mirror: &dyn MirrorReader, query: &JobQuery) -> ArmUiResult<JobPage> {
    query.validate()?;

    match mirror.jobs_page(query).await {
        Ok((jobs, total)) => Ok(JobPage::new(query, jobs, total)),
        Err(e) => {
            tracing::warn!("failed to list jobs: {e}");
            Ok(JobPage::empty(query))
        }
    }
}

/// A job with its tracks and its masked config snapshot.
pub async fn job_detail(mirror: &dyn MirrorReader, job_id: i64) -> ArmUiResult<Option<JobDetail>> {
    let Some(job) = mirror.job(job_id).await? else {
        return Ok(None);
    };

    let (tracks, config) = tokio::join!(mirror.job_tracks(job_id), mirror.job_config(job_id));
    Ok(Some(JobDetail {
        job,
        tracks: tracks?,
        config: config?.map(|config| mask_config(&config)),
    }))
}

/// Rip progress of an existing job. `None` if the job does not exist.
pub async fn job_progress(
    mirror: &dyn MirrorReader,
    progress: &ProgressReader,
    job_id: i64,
) -> ArmUiResult<Option<JobProgress>> {
    if mirror.job(job_id).await?.is_none() {
        return Ok(None);
    }

    let (tracks, rip) = tokio::join!(mirror.job_tracks(job_id), progress.read(job_id));
    let tracks = tracks?;
    let rip = rip?;

    Ok(Some(JobProgress {
        progress: rip.progress,
        stage: rip.stage,
        tracks_total: tracks.len(),
        tracks_ripped: tracks.iter().filter(|t| t.ripped == Some(true)).count(),
    }))
}

/// Looks up a job's disc CRC in the community database.
///
/// `has_api_key` reports whether `arm.yaml` carries a key for submitting entries.
pub async fn crc_lookup(
    mirror: &dyn MirrorReader,
    crc: &CrcClient,
    arm_config_path: &Path,
    job_id: i64,
) -> ArmUiResult<Option<CrcLookup>> {
    let Some(job) = mirror.job(job_id).await? else {
        return Ok(None);
    };

    let Some(crc64) = job.crc_id.as_deref().filter(|c| !c.is_empty()) else {
        return Ok(Some(CrcLookup::no_crc()));
    };

    let (mut lookup, config) = tokio::join!(crc.lookup(crc64), load_arm_yaml(arm_config_path));
    lookup.has_api_key = config_string(&config, CRC_API_KEY).is_some();
    Ok(Some(lookup))
}

/// Sends a finished video rip to the transcoder again.
pub async fn retranscode_job(
    mirror: &dyn MirrorReader,
    transcoder: &TranscoderClient,
    job_id: i64,
) -> ArmUiResult<QueuedTranscode> {
    let payload = mirror
        .job(job_id)
        .await?
        .and_then(|job| job.retranscode_payload())
        .ok_or_else(|| ArmUiError::NotFound("Job not found or not a video disc".to_string()))?;

    deliver(transcoder, &payload, "Transcode job queued").await
}

/// Requeues a completed or failed transcoder job through the webhook.
pub async fn retranscode_transcoder_job(
    transcoder: &TranscoderClient,
    job_id: i64,
) -> ArmUiResult<QueuedTranscode> {
    let job = transcoder.job(job_id).await.ok().ok_or_else(|| {
        ArmUiError::NotFound("Transcoder job not found or transcoder offline".to_string())
    })?;

    let status = job["status"].as_str().unwrap_or_default();
    if !RETRANSCODABLE_STATUSES.contains(&status) {
        return Err(ArmUiError::InvalidArgument(format!(
            "Cannot re-transcode job with status '{status}'"
        )));
    }

    deliver(transcoder, &transcoder_job_payload(&job), "Transcode job re-queued").await
}

/// Rebuilds the ripping service's webhook payload from a transcoder job record.
pub fn transcoder_job_payload(job: &Value) -> Value {
    let text = |key: &str, default: &str| {
        job[key].as_str().unwrap_or(default).to_string()
    };
    let title = text("title", "Unknown");

    json!({
        "title": title,
        "body": title,
        "path": text("source_path", ""),
        "job_id": job["arm_job_id"],
        "status": "success",
        "video_type": text("video_type", "movie"),
        "year": text("year", ""),
        "disctype": text("disctype", "bluray"),
    })
}

async fn deliver(
    transcoder: &TranscoderClient,
    payload: &Value,
    message: &str,
) -> ArmUiResult<QueuedTranscode> {
    let delivery = transcoder.send_webhook(payload).await;
    if !delivery.success {
        return Err(ArmUiError::UpstreamUnavailable(
            delivery
                .error
                .unwrap_or_else(|| "Transcoder unavailable".to_string()),
        ));
    }

    tracing::info!("queued transcode for arm job {}", payload["job_id"]);
    Ok(QueuedTranscode {
        status: "ok",
        message: message.to_string(),
    })
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcoder_job_payload_defaults() {
        let payload = transcoder_job_payload(&json!({
            "title": "Alien",
            "source_path": "/raw/Alien",
            "arm_job_id": 12,
            "status": "failed",
        }));

        assert_eq!(payload["title"], "Alien");
        assert_eq!(payload["body"], "Alien");
        assert_eq!(payload["path"], "/raw/Alien");
        assert_eq!(payload["job_id"], 12);
        assert_eq!(payload["video_type"], "movie");
        assert_eq!(payload["disctype"], "bluray");
        assert_eq!(payload["year"], "");

        let payload = transcoder_job_payload(&json!({}));
        assert_eq!(payload["title"], "Unknown");
        assert_eq!(payload["job_id"], Value::Null);
    }
}
