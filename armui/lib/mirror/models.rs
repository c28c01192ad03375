use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::FromRow;

use crate::config::ConfigMap;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Disc types that carry video the transcoder can work on.
pub const VIDEO_DISC_TYPES: &[&str] = &["dvd", "bluray", "bluray4k"];

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A rip job as recorded by the ripping service.
///
/// Columns missing from older schemas decode as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
#[sqlx(default)]
pub struct Job {
    /// Primary key.
    pub job_id: i64,

    /// Version of the ripping service that ran the job.
    pub arm_version: Option<String>,

    /// CRC64 of the disc.
    pub crc_id: Option<String>,

    /// Log file name in the log directory.
    pub logfile: Option<String>,

    /// When the job started.
    pub start_time: Option<NaiveDateTime>,

    /// When the job finished.
    pub stop_time: Option<NaiveDateTime>,

    /// Elapsed time, preformatted by the ripping service.
    pub job_length: Option<String>,

    /// Lifecycle status. Not a closed set.
    pub status: Option<String>,

    /// Free-text stage within the status.
    pub stage: Option<String>,

    /// Number of titles found on the disc.
    pub no_of_titles: Option<i64>,

    /// Effective title.
    pub title: Option<String>,

    /// Title detected automatically.
    pub title_auto: Option<String>,

    /// Title set by a user.
    pub title_manual: Option<String>,

    /// Effective year.
    pub year: Option<String>,

    /// Year detected automatically.
    pub year_auto: Option<String>,

    /// Year set by a user.
    pub year_manual: Option<String>,

    /// Effective video type, `movie` or `series`.
    pub video_type: Option<String>,

    /// Video type detected automatically.
    pub video_type_auto: Option<String>,

    /// Video type set by a user.
    pub video_type_manual: Option<String>,

    /// Effective IMDb id.
    pub imdb_id: Option<String>,

    /// IMDb id detected automatically.
    pub imdb_id_auto: Option<String>,

    /// IMDb id set by a user.
    pub imdb_id_manual: Option<String>,

    /// Effective poster URL.
    pub poster_url: Option<String>,

    /// Poster URL detected automatically.
    pub poster_url_auto: Option<String>,

    /// Poster URL set by a user.
    pub poster_url_manual: Option<String>,

    /// Device the disc was read from, e.g. `/dev/sr0`.
    pub devpath: Option<String>,

    /// Where the disc was mounted.
    pub mountpoint: Option<String>,

    /// Whether the title was confirmed by a metadata lookup.
    pub hasnicetitle: Option<bool>,

    /// Accumulated error text.
    pub errors: Option<String>,

    /// `dvd`, `bluray`, `bluray4k`, `music`, `data` or `unknown`.
    pub disctype: Option<String>,

    /// Volume label of the disc.
    pub label: Option<String>,

    /// Final output directory.
    pub path: Option<String>,

    /// Directory of the raw rip.
    pub raw_path: Option<String>,

    /// Directory of the transcoded output.
    pub transcode_path: Option<String>,

    /// Whether the disc was ejected.
    pub ejected: Option<bool>,

    /// Whether the job was edited after the rip started.
    pub updated: Option<bool>,

    /// Process id of the ripper.
    pub pid: Option<i64>,

    /// Hash of the ripper's process, used for liveness checks.
    pub pid_hash: Option<i64>,
}

/// An in-progress job with its track counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct ActiveJob {
    /// The job.
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub job: Job,

    /// Tracks found on the disc.
    pub tracks_total: i64,

    /// Tracks already ripped.
    pub tracks_ripped: i64,

    /// Display name of the drive the job is running on.
    #[sqlx(skip)]
    pub drive_name: Option<String>,
}

/// A title or audio track of a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
#[sqlx(default)]
pub struct Track {
    /// Primary key.
    pub track_id: i64,

    /// Owning job.
    pub job_id: i64,

    /// Ordinal on the disc, stored as text.
    pub track_number: Option<String>,

    /// Duration in seconds.
    pub length: Option<i64>,

    /// Aspect ratio, e.g. `16:9`.
    pub aspect_ratio: Option<String>,

    /// Frame rate.
    pub fps: Option<f64>,

    /// Whether this is the main feature.
    pub main_feature: Option<bool>,

    /// Base name of the output.
    pub basename: Option<String>,

    /// Current file name.
    pub filename: Option<String>,

    /// File name as ripped.
    pub orig_filename: Option<String>,

    /// File name after renaming.
    pub new_filename: Option<String>,

    /// Whether the track has been ripped.
    pub ripped: Option<bool>,

    /// Track status.
    pub status: Option<String>,

    /// Error text.
    pub error: Option<String>,

    /// Which tool produced the track.
    pub source: Option<String>,
}

/// An optical drive known to the ripping service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
#[sqlx(default)]
pub struct Drive {
    /// Primary key.
    pub drive_id: i64,

    /// User-facing name.
    pub name: Option<String>,

    /// Mount path, e.g. `/mnt/dev/sr0`.
    pub mount: Option<String>,

    /// Job currently using the drive.
    pub job_id_current: Option<i64>,

    /// Job that used the drive last.
    pub job_id_previous: Option<i64>,

    /// User-facing description.
    pub description: Option<String>,

    /// Auto or manual mode.
    pub drive_mode: Option<String>,

    /// Manufacturer.
    pub maker: Option<String>,

    /// Model.
    pub model: Option<String>,

    /// Serial number.
    pub serial: Option<String>,

    /// Bus, e.g. `usb` or `sata`.
    pub connection: Option<String>,

    /// Can read CDs.
    pub read_cd: Option<bool>,

    /// Can read DVDs.
    pub read_dvd: Option<bool>,

    /// Can read Blu-rays.
    pub read_bd: Option<bool>,

    /// Firmware revision.
    pub firmware: Option<String>,

    /// Physical location, free text.
    pub location: Option<String>,

    /// The drive was not seen on the last scan.
    pub stale: Option<bool>,

    /// M-DISC support level.
    pub mdisc: Option<i64>,

    /// Stable identity derived from the serial.
    pub serial_id: Option<String>,

    /// The job referenced by `job_id_current`, when it exists.
    #[sqlx(skip)]
    pub current_job: Option<Job>,
}

/// A notification raised by the ripping service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
#[sqlx(default)]
pub struct Notification {
    /// Primary key.
    pub id: i64,

    /// Headline.
    pub title: Option<String>,

    /// Body.
    pub message: Option<String>,

    /// When it was raised.
    pub trigger_time: Option<NaiveDateTime>,

    /// Whether a user has seen it.
    pub seen: Option<bool>,

    /// Whether a user dismissed it.
    pub cleared: Option<bool>,
}

/// A job with its tracks and masked config snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetail {
    /// The job.
    #[serde(flatten)]
    pub job: Job,

    /// Tracks in track order.
    pub tracks: Vec<Track>,

    /// Config snapshot with sensitive values masked.
    pub config: Option<ConfigMap>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Job {
    /// Returns `true` if the job's lower-cased status is one of the in-progress statuses.
    pub fn is_active(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| super::ACTIVE_STATUSES.contains(&s.to_lowercase().as_str()))
    }

    /// Builds the webhook payload that asks the transcoder to process this job again.
    ///
    /// Returns `None` unless the job ripped a video disc.
    pub fn retranscode_payload(&self) -> Option<Value> {
        let disctype = self.disctype.as_deref()?;
        if !VIDEO_DISC_TYPES.contains(&disctype) {
            return None;
        }

        let title = first_non_empty([&self.title, &self.title_auto, &self.label])
            .unwrap_or("Unknown");
        let year = first_non_empty([&self.year, &self.year_auto]).unwrap_or("");
        let body = if year.is_empty() {
            title.to_string()
        } else {
            format!("{title} ({year})")
        };
        let path = first_non_empty([&self.raw_path, &self.path]).unwrap_or("");
        let video_type = first_non_empty([&self.video_type, &self.video_type_auto]).unwrap_or("movie");

        Some(json!({
            "title": format!("ARM rip complete: {title}"),
            "body": body,
            "path": path,
            "job_id": self.job_id,
            "status": "success",
            "video_type": video_type,
            "year": year,
            "disctype": disctype,
        }))
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn first_non_empty<const N: usize>(candidates: [&Option<String>; N]) -> Option<&str> {
    candidates
        .into_iter()
        .filter_map(|c| c.as_deref())
        .find(|s| !s.is_empty())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn video_job() -> Job {
        Job {
            job_id: 9,
            disctype: Some("bluray".into()),
            title_auto: Some("Serenity".into()),
            year_auto: Some("2005".into()),
            raw_path: Some("/home/arm/raw/Serenity".into()),
            path: Some("/home/arm/media/Serenity".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_retranscode_payload_uses_fallbacks() {
        let payload = video_job().retranscode_payload().unwrap();
        assert_eq!(payload["title"], "ARM rip complete: Serenity");
        assert_eq!(payload["body"], "Serenity (2005)");
        assert_eq!(payload["path"], "/home/arm/raw/Serenity");
        assert_eq!(payload["video_type"], "movie");
        assert_eq!(payload["job_id"], 9);
        assert_eq!(payload["disctype"], "bluray");
    }

    #[test]
    fn test_retranscode_payload_label_and_unknown() {
        let job = Job {
            disctype: Some("dvd".into()),
            title: Some(String::new()),
            label: Some("DISC_LABEL".into()),
            path: Some("/media/out".into()),
            ..Default::default()
        };
        let payload = job.retranscode_payload().unwrap();
        assert_eq!(payload["body"], "DISC_LABEL");
        assert_eq!(payload["path"], "/media/out");
        assert_eq!(payload["year"], "");

        let job = Job {
            disctype: Some("dvd".into()),
            ..Default::default()
        };
        assert_eq!(job.retranscode_payload().unwrap()["body"], "Unknown");
    }

    #[test]
    fn test_retranscode_payload_requires_video_disc() {
        for disctype in [None, Some("music"), Some("data")] {
            let job = Job {
                disctype: disctype.map(str::to_string),
                ..Default::default()
            };
            assert!(job.retranscode_payload().is_none());
        }
    }

    #[test]
    fn test_is_active_ignores_case() {
        let job = |status: &str| Job {
            status: Some(status.into()),
            ..Default::default()
        };
        assert!(job("Ripping").is_active());
        assert!(job("waiting_transcode").is_active());
        assert!(!job("success").is_active());
        assert!(!Job::default().is_active());
    }
}
