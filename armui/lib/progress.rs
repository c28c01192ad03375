//! Rip progress extraction from the encoder's per-job progress files.
//!
//! The ripper streams `PRGV:current,total,max` and `PRGC:index,code,"name"` markers into
//! `<progress dir>/<job id>.log`. Only the tail of the file is read and the last marker of
//! each kind wins.

use std::{
    io::SeekFrom,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use getset::Getters;
use regex::Regex;
use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::ArmUiResult;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Bytes read from the end of a progress file.
pub const PROGRESS_WINDOW_BYTES: u64 = 8 * 1024;

static PROGRESS_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PRGV:(\d+),(\d+),(\d+)").expect("progress value pattern is valid")
});

static PROGRESS_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"PRGC:(\d+),(\d+),"([^"]*)""#).expect("progress title pattern is valid")
});

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Progress of a rip as far as the progress file tells.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RipProgress {
    /// Percentage complete, one decimal.
    pub progress: Option<f64>,

    /// What is being ripped, e.g. `Title 2: Saving to MKV file`.
    pub stage: Option<String>,
}

/// Locates and reads per-job progress files.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub with_prefix")]
pub struct ProgressReader {
    /// Directory holding `<job id>.log` progress files.
    dir: PathBuf,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ProgressReader {
    /// Creates a reader for progress files under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the progress file for `job_id`.
    pub fn path_for(&self, job_id: i64) -> PathBuf {
        self.dir.join(format!("{job_id}.log"))
    }

    /// Reads the progress of `job_id`. A missing file is empty progress.
    pub async fn read(&self, job_id: i64) -> ArmUiResult<RipProgress> {
        let Some(window) = read_tail(&self.path_for(job_id), PROGRESS_WINDOW_BYTES).await? else {
            return Ok(RipProgress::default());
        };

        Ok(extract_progress(&window))
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Extracts progress from a window of progress-file text.
pub fn extract_progress(window: &str) -> RipProgress {
    let mut progress = None;
    let mut stage = None;

    for line in window.lines() {
        for captures in PROGRESS_VALUE.captures_iter(line) {
            let total = captures[2].parse::<u64>();
            let max = captures[3].parse::<u64>();
            if let (Ok(total), Ok(max)) = (total, max) {
                progress = percentage(total, max);
            }
        }

        for captures in PROGRESS_TITLE.captures_iter(line) {
            if let Ok(index) = captures[1].parse::<u64>() {
                stage = Some(format!("Title {}: {}", index.saturating_add(1), &captures[3]));
            }
        }
    }

    RipProgress { progress, stage }
}

fn percentage(total: u64, max: u64) -> Option<f64> {
    if max == 0 {
        return None;
    }

    let percent = total as f64 / max as f64 * 100.0;
    Some((percent * 10.0).round() / 10.0)
}

/// Reads at most the last `limit` bytes of `path`, decoding permissively.
async fn read_tail(path: &Path, limit: u64) -> ArmUiResult<Option<String>> {
    let mut file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let len = file.metadata().await?.len();
    file.seek(SeekFrom::Start(len.saturating_sub(limit))).await?;

    let mut bytes = Vec::with_capacity(len.min(limit) as usize);
    file.read_to_end(&mut bytes).await?;
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_extract_progress_last_marker_wins() {
        let window = "PRGV:10,50,100\nnoise\nPRGV:80,95,100\n";
        let progress = extract_progress(window);
        assert_eq!(progress.progress, Some(95.0));
        assert_eq!(progress.stage, None);
    }

    #[test]
    fn test_extract_progress_stage_label() {
        let window = "PRGC:0,5017,\"Scanning CD-ROM devices\"\nPRGV:1,1,65536\nPRGC:1,5018,\"Saving to MKV file\"\n";
        let progress = extract_progress(window);
        assert_eq!(progress.stage.as_deref(), Some("Title 2: Saving to MKV file"));
        assert_eq!(progress.progress, Some(0.0));
    }

    #[test]
    fn test_extract_progress_huge_title_index() {
        let progress = extract_progress("PRGC:18446744073709551615,1,\"Saving\"\n");
        assert_eq!(
            progress.stage.as_deref(),
            Some("Title 18446744073709551615: Saving")
        );

        let progress = extract_progress("PRGC:99999999999999999999999,1,\"Saving\"\n");
        assert_eq!(progress.stage, None);
    }

    #[test]
    fn test_extract_progress_rounds_to_one_decimal() {
        assert_eq!(extract_progress("PRGV:0,1,3").progress, Some(33.3));
        assert_eq!(extract_progress("PRGV:0,2,3").progress, Some(66.7));
        assert_eq!(extract_progress("PRGV:5,5,0").progress, None);
    }

    #[test]
    fn test_extract_progress_without_markers() {
        assert_eq!(extract_progress("nothing to see\n"), RipProgress::default());
    }

    #[tokio::test]
    async fn test_read_missing_file_is_empty() -> ArmUiResult<()> {
        let dir = tempdir()?;
        let reader = ProgressReader::new(dir.path());
        assert_eq!(reader.read(42).await?, RipProgress::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_read_only_considers_tail_window() -> ArmUiResult<()> {
        let dir = tempdir()?;
        let reader = ProgressReader::new(dir.path());

        let mut text = String::from("PRGC:4,1,\"Stale stage\"\n");
        text.push_str(&"x".repeat(PROGRESS_WINDOW_BYTES as usize));
        text.push_str("\nPRGV:1,42,84\n");
        tokio::fs::write(reader.path_for(7), text).await?;

        let progress = reader.read(7).await?;
        assert_eq!(progress.progress, Some(50.0));
        assert_eq!(progress.stage, None);
        Ok(())
    }
}
