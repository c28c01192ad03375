use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use getset::Getters;
use serde::{Deserialize, Serialize};

use crate::{ArmUiError, ArmUiResult};

use super::{parse_line, LogEntry};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Number of lines returned in tail mode when the caller does not say.
pub const DEFAULT_TAIL_LINES: usize = 100;

/// Upper bound on lines in tail mode.
pub const MAX_TAIL_LINES: usize = 10_000;

/// Extension of files listed as logs.
const LOG_EXTENSION: &str = "log";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// How much of a log file to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    /// The last N lines.
    #[default]
    Tail,

    /// The whole file.
    Full,
}

/// Query parameters for reading a log as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogReadQuery {
    /// Tail or full.
    #[serde(default)]
    pub mode: LogMode,

    /// Lines to keep in tail mode.
    #[serde(default = "default_lines")]
    pub lines: usize,
}

/// Query parameters for reading a log as parsed entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredLogQuery {
    /// Tail or full.
    #[serde(default)]
    pub mode: LogMode,

    /// Lines to keep in tail mode, counted before filtering.
    #[serde(default = "default_lines")]
    pub lines: usize,

    /// Keep only entries of this level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Keep only entries whose event contains this text, ignoring case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// A log file in the log directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogFileInfo {
    /// File name relative to the log directory.
    pub filename: String,

    /// Size in bytes.
    pub size: u64,

    /// Last modification time.
    pub modified: DateTime<Utc>,
}

/// A log file read as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogContent {
    /// File name as requested.
    pub filename: String,

    /// The text that was read.
    pub content: String,

    /// Number of lines in `content`.
    pub lines: usize,
}

/// A log file read as parsed entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredLog {
    /// File name as requested.
    pub filename: String,

    /// Entries that survived filtering, in file order.
    pub entries: Vec<LogEntry>,

    /// Number of entries.
    pub lines: usize,
}

/// Reads logs from one directory, refusing anything that resolves outside it.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub with_prefix")]
pub struct LogReader {
    /// The log directory.
    root: PathBuf,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl LogReader {
    /// Creates a reader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Lists `*.log` files, most recently modified first.
    ///
    /// A missing log directory lists as empty.
    pub async fn list(&self) -> ArmUiResult<Vec<LogFileInfo>> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut logs = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(LOG_EXTENSION) {
                continue;
            }

            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }

            logs.push(LogFileInfo {
                filename: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
                modified: DateTime::<Utc>::from(metadata.modified()?),
            });
        }

        logs.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(logs)
    }

    /// Reads a log as text. `None` if the file does not exist or escapes the log directory.
    pub async fn read(&self, filename: &str, query: &LogReadQuery) -> ArmUiResult<Option<LogContent>> {
        validate_lines(query.lines)?;

        let Some(text) = self.read_text(filename).await? else {
            return Ok(None);
        };

        let (content, lines) = match query.mode {
            LogMode::Full => {
                let lines = text.matches('\n').count();
                (text, lines)
            }
            LogMode::Tail => {
                let tail = tail_lines(&text, query.lines);
                (tail.concat(), tail.len())
            }
        };

        Ok(Some(LogContent {
            filename: filename.to_string(),
            content,
            lines,
        }))
    }

    /// Reads a log as parsed, filtered entries. `None` under the same conditions as [`Self::read`].
    pub async fn read_structured(
        &self,
        filename: &str,
        query: &StructuredLogQuery,
    ) -> ArmUiResult<Option<StructuredLog>> {
        validate_lines(query.lines)?;

        let Some(text) = self.read_text(filename).await? else {
            return Ok(None);
        };

        let window = match query.mode {
            LogMode::Full => text.split_inclusive('\n').collect(),
            LogMode::Tail => tail_lines(&text, query.lines),
        };

        let level = query.level.as_deref().filter(|l| !l.is_empty());
        let search = query
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let entries: Vec<_> = window
            .into_iter()
            .map(|line| line.trim_end_matches(['\n', '\r']))
            .filter(|line| !line.trim().is_empty())
            .map(parse_line)
            .filter(|entry| level.is_none_or(|l| entry.level.eq_ignore_ascii_case(l)))
            .filter(|entry| {
                search
                    .as_deref()
                    .is_none_or(|s| entry.event.to_lowercase().contains(s))
            })
            .collect();

        Ok(Some(StructuredLog {
            filename: filename.to_string(),
            lines: entries.len(),
            entries,
        }))
    }

    /// Resolves `filename` inside the log directory.
    ///
    /// Returns `None` if either path does not exist or the canonical file path is not
    /// inside the canonical root, which rejects `..` segments and symlinks pointing out.
    pub async fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let root = tokio::fs::canonicalize(&self.root).await.ok()?;
        let candidate = tokio::fs::canonicalize(root.join(filename)).await.ok()?;

        if !candidate.starts_with(&root) {
            tracing::warn!("rejected log path outside log directory: {filename}");
            return None;
        }

        Some(candidate)
    }

    async fn read_text(&self, filename: &str) -> ArmUiResult<Option<String>> {
        let Some(path) = self.resolve(filename).await else {
            return Ok(None);
        };

        if !is_file(&path).await {
            return Ok(None);
        }

        let bytes = tokio::fs::read(&path).await?;
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn default_lines() -> usize {
    DEFAULT_TAIL_LINES
}

/// Checks a tail line count is within 1 to [`MAX_TAIL_LINES`].
pub fn validate_lines(lines: usize) -> ArmUiResult<()> {
    if !(1..=MAX_TAIL_LINES).contains(&lines) {
        return Err(ArmUiError::InvalidArgument(format!(
            "lines must be between 1 and {MAX_TAIL_LINES}"
        )));
    }
    Ok(())
}

/// The last `n` lines of `text`, each keeping its line terminator.
fn tail_lines(text: &str, n: usize) -> Vec<&str> {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let skip = lines.len().saturating_sub(n);
    lines[skip..].to_vec()
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for LogReadQuery {
    fn default() -> Self {
        Self {
            mode: LogMode::Tail,
            lines: DEFAULT_TAIL_LINES,
        }
    }
}

impl Default for StructuredLogQuery {
    fn default() -> Self {
        Self {
            mode: LogMode::Tail,
            lines: DEFAULT_TAIL_LINES,
            level: None,
            search: None,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
