use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Level assigned to lines that do not carry one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// `<timestamp> <logger>: <LEVEL>: <message>`
static PLAIN_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?)\s+(\w+):\s+(DEBUG|INFO|WARNING|ERROR|CRITICAL):\s+(.*)$")
        .expect("plain log line pattern is valid")
});

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// One parsed log line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// When the line was written, verbatim; empty if unknown.
    pub timestamp: String,

    /// Severity.
    pub level: String,

    /// Emitting component; empty if unknown.
    pub logger: String,

    /// The message.
    pub event: String,

    /// Job the line belongs to, when the writer recorded one.
    pub job_id: Option<Value>,

    /// Disc label the line belongs to, when the writer recorded one.
    pub label: Option<Value>,

    /// The line exactly as read.
    pub raw: String,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Parses one log line.
///
/// JSON objects are read field by field, then the plain `timestamp logger: LEVEL: message`
/// format is tried, and anything else becomes an `info` entry whose event is the whole line.
pub fn parse_line(line: &str) -> LogEntry {
    if let Ok(object) = serde_json::from_str::<Map<String, Value>>(line) {
        return LogEntry {
            timestamp: text_field(&object, "timestamp", ""),
            level: text_field(&object, "level", DEFAULT_LOG_LEVEL),
            logger: text_field(&object, "logger", ""),
            event: text_field(&object, "event", ""),
            job_id: object.get("job_id").filter(|v| !v.is_null()).cloned(),
            label: object.get("label").filter(|v| !v.is_null()).cloned(),
            raw: line.to_string(),
        };
    }

    if let Some(captures) = PLAIN_LINE.captures(line) {
        return LogEntry {
            timestamp: captures[1].trim().to_string(),
            level: captures[3].to_lowercase(),
            logger: captures[2].to_string(),
            event: captures[4].to_string(),
            job_id: None,
            label: None,
            raw: line.to_string(),
        };
    }

    LogEntry {
        timestamp: String::new(),
        level: DEFAULT_LOG_LEVEL.to_string(),
        logger: String::new(),
        event: line.to_string(),
        job_id: None,
        label: None,
        raw: line.to_string(),
    }
}

fn text_field(object: &Map<String, Value>, key: &str, default: &str) -> String {
    match object.get(key) {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
