use armui::{
    logs::{LogMode, LogReadQuery, LogReader, StructuredLogQuery},
    ArmUiError,
};
use tempfile::tempdir;
use tokio::fs;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const JOB_LOG: &str = "\
02-28-2026 04:58:00 ARM: INFO: Starting disc identification
02-28-2026 04:58:30 ARM: DEBUG: Found 12 titles
02-28-2026 04:59:00 ARM: WARNING: Disc is dirty: retrying
{\"timestamp\": \"2026-02-28T04:59:10\", \"level\": \"error\", \"logger\": \"arm.ripper\", \"event\": \"Rip of title 3 failed\", \"job_id\": 7, \"label\": \"SERENITY\"}

02-28-2026 04:59:16 ARM: INFO: Ripping complete
";

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

async fn log_dir() -> anyhow::Result<(tempfile::TempDir, LogReader)> {
    let dir = tempdir()?;
    let logs = dir.path().join("logs");
    fs::create_dir_all(&logs).await?;
    fs::write(logs.join("SERENITY_7.log"), JOB_LOG).await?;
    fs::write(logs.join("notes.txt"), "not a log").await?;
    fs::create_dir_all(logs.join("progress")).await?;
    fs::write(dir.path().join("secret.log"), "outside the log directory\n").await?;
    Ok((dir, LogReader::new(logs)))
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[test_log::test(tokio::test)]
async fn test_logs_list_only_log_files() -> anyhow::Result<()> {
    let (_dir, reader) = log_dir().await?;

    let logs = reader.list().await?;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].filename, "SERENITY_7.log");
    assert_eq!(logs[0].size, JOB_LOG.len() as u64);

    let missing = LogReader::new("/nonexistent/armui/logs");
    assert!(missing.list().await?.is_empty());

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_logs_read_tail_and_full() -> anyhow::Result<()> {
    let (_dir, reader) = log_dir().await?;

    let query = LogReadQuery {
        mode: LogMode::Tail,
        lines: 2,
    };
    let content = reader.read("SERENITY_7.log", &query).await?.unwrap();
    assert_eq!(content.lines, 2);
    assert_eq!(content.content, "\n02-28-2026 04:59:16 ARM: INFO: Ripping complete\n");

    let query = LogReadQuery {
        mode: LogMode::Full,
        lines: 1,
    };
    let content = reader.read("SERENITY_7.log", &query).await?.unwrap();
    assert_eq!(content.content, JOB_LOG);
    assert_eq!(content.lines, 6);

    let query = LogReadQuery {
        mode: LogMode::Tail,
        lines: 0,
    };
    let result = reader.read("SERENITY_7.log", &query).await;
    assert!(matches!(result, Err(ArmUiError::InvalidArgument(_))));

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_logs_reject_paths_outside_directory() -> anyhow::Result<()> {
    let (_dir, reader) = log_dir().await?;
    let query = LogReadQuery::default();

    assert!(reader.read("../secret.log", &query).await?.is_none());
    assert!(reader.read("/etc/passwd", &query).await?.is_none());
    assert!(reader.read("missing.log", &query).await?.is_none());
    assert!(reader.read("progress", &query).await?.is_none());
    assert!(reader
        .read_structured("../secret.log", &StructuredLogQuery::default())
        .await?
        .is_none());

    Ok(())
}

#[cfg(unix)]
#[test_log::test(tokio::test)]
async fn test_logs_reject_symlinks_leaving_directory() -> anyhow::Result<()> {
    let (dir, reader) = log_dir().await?;
    fs::symlink(dir.path().join("secret.log"), dir.path().join("logs/link.log")).await?;

    assert!(reader.resolve("link.log").await.is_none());
    assert!(reader
        .read("link.log", &LogReadQuery::default())
        .await?
        .is_none());
    assert!(reader
        .read_structured("link.log", &StructuredLogQuery::default())
        .await?
        .is_none());

    let names: Vec<_> = reader.list().await?.into_iter().map(|l| l.filename).collect();
    assert_eq!(names, vec!["SERENITY_7.log"]);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_logs_structured_parses_and_filters() -> anyhow::Result<()> {
    let (_dir, reader) = log_dir().await?;

    let query = StructuredLogQuery {
        mode: LogMode::Full,
        ..Default::default()
    };
    let log = reader.read_structured("SERENITY_7.log", &query).await?.unwrap();
    assert_eq!(log.lines, 5, "blank lines are skipped");
    assert_eq!(log.entries[0].logger, "ARM");
    assert_eq!(log.entries[3].level, "error");
    assert_eq!(log.entries[3].logger, "arm.ripper");
    assert_eq!(log.entries[3].job_id, Some(serde_json::json!(7)));

    let query = StructuredLogQuery {
        mode: LogMode::Full,
        level: Some("INFO".into()),
        ..Default::default()
    };
    let log = reader.read_structured("SERENITY_7.log", &query).await?.unwrap();
    let events: Vec<_> = log.entries.iter().map(|e| e.event.as_str()).collect();
    assert_eq!(
        events,
        vec!["Starting disc identification", "Ripping complete"]
    );

    let query = StructuredLogQuery {
        mode: LogMode::Full,
        search: Some("TITLE".into()),
        ..Default::default()
    };
    let log = reader.read_structured("SERENITY_7.log", &query).await?.unwrap();
    assert_eq!(log.lines, 2);

    let query = StructuredLogQuery {
        mode: LogMode::Tail,
        lines: 3,
        level: Some("warning".into()),
        ..Default::default()
    };
    let log = reader.read_structured("SERENITY_7.log", &query).await?.unwrap();
    assert!(log.entries.is_empty(), "tail window is taken before filtering");

    Ok(())
}
