use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicU8, Ordering},
};

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{
    sqlite::{Sqlite, SqliteConnectOptions, SqliteConnection, SqliteRow},
    Connection, QueryBuilder, Row,
};

use crate::{
    config::{ConfigMap, CONFIG_FIELDS},
    ArmUiResult,
};

use super::{
    escape_like, ActiveJob, Drive, Job, JobQuery, MirrorReader, Notification, Track,
    ACTIVE_STATUSES,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const STATE_UNKNOWN: u8 = 0;
const STATE_UP: u8 = 1;
const STATE_DOWN: u8 = 2;

/// Columns searched by the job list's free-text filter.
const SEARCH_COLUMNS: &[&str] = &["title", "title_auto", "title_manual", "label"];

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The ripping service's SQLite database, opened read-only.
///
/// Each operation opens its own connection and drops it when done, so a database that
/// appears, disappears or is replaced underneath is picked up on the next call.
#[derive(Debug)]
pub struct SqliteMirror {
    path: PathBuf,
    options: SqliteConnectOptions,
    state: AtomicU8,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl SqliteMirror {
    /// Creates a mirror for the database at `path`. Nothing is opened yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .read_only(true)
            .create_if_missing(false);

        Self {
            path,
            options,
            state: AtomicU8::new(STATE_UNKNOWN),
        }
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connect(&self) -> ArmUiResult<SqliteConnection> {
        Ok(SqliteConnection::connect_with(&self.options).await?)
    }

    async fn probe(&self) -> ArmUiResult<()> {
        let mut conn = self.connect().await?;
        sqlx::query("SELECT 1").execute(&mut conn).await?;
        conn.close().await?;
        Ok(())
    }

    fn record_state(&self, up: bool, error: Option<&dyn std::fmt::Display>) {
        let next = if up { STATE_UP } else { STATE_DOWN };
        let previous = self.state.swap(next, Ordering::Relaxed);
        if previous == next {
            return;
        }

        match (up, error) {
            (true, _) => tracing::info!("database mirror available: {}", self.path.display()),
            (false, Some(e)) => {
                tracing::warn!("database mirror unavailable: {}: {e}", self.path.display())
            }
            (false, None) => {
                tracing::warn!("database mirror unavailable: {}", self.path.display())
            }
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn push_job_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &JobQuery) {
    builder.push(" WHERE 1 = 1");

    if let Some(status) = query.status_filter() {
        builder
            .push(" AND lower(status) = ")
            .push_bind(status.to_lowercase());
    }

    if let Some(video_type) = query.video_type_filter() {
        builder
            .push(" AND lower(video_type) = ")
            .push_bind(video_type.to_lowercase());
    }

    if let Some(search) = query.search_filter() {
        // SQLite's lower() only folds ASCII, so the term is folded the same way. Non-ASCII
        // letters match case-sensitively.
        let pattern = format!("%{}%", escape_like(&search.to_ascii_lowercase()));
        builder.push(" AND (");
        for (i, column) in SEARCH_COLUMNS.iter().enumerate() {
            if i > 0 {
                builder.push(" OR ");
            }
            builder
                .push(format!("lower({column}) LIKE "))
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\'");
        }
        builder.push(")");
    }
}

/// Reads a config snapshot row into a map ordered by [`CONFIG_FIELDS`].
fn config_from_row(row: &SqliteRow) -> ConfigMap {
    CONFIG_FIELDS
        .iter()
        .filter_map(|field| {
            let value = if let Ok(v) = row.try_get::<Option<String>, _>(field.name) {
                v.map(Value::String)
            } else if let Ok(v) = row.try_get::<Option<i64>, _>(field.name) {
                v.map(Value::from)
            } else if let Ok(v) = row.try_get::<Option<f64>, _>(field.name) {
                v.map(Value::from)
            } else {
                return None;
            };
            Some((field.name.to_string(), value.unwrap_or(Value::Null)))
        })
        .collect()
}

async fn fetch_job(conn: &mut SqliteConnection, job_id: i64) -> ArmUiResult<Option<Job>> {
    let job = sqlx::query_as::<_, Job>("SELECT * FROM job WHERE job_id = ?")
        .bind(job_id)
        .fetch_optional(conn)
        .await?;
    Ok(job)
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

#[async_trait]
impl MirrorReader for SqliteMirror {
    async fn is_available(&self) -> bool {
        match self.probe().await {
            Ok(()) => {
                self.record_state(true, None);
                true
            }
            Err(e) => {
                self.record_state(false, Some(&e));
                false
            }
        }
    }

    async fn active_jobs(&self) -> ArmUiResult<Vec<ActiveJob>> {
        let mut conn = self.connect().await?;

        let mut builder = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT job.*,
                (SELECT COUNT(*) FROM track WHERE track.job_id = job.job_id) AS tracks_total,
                (SELECT COUNT(*) FROM track WHERE track.job_id = job.job_id AND track.ripped = 1) AS tracks_ripped
            FROM job
            WHERE lower(job.status) IN ("#,
        );
        let mut statuses = builder.separated(", ");
        for status in ACTIVE_STATUSES {
            statuses.push_bind(*status);
        }
        builder.push(") ORDER BY job.start_time IS NULL, job.start_time DESC, job.job_id DESC");

        let jobs = builder
            .build_query_as::<ActiveJob>()
            .fetch_all(&mut conn)
            .await?;
        Ok(jobs)
    }

    async fn jobs_page(&self, query: &JobQuery) -> ArmUiResult<(Vec<Job>, u64)> {
        let mut conn = self.connect().await?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM job");
        push_job_filters(&mut count, query);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&mut conn)
            .await?;

        let mut select = QueryBuilder::<Sqlite>::new("SELECT * FROM job");
        push_job_filters(&mut select, query);
        select
            .push(" ORDER BY start_time IS NULL, start_time DESC, job_id DESC LIMIT ")
            .push_bind(i64::from(query.per_page))
            .push(" OFFSET ")
            .push_bind(query.offset() as i64);

        let jobs = select.build_query_as::<Job>().fetch_all(&mut conn).await?;
        Ok((jobs, total.max(0) as u64))
    }

    async fn job(&self, job_id: i64) -> ArmUiResult<Option<Job>> {
        let mut conn = self.connect().await?;
        fetch_job(&mut conn, job_id).await
    }

    async fn job_tracks(&self, job_id: i64) -> ArmUiResult<Vec<Track>> {
        let mut conn = self.connect().await?;
        let tracks = sqlx::query_as::<_, Track>(
            r#"
            SELECT * FROM track
            WHERE job_id = ?
            ORDER BY CAST(track_number AS INTEGER), track_id
            "#,
        )
        .bind(job_id)
        .fetch_all(&mut conn)
        .await?;
        Ok(tracks)
    }

    async fn job_config(&self, job_id: i64) -> ArmUiResult<Option<ConfigMap>> {
        let mut conn = self.connect().await?;
        let row = sqlx::query("SELECT * FROM config WHERE job_id = ? ORDER BY CONFIG_ID DESC LIMIT 1")
            .bind(job_id)
            .fetch_optional(&mut conn)
            .await?;
        Ok(row.as_ref().map(config_from_row))
    }

    async fn latest_config(&self) -> ArmUiResult<Option<ConfigMap>> {
        let mut conn = self.connect().await?;
        let row = sqlx::query("SELECT * FROM config ORDER BY CONFIG_ID DESC LIMIT 1")
            .fetch_optional(&mut conn)
            .await?;
        Ok(row.as_ref().map(config_from_row))
    }

    async fn drives(&self) -> ArmUiResult<Vec<Drive>> {
        let mut conn = self.connect().await?;
        let mut drives = sqlx::query_as::<_, Drive>("SELECT * FROM system_drives ORDER BY name, drive_id")
            .fetch_all(&mut conn)
            .await?;

        for drive in drives.iter_mut() {
            if let Some(job_id) = drive.job_id_current {
                drive.current_job = fetch_job(&mut conn, job_id).await?;
            }
        }

        Ok(drives)
    }

    async fn notifications(&self) -> ArmUiResult<Vec<Notification>> {
        let mut conn = self.connect().await?;
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE cleared IS NULL OR cleared = 0
            ORDER BY trigger_time DESC, id DESC
            "#,
        )
        .fetch_all(&mut conn)
        .await?;
        Ok(notifications)
    }

    async fn unseen_notification_count(&self) -> ArmUiResult<i64> {
        let mut conn = self.connect().await?;
        let count = sqlx::query(
            r#"
            SELECT COUNT(*) AS unseen FROM notifications
            WHERE (seen IS NULL OR seen = 0) AND (cleared IS NULL OR cleared = 0)
            "#,
        )
        .fetch_one(&mut conn)
        .await?;
        Ok(count.get::<i64, _>("unseen"))
    }

    async fn ripping_paused(&self) -> ArmUiResult<bool> {
        let mut conn = self.connect().await?;
        let paused = sqlx::query("SELECT ripping_paused FROM app_state WHERE id = 1")
            .fetch_optional(&mut conn)
            .await?
            .and_then(|row| row.get::<Option<bool>, _>("ripping_paused"))
            .unwrap_or(false);
        Ok(paused)
    }
}
