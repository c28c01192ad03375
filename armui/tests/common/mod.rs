#![allow(dead_code)]

use std::{path::Path, sync::Arc};

use armui::{
    config::Settings,
    metadata::MetadataEndpoints,
    mirror::SqliteMirror,
    server::ServerState,
};
use axum::Router;
use sqlx::{sqlite::SqliteConnectOptions, Connection, SqliteConnection};
use tokio::net::TcpListener;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// A local port nothing listens on.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9";

const SCHEMA: &str = r#"
CREATE TABLE job (
    job_id INTEGER PRIMARY KEY,
    arm_version TEXT,
    crc_id TEXT,
    logfile TEXT,
    start_time DATETIME,
    stop_time DATETIME,
    status TEXT,
    stage TEXT,
    title TEXT,
    title_auto TEXT,
    title_manual TEXT,
    year TEXT,
    year_auto TEXT,
    video_type TEXT,
    video_type_auto TEXT,
    imdb_id TEXT,
    poster_url TEXT,
    devpath TEXT,
    mountpoint TEXT,
    hasnicetitle BOOLEAN,
    disctype TEXT,
    label TEXT,
    path TEXT,
    raw_path TEXT,
    ejected BOOLEAN
);

CREATE TABLE track (
    track_id INTEGER PRIMARY KEY,
    job_id INTEGER,
    track_number TEXT,
    length INTEGER,
    main_feature BOOLEAN,
    filename TEXT,
    ripped BOOLEAN,
    status TEXT
);

CREATE TABLE config (
    CONFIG_ID INTEGER PRIMARY KEY,
    job_id INTEGER,
    RIPMETHOD TEXT,
    MINLENGTH INTEGER,
    OMDB_API_KEY TEXT,
    PB_KEY TEXT
);

CREATE TABLE system_drives (
    drive_id INTEGER PRIMARY KEY,
    name TEXT,
    mount TEXT,
    job_id_current INTEGER,
    job_id_previous INTEGER,
    description TEXT,
    stale BOOLEAN
);

CREATE TABLE notifications (
    id INTEGER PRIMARY KEY,
    title TEXT,
    message TEXT,
    trigger_time DATETIME,
    seen BOOLEAN,
    cleared BOOLEAN
);

CREATE TABLE app_state (
    id INTEGER PRIMARY KEY,
    ripping_paused BOOLEAN
);
"#;

const FIXTURES: &str = r#"
INSERT INTO job (job_id, start_time, status, title, title_auto, label, video_type, disctype, crc_id, devpath, mountpoint, raw_path)
VALUES
    (1, '2024-05-01 10:00:00', 'success', 'Serenity', 'Serenity', 'SERENITY', 'movie', 'bluray', 'abc123', '/dev/sr0', '/mnt/dev/sr0', '/home/arm/raw/Serenity'),
    (2, '2024-05-02 10:00:00', 'fail', 'Firefly', 'Firefly', 'FIREFLY_D1', 'series', 'dvd', NULL, '/dev/sr1', '/mnt/dev/sr1', NULL),
    (3, '2024-05-03 10:00:00', 'active', 'The Matrix', 'The Matrix', 'MATRIX', 'movie', 'dvd', NULL, '/dev/sr0', '/mnt/dev/sr0', NULL),
    (4, '2024-05-04 10:00:00', 'success', '100% Pure', '100% Pure', 'PURE', 'movie', 'dvd', NULL, '/dev/sr1', '/mnt/dev/sr1', NULL),
    (5, NULL, 'success', 'Undated', NULL, 'UNDATED', 'music', 'music', NULL, '/dev/sr1', '/mnt/dev/sr1', NULL),
    (6, '2024-05-05 10:00:00', 'Transcoding', 'Matrix Reloaded', NULL, 'MATRIX_2', 'movie', 'bluray', NULL, '/dev/sr1', '/mnt/dev/sr1', NULL);

INSERT INTO track (track_id, job_id, track_number, length, main_feature, filename, ripped, status)
VALUES
    (1, 3, '0', 7200, 1, 'title_t00.mkv', 1, 'success'),
    (2, 3, '1', 300, 0, 'title_t01.mkv', 0, 'pending'),
    (3, 3, '2', 120, 0, 'title_t02.mkv', 0, 'pending'),
    (4, 1, '0', 7000, 1, 'title_t00.mkv', 1, 'success');

INSERT INTO config (CONFIG_ID, job_id, RIPMETHOD, MINLENGTH, OMDB_API_KEY, PB_KEY)
VALUES
    (1, 1, 'mkv', 600, 'omdb-secret', ''),
    (2, 3, 'backup', 900, 'omdb-newer', NULL);

INSERT INTO system_drives (drive_id, name, mount, job_id_current, job_id_previous, description, stale)
VALUES
    (1, 'Drive B', '/dev/sr1', NULL, 2, 'USB drive', 0),
    (2, 'Drive A', '/dev/sr0', 3, 1, 'Internal drive', 0);

INSERT INTO notifications (id, title, message, trigger_time, seen, cleared)
VALUES
    (1, 'Rip complete', 'Serenity finished', '2024-05-01 12:00:00', 1, 0),
    (2, 'Rip failed', 'Firefly failed', '2024-05-02 12:00:00', 0, 0),
    (3, 'Old news', 'cleared away', '2024-04-01 12:00:00', 0, 1),
    (4, 'Rip started', 'The Matrix started', '2024-05-03 10:00:00', NULL, NULL);

INSERT INTO app_state (id, ripping_paused) VALUES (1, 1);
"#;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates the ripping database at `path` with the standard fixture rows.
pub async fn seed_database(path: &Path) -> anyhow::Result<()> {
    create_database(path, &[SCHEMA, FIXTURES]).await
}

/// Creates the ripping database at `path` with the fixture rows plus `extra`.
pub async fn seed_database_with(path: &Path, extra: &str) -> anyhow::Result<()> {
    create_database(path, &[SCHEMA, FIXTURES, extra]).await
}

/// Creates the ripping database at `path` with tables but no rows.
pub async fn seed_empty_database(path: &Path) -> anyhow::Result<()> {
    create_database(path, &[SCHEMA]).await
}

async fn create_database(path: &Path, scripts: &[&str]) -> anyhow::Result<()> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&options).await?;
    for script in scripts {
        sqlx::raw_sql(script).execute(&mut conn).await?;
    }
    conn.close().await?;
    Ok(())
}

/// A read-only mirror over a freshly seeded database in `dir`.
pub async fn seeded_mirror(dir: &Path) -> anyhow::Result<SqliteMirror> {
    let path = dir.join("arm.db");
    seed_database(&path).await?;
    Ok(SqliteMirror::new(path))
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_stub(router: Router) -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{addr}"))
}

/// Server state rooted in `dir`, talking to the given upstream URLs.
pub fn test_state(
    dir: &Path,
    arm_url: &str,
    transcoder_url: &str,
    endpoints: MetadataEndpoints,
    crc_url: &str,
) -> anyhow::Result<ServerState> {
    let settings = Settings::builder()
        .arm_db_path(dir.join("arm.db"))
        .arm_log_path(dir.join("logs"))
        .arm_config_path(dir.join("arm.yaml"))
        .hb_presets_path(dir.join("presets.json"))
        .arm_url(arm_url)
        .transcoder_url(transcoder_url)
        .build();

    let mirror = Arc::new(SqliteMirror::new(dir.join("arm.db")));
    Ok(ServerState::with_dependencies(
        settings, mirror, endpoints, crc_url,
    )?)
}

/// Metadata endpoints that all point at `base`.
pub fn endpoints_at(base: &str) -> MetadataEndpoints {
    MetadataEndpoints::builder()
        .omdb(format!("{base}/omdb/"))
        .tmdb(format!("{base}/tmdb"))
        .tmdb_images(format!("{base}/images"))
        .musicbrainz(format!("{base}/mb"))
        .cover_art(format!("{base}/caa"))
        .build()
}
