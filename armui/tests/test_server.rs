mod common;

use armui::{metadata::MetadataEndpoints, server::serve_on};
use axum::{
    extract::Path,
    routing::{get, post},
    Json, Router,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, sync::oneshot};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A running server and what it needs to stay alive.
struct TestServer {
    base: String,
    client: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    _dir: TempDir,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl TestServer {
    async fn start(seed: bool, arm_url: &str) -> anyhow::Result<Self> {
        let dir = tempdir()?;
        if seed {
            common::seed_database(&dir.path().join("arm.db")).await?;
        }

        let logs = dir.path().join("logs");
        tokio::fs::create_dir_all(&logs).await?;
        tokio::fs::write(
            logs.join("arm.log"),
            "02-28-2026 04:59:00 ARM: WARNING: Disc is dirty\n02-28-2026 04:59:16 ARM: INFO: Ripping complete\n",
        )
        .await?;
        tokio::fs::write(dir.path().join("secret.log"), "nope\n").await?;

        let state = common::test_state(
            dir.path(),
            arm_url,
            common::UNREACHABLE_URL,
            MetadataEndpoints::builder()
                .omdb(format!("{}/", common::UNREACHABLE_URL))
                .build(),
            common::UNREACHABLE_URL,
        )?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base = format!("http://{}", listener.local_addr()?);
        let (tx, rx) = oneshot::channel();
        tokio::spawn(serve_on(listener, state, async move {
            let _ = rx.await;
        }));

        Ok(Self {
            base,
            client: reqwest::Client::new(),
            shutdown: Some(tx),
            _dir: dir,
        })
    }

    async fn get(&self, path: &str) -> anyhow::Result<(StatusCode, Value)> {
        let response = self.client.get(format!("{}{path}", self.base)).send().await?;
        Ok((response.status(), response.json().await?))
    }

    async fn post(&self, path: &str, body: Value) -> anyhow::Result<(StatusCode, Value)> {
        let response = self
            .client
            .post(format!("{}{path}", self.base))
            .json(&body)
            .send()
            .await?;
        Ok((response.status(), response.json().await?))
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn arm_stub() -> Router {
    Router::new()
        .route(
            "/api/v1/jobs/{id}/{action}",
            post(|Path((id, action)): Path<(i64, String)>| async move {
                if action == "abandon" {
                    return Json(json!({ "success": false, "error": "Job is not running" }));
                }
                Json(json!({ "success": true, "job_id": id }))
            }),
        )
        .route(
            "/api/v1/system/ripping-enabled",
            post(|Json(body): Json<Value>| async move {
                Json(json!({ "success": true, "enabled": body["enabled"] }))
            }),
        )
        .route(
            "/api/v1/system/version",
            get(|| async { Json(json!({ "arm_version": "2.10.1" })) }),
        )
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[test_log::test(tokio::test)]
async fn test_server_health() -> anyhow::Result<()> {
    let server = TestServer::start(false, common::UNREACHABLE_URL).await?;

    let (status, body) = server.get("/api/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_server_jobs() -> anyhow::Result<()> {
    let server = TestServer::start(true, common::UNREACHABLE_URL).await?;

    let (status, body) = server
        .get("/api/jobs?status=active&search=matrix&page=1&per_page=25")
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["pages"], 1);
    assert_eq!(body["jobs"][0]["title"], "The Matrix");

    let (status, body) = server.get("/api/jobs?per_page=0").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");
    assert_eq!(body["code"], 400);

    let (status, body) = server.get("/api/jobs/1").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["config"]["OMDB_API_KEY"], "***");

    let (status, body) = server.get("/api/jobs/404").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Job not found");
    assert_eq!(body["error_type"], "not_found");

    let (status, body) = server.get("/api/jobs/3/progress").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tracks_total"], 3);
    assert_eq!(body["progress"], Value::Null);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_server_missing_database() -> anyhow::Result<()> {
    let server = TestServer::start(false, common::UNREACHABLE_URL).await?;

    let (status, body) = server.get("/api/jobs").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jobs"], json!([]));

    let (status, body) = server.get("/api/drives").await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["detail"], "ARM database is unavailable");

    let (status, body) = server.get("/api/dashboard").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["db_available"], false);
    assert_eq!(body["arm_online"], false);
    assert_eq!(body["drives_online"], 0);

    let (status, body) = server.get("/api/system/info").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reachability"]["database"], false);
    assert_eq!(body["database"]["size_bytes"], Value::Null);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_server_job_actions_map_upstream_outcomes() -> anyhow::Result<()> {
    let arm = common::spawn_stub(arm_stub()).await?;
    let server = TestServer::start(true, &arm).await?;

    let (status, body) = server.post("/api/jobs/3/pause", json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job_id"], 3);

    let (status, body) = server.post("/api/jobs/3/abandon", json!({})).await?;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["detail"], "Job is not running");
    assert_eq!(body["error_type"], "upstream_failed");

    let (status, body) = server
        .post("/api/system/ripping-enabled", json!({ "enabled": false }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enabled"], false);

    let offline = TestServer::start(true, common::UNREACHABLE_URL).await?;
    let (status, body) = offline.post("/api/jobs/3/pause", json!({})).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error_type"], "upstream_unavailable");

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_server_metadata_errors() -> anyhow::Result<()> {
    let server = TestServer::start(false, common::UNREACHABLE_URL).await?;

    let (status, body) = server.get("/api/metadata/search?q=%20").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");

    let (status, body) = server.get("/api/metadata/search?q=Serenity").await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error_type"], "configuration_error");

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_server_logs() -> anyhow::Result<()> {
    let server = TestServer::start(false, common::UNREACHABLE_URL).await?;

    let (status, body) = server.get("/api/logs").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["filename"], "arm.log");

    let (status, body) = server.get("/api/logs/arm.log?mode=tail&lines=1").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lines"], 1);
    assert_eq!(body["content"], "02-28-2026 04:59:16 ARM: INFO: Ripping complete\n");

    let (status, body) = server.get("/api/logs/arm.log/structured?level=warning").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"][0]["event"], "Disc is dirty");

    let (status, _) = server.get("/api/logs/..%2Fsecret.log").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server.get("/api/logs/arm.log?lines=0").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server.get("/api/transcoder/logs/worker.log").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Log not found or transcoder offline");

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_server_transcoder_offline() -> anyhow::Result<()> {
    let server = TestServer::start(false, common::UNREACHABLE_URL).await?;

    let (status, body) = server.get("/api/transcoder/stats").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["online"], false);

    let (status, body) = server.get("/api/transcoder/jobs").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jobs"], json!([]));
    assert_eq!(body["total"], 0);

    let (status, body) = server
        .post("/api/settings/transcoder/test-connection", json!({}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reachable"], false);

    Ok(())
}
