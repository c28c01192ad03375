//! HTTP request handlers for the REST API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::{
    logs::{validate_lines, LogContent, LogFileInfo, LogReadQuery, StructuredLog, StructuredLogQuery},
    management::{
        self, DashboardResponse, HardwareSnapshot, JobProgress, QueuedTranscode, SettingsResponse,
        SystemInfo, UI_VERSION,
    },
    metadata::{MediaDetail, MusicDetail, MusicSearchPage, MusicSearchQuery, SearchResult},
    mirror::{Drive, JobDetail, JobPage, JobQuery, Notification},
    upstream::{ConnectionTest, CrcLookup, JobAction, TranscoderJobQuery, WebhookTest},
    ArmUiError,
};

use super::{
    ApiError, ApiResult, HealthResponse, MetadataSearchQuery, RippingEnabledRequest, ServerState,
    StatusResponse, TranscoderJobsResponse, TranscoderStatsResponse, WebhookTestRequest,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const ARM: &str = "ARM";

const TRANSCODER: &str = "Transcoder";

const JOB_NOT_FOUND: &str = "Job not found";

//--------------------------------------------------------------------------------------------------
// Functions: Handlers
//--------------------------------------------------------------------------------------------------

/// `GET /api/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: UI_VERSION,
    })
}

/// `GET /api/dashboard`
pub async fn dashboard(State(state): State<ServerState>) -> Json<DashboardResponse> {
    Json(
        management::dashboard(
            state.get_mirror().as_ref(),
            state.get_arm(),
            state.get_transcoder(),
            state.get_hardware(),
        )
        .await,
    )
}

/// `GET /api/jobs`
pub async fn list_jobs(
    State(state): State<ServerState>,
    Query(query): Query<JobQuery>,
) -> ApiResult<Json<JobPage>> {
    Ok(Json(
        management::list_jobs(state.get_mirror().as_ref(), &query).await?,
    ))
}

/// `GET /api/jobs/{id}`
pub async fn get_job(
    State(state): State<ServerState>,
    Path(job_id): Path<i64>,
) -> ApiResult<Json<JobDetail>> {
    management::job_detail(state.get_mirror().as_ref(), job_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(JOB_NOT_FOUND))
}

/// `GET /api/jobs/{id}/progress`
pub async fn job_progress(
    State(state): State<ServerState>,
    Path(job_id): Path<i64>,
) -> ApiResult<Json<JobProgress>> {
    management::job_progress(state.get_mirror().as_ref(), state.get_progress(), job_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(JOB_NOT_FOUND))
}

/// `GET /api/jobs/{id}/crc-lookup`
pub async fn crc_lookup(
    State(state): State<ServerState>,
    Path(job_id): Path<i64>,
) -> ApiResult<Json<CrcLookup>> {
    management::crc_lookup(
        state.get_mirror().as_ref(),
        state.get_crc(),
        state.get_settings().get_arm_config_path(),
        job_id,
    )
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::not_found(JOB_NOT_FOUND))
}

/// `POST /api/jobs/{id}/retranscode`
pub async fn retranscode_job(
    State(state): State<ServerState>,
    Path(job_id): Path<i64>,
) -> ApiResult<Json<QueuedTranscode>> {
    Ok(Json(
        management::retranscode_job(state.get_mirror().as_ref(), state.get_transcoder(), job_id)
            .await?,
    ))
}

/// `POST /api/jobs/{id}/{action}`
pub async fn job_action(
    State(state): State<ServerState>,
    Path((job_id, action)): Path<(i64, JobAction)>,
) -> ApiResult<Json<Value>> {
    tracing::info!("job {job_id}: {}", action.path_segment());
    Ok(Json(
        state
            .get_arm()
            .job_action(job_id, action)
            .await
            .into_result(ARM)?,
    ))
}

/// `DELETE /api/jobs/{id}`
pub async fn delete_job(
    State(state): State<ServerState>,
    Path(job_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    tracing::info!("job {job_id}: delete");
    Ok(Json(
        state.get_arm().delete_job(job_id).await.into_result(ARM)?,
    ))
}

/// `PUT /api/jobs/{id}/title`
pub async fn update_title(
    State(state): State<ServerState>,
    Path(job_id): Path<i64>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        state
            .get_arm()
            .update_title(job_id, &body)
            .await
            .into_result(ARM)?,
    ))
}

/// `PATCH /api/jobs/{id}/config`
pub async fn update_job_config(
    State(state): State<ServerState>,
    Path(job_id): Path<i64>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        state
            .get_arm()
            .update_job_config(job_id, &body)
            .await
            .into_result(ARM)?,
    ))
}

/// `POST /api/system/ripping-enabled`
pub async fn set_ripping_enabled(
    State(state): State<ServerState>,
    Json(request): Json<RippingEnabledRequest>,
) -> ApiResult<Json<Value>> {
    tracing::info!("setting ripping enabled to {}", request.enabled);
    Ok(Json(
        state
            .get_arm()
            .set_ripping_enabled(request.enabled)
            .await
            .into_result(ARM)?,
    ))
}

/// `GET /api/metadata/search`
pub async fn search_metadata(
    State(state): State<ServerState>,
    Query(query): Query<MetadataSearchQuery>,
) -> ApiResult<Json<Vec<SearchResult>>> {
    let q = require_query(&query.q)?;
    Ok(Json(
        state
            .get_metadata()
            .search(q, query.year.as_deref())
            .await?,
    ))
}

/// `GET /api/metadata/{imdb_id}`
pub async fn get_media_detail(
    State(state): State<ServerState>,
    Path(imdb_id): Path<String>,
) -> ApiResult<Json<MediaDetail>> {
    state
        .get_metadata()
        .get_details(&imdb_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Title not found"))
}

/// `GET /api/metadata/music/search`
pub async fn search_music(
    State(state): State<ServerState>,
    Query(query): Query<MusicSearchQuery>,
) -> ApiResult<Json<MusicSearchPage>> {
    require_query(&query.q)?;
    Ok(Json(state.get_music().search(&query).await?))
}

/// `GET /api/metadata/music/{release_id}`
pub async fn get_music_detail(
    State(state): State<ServerState>,
    Path(release_id): Path<String>,
) -> ApiResult<Json<MusicDetail>> {
    state
        .get_music()
        .get_details(&release_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Release not found"))
}

/// `GET /api/logs`
pub async fn list_logs(State(state): State<ServerState>) -> ApiResult<Json<Vec<LogFileInfo>>> {
    Ok(Json(state.get_logs().list().await?))
}

/// `GET /api/logs/{filename}`
pub async fn read_log(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
    Query(query): Query<LogReadQuery>,
) -> ApiResult<Json<LogContent>> {
    state
        .get_logs()
        .read(&filename, &query)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Log file not found"))
}

/// `GET /api/logs/{filename}/structured`
pub async fn read_structured_log(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
    Query(query): Query<StructuredLogQuery>,
) -> ApiResult<Json<StructuredLog>> {
    state
        .get_logs()
        .read_structured(&filename, &query)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Log file not found"))
}

/// `GET /api/drives`
pub async fn list_drives(State(state): State<ServerState>) -> ApiResult<Json<Vec<Drive>>> {
    Ok(Json(state.get_mirror().drives().await?))
}

/// `PATCH /api/drives/{id}`
pub async fn update_drive(
    State(state): State<ServerState>,
    Path(drive_id): Path<i64>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        state
            .get_arm()
            .update_drive(drive_id, &body)
            .await
            .into_result(ARM)?,
    ))
}

/// `GET /api/notifications`
pub async fn list_notifications(
    State(state): State<ServerState>,
) -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(state.get_mirror().notifications().await?))
}

/// `GET /api/settings`
pub async fn get_settings(State(state): State<ServerState>) -> Json<SettingsResponse> {
    Json(
        management::settings_overview(
            state.get_resolver(),
            state.get_arm(),
            state.get_transcoder(),
            state.get_settings().get_hb_presets_path(),
        )
        .await,
    )
}

/// `PUT /api/settings/arm`
pub async fn save_arm_settings(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        management::save_arm_config(state.get_arm(), state.get_keys(), &body).await?,
    ))
}

/// `PATCH /api/settings/transcoder`
pub async fn save_transcoder_settings(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        management::save_transcoder_config(state.get_transcoder(), &body).await?,
    ))
}

/// `POST /api/settings/transcoder/test-connection`
pub async fn test_transcoder_connection(State(state): State<ServerState>) -> Json<ConnectionTest> {
    Json(state.get_transcoder().test_connection().await)
}

/// `POST /api/settings/transcoder/test-webhook`
pub async fn test_transcoder_webhook(
    State(state): State<ServerState>,
    Json(request): Json<WebhookTestRequest>,
) -> Json<WebhookTest> {
    Json(
        state
            .get_transcoder()
            .test_webhook(request.webhook_secret.as_deref())
            .await,
    )
}

/// `GET /api/system/info`
pub async fn system_info(State(state): State<ServerState>) -> Json<SystemInfo> {
    Json(
        management::system_info(
            state.get_mirror().as_ref(),
            state.get_arm(),
            state.get_transcoder(),
            state.get_settings().get_arm_db_path(),
        )
        .await,
    )
}

/// `POST /api/system/hardware/refresh`
pub async fn refresh_hardware(State(state): State<ServerState>) -> Json<HardwareSnapshot> {
    Json(
        management::refresh_hardware(state.get_hardware(), state.get_arm(), state.get_transcoder())
            .await,
    )
}

/// `GET /api/transcoder/stats`
pub async fn transcoder_stats(State(state): State<ServerState>) -> Json<TranscoderStatsResponse> {
    let stats = state.get_transcoder().stats().await.ok();
    Json(TranscoderStatsResponse {
        online: stats.is_some(),
        stats,
    })
}

/// `GET /api/transcoder/jobs`
pub async fn transcoder_jobs(
    State(state): State<ServerState>,
    Query(query): Query<TranscoderJobQuery>,
) -> Json<TranscoderJobsResponse> {
    let Some(mut body) = state.get_transcoder().jobs(&query).await.ok() else {
        return Json(TranscoderJobsResponse {
            jobs: Vec::new(),
            total: 0,
        });
    };

    let jobs = match body.get_mut("jobs").map(Value::take) {
        Some(Value::Array(jobs)) => jobs,
        _ => Vec::new(),
    };
    Json(TranscoderJobsResponse {
        jobs,
        total: body["total"].as_u64().unwrap_or(0),
    })
}

/// `POST /api/transcoder/jobs/{id}/retry`
pub async fn retry_transcoder_job(
    State(state): State<ServerState>,
    Path(job_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    Ok(Json(
        state
            .get_transcoder()
            .retry_job(job_id)
            .await
            .into_result(TRANSCODER)?,
    ))
}

/// `DELETE /api/transcoder/jobs/{id}`
pub async fn delete_transcoder_job(
    State(state): State<ServerState>,
    Path(job_id): Path<i64>,
) -> ApiResult<Json<StatusResponse>> {
    state
        .get_transcoder()
        .delete_job(job_id)
        .await
        .into_result(TRANSCODER)?;
    Ok(Json(StatusResponse::deleted()))
}

/// `POST /api/transcoder/jobs/{id}/retranscode`
pub async fn retranscode_transcoder_job(
    State(state): State<ServerState>,
    Path(job_id): Path<i64>,
) -> ApiResult<Json<QueuedTranscode>> {
    Ok(Json(
        management::retranscode_transcoder_job(state.get_transcoder(), job_id).await?,
    ))
}

/// `GET /api/transcoder/logs`
pub async fn transcoder_logs(State(state): State<ServerState>) -> Json<Value> {
    Json(
        state
            .get_transcoder()
            .logs()
            .await
            .ok()
            .unwrap_or_else(|| Value::Array(Vec::new())),
    )
}

/// `GET /api/transcoder/logs/{filename}`
pub async fn read_transcoder_log(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
    Query(query): Query<LogReadQuery>,
) -> ApiResult<Json<Value>> {
    validate_lines(query.lines)?;
    state
        .get_transcoder()
        .read_log(&filename, &query)
        .await
        .ok()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Log not found or transcoder offline"))
}

/// `GET /api/transcoder/logs/{filename}/structured`
pub async fn read_transcoder_structured_log(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
    Query(query): Query<StructuredLogQuery>,
) -> ApiResult<Json<Value>> {
    validate_lines(query.lines)?;
    state
        .get_transcoder()
        .read_structured_log(&filename, &query)
        .await
        .ok()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Log not found or transcoder offline"))
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn require_query(q: &str) -> Result<&str, ArmUiError> {
    let q = q.trim();
    if q.is_empty() {
        return Err(ArmUiError::InvalidArgument("q must not be empty".to_string()));
    }
    Ok(q)
}
