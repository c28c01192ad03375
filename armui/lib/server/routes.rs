//! Route definitions for the HTTP server.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use super::{handlers, state::ServerState};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates a new router with all API endpoints configured.
///
/// ## Arguments
/// * `state` - The shared server state
pub fn create_router(state: ServerState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/dashboard", get(handlers::dashboard))
        // Jobs
        .route("/api/jobs", get(handlers::list_jobs))
        .route(
            "/api/jobs/{id}",
            get(handlers::get_job).delete(handlers::delete_job),
        )
        .route("/api/jobs/{id}/progress", get(handlers::job_progress))
        .route("/api/jobs/{id}/crc-lookup", get(handlers::crc_lookup))
        .route("/api/jobs/{id}/retranscode", post(handlers::retranscode_job))
        .route("/api/jobs/{id}/title", put(handlers::update_title))
        .route(
            "/api/jobs/{id}/config",
            patch(handlers::update_job_config),
        )
        .route("/api/jobs/{id}/{action}", post(handlers::job_action))
        // Metadata
        .route("/api/metadata/search", get(handlers::search_metadata))
        .route("/api/metadata/music/search", get(handlers::search_music))
        .route(
            "/api/metadata/music/{release_id}",
            get(handlers::get_music_detail),
        )
        .route("/api/metadata/{imdb_id}", get(handlers::get_media_detail))
        // Logs
        .route("/api/logs", get(handlers::list_logs))
        .route("/api/logs/{filename}", get(handlers::read_log))
        .route(
            "/api/logs/{filename}/structured",
            get(handlers::read_structured_log),
        )
        // Drives and notifications
        .route("/api/drives", get(handlers::list_drives))
        .route(
            "/api/drives/{id}",
            patch(handlers::update_drive),
        )
        .route("/api/notifications", get(handlers::list_notifications))
        // Settings
        .route("/api/settings", get(handlers::get_settings))
        .route(
            "/api/settings/arm",
            put(handlers::save_arm_settings),
        )
        .route(
            "/api/settings/transcoder",
            patch(handlers::save_transcoder_settings),
        )
        .route(
            "/api/settings/transcoder/test-connection",
            post(handlers::test_transcoder_connection),
        )
        .route(
            "/api/settings/transcoder/test-webhook",
            post(handlers::test_transcoder_webhook),
        )
        // System
        .route(
            "/api/system/ripping-enabled",
            post(handlers::set_ripping_enabled),
        )
        .route("/api/system/info", get(handlers::system_info))
        .route(
            "/api/system/hardware/refresh",
            post(handlers::refresh_hardware),
        )
        // Transcoder
        .route("/api/transcoder/stats", get(handlers::transcoder_stats))
        .route("/api/transcoder/jobs", get(handlers::transcoder_jobs))
        .route(
            "/api/transcoder/jobs/{id}",
            delete(handlers::delete_transcoder_job),
        )
        .route(
            "/api/transcoder/jobs/{id}/retry",
            post(handlers::retry_transcoder_job),
        )
        .route(
            "/api/transcoder/jobs/{id}/retranscode",
            post(handlers::retranscode_transcoder_job),
        )
        .route("/api/transcoder/logs", get(handlers::transcoder_logs))
        .route(
            "/api/transcoder/logs/{filename}",
            get(handlers::read_transcoder_log),
        )
        .route(
            "/api/transcoder/logs/{filename}/structured",
            get(handlers::read_transcoder_structured_log),
        )
        .with_state(state)
}
