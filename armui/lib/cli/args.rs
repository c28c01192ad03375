use std::path::PathBuf;

use clap::Parser;

use super::styles;
use crate::config::{
    DEFAULT_ARM_CONFIG_PATH, DEFAULT_ARM_DB_PATH, DEFAULT_ARM_LOG_PATH, DEFAULT_ARM_URL,
    DEFAULT_HB_PRESETS_PATH, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TRANSCODER_URL,
};

//-------------------------------------------------------------------------------------------------
// Types
//-------------------------------------------------------------------------------------------------

/// ARM UI - dashboard backend for the Automatic Ripping Machine
#[derive(Debug, Parser)]
#[command(name = "armui", author, about, version, styles=styles::styles())]
pub struct ArmUiArgs {
    /// Path to the ripping service's SQLite database
    #[arg(long, env = "ARM_UI_ARM_DB_PATH", default_value = DEFAULT_ARM_DB_PATH)]
    pub arm_db_path: PathBuf,

    /// Directory holding the ripping service's logs
    #[arg(long, env = "ARM_UI_ARM_LOG_PATH", default_value = DEFAULT_ARM_LOG_PATH)]
    pub arm_log_path: PathBuf,

    /// Path to arm.yaml
    #[arg(long, env = "ARM_UI_ARM_CONFIG_PATH", default_value = DEFAULT_ARM_CONFIG_PATH)]
    pub arm_config_path: PathBuf,

    /// Directory of per-job progress files [default: <arm-log-path>/progress]
    #[arg(long, env = "ARM_UI_PROGRESS_PATH")]
    pub progress_path: Option<PathBuf>,

    /// Path to the JSON list of HandBrake presets
    #[arg(long, env = "ARM_UI_HB_PRESETS_PATH", default_value = DEFAULT_HB_PRESETS_PATH)]
    pub hb_presets_path: PathBuf,

    /// Base URL of the ripping service
    #[arg(long, env = "ARM_UI_ARM_URL", default_value = DEFAULT_ARM_URL)]
    pub arm_url: String,

    /// Base URL of the transcoding service
    #[arg(long, env = "ARM_UI_TRANSCODER_URL", default_value = DEFAULT_TRANSCODER_URL)]
    pub transcoder_url: String,

    /// API key for the transcoding service
    #[arg(long, env = "ARM_UI_TRANSCODER_API_KEY", hide_env_values = true)]
    pub transcoder_api_key: Option<String>,

    /// Shared secret for transcoder webhooks
    #[arg(long, env = "ARM_UI_TRANSCODER_WEBHOOK_SECRET", hide_env_values = true)]
    pub transcoder_webhook_secret: Option<String>,

    /// Address to bind
    #[arg(long, env = "ARM_UI_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "ARM_UI_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
