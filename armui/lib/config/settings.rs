use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
};

use getset::Getters;
use typed_builder::TypedBuilder;

use crate::{cli::ArmUiArgs, ArmUiError, ArmUiResult};

use super::{
    DEFAULT_ARM_CONFIG_PATH, DEFAULT_ARM_DB_PATH, DEFAULT_ARM_LOG_PATH, DEFAULT_ARM_URL,
    DEFAULT_HB_PRESETS_PATH, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TRANSCODER_URL, PROGRESS_SUBDIR,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Process-wide settings for the dashboard backend.
#[derive(Debug, Clone, Getters, TypedBuilder)]
#[getset(get = "pub with_prefix")]
pub struct Settings {
    /// Path to the ripping service's SQLite database, opened read-only.
    #[builder(default = PathBuf::from(DEFAULT_ARM_DB_PATH), setter(into))]
    arm_db_path: PathBuf,

    /// Directory holding the ripping service's log files.
    #[builder(default = PathBuf::from(DEFAULT_ARM_LOG_PATH), setter(into))]
    arm_log_path: PathBuf,

    /// Path to the ripping service's `arm.yaml`.
    #[builder(default = PathBuf::from(DEFAULT_ARM_CONFIG_PATH), setter(into))]
    arm_config_path: PathBuf,

    /// Directory of per-job progress files. Defaults to `<log path>/progress`.
    #[builder(default, setter(strip_option, into))]
    progress_path: Option<PathBuf>,

    /// Path to the JSON list of HandBrake presets.
    #[builder(default = PathBuf::from(DEFAULT_HB_PRESETS_PATH), setter(into))]
    hb_presets_path: PathBuf,

    /// Base URL of the ripping service.
    #[builder(default = DEFAULT_ARM_URL.to_string(), setter(into))]
    arm_url: String,

    /// Base URL of the transcoding service.
    #[builder(default = DEFAULT_TRANSCODER_URL.to_string(), setter(into))]
    transcoder_url: String,

    /// API key sent to the transcoding service.
    #[builder(default, setter(strip_option, into))]
    transcoder_api_key: Option<String>,

    /// Shared secret sent with webhook deliveries.
    #[builder(default, setter(strip_option, into))]
    transcoder_webhook_secret: Option<String>,

    /// Address to bind.
    #[builder(default = DEFAULT_HOST.to_string(), setter(into))]
    host: String,

    /// Port to listen on.
    #[builder(default = DEFAULT_PORT)]
    port: u16,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Settings {
    /// Builds settings from parsed command-line arguments.
    pub fn from_args(args: &ArmUiArgs) -> Self {
        Self {
            arm_db_path: args.arm_db_path.clone(),
            arm_log_path: args.arm_log_path.clone(),
            arm_config_path: args.arm_config_path.clone(),
            progress_path: args.progress_path.clone(),
            hb_presets_path: args.hb_presets_path.clone(),
            arm_url: args.arm_url.clone(),
            transcoder_url: args.transcoder_url.clone(),
            transcoder_api_key: non_empty(args.transcoder_api_key.as_deref()),
            transcoder_webhook_secret: non_empty(args.transcoder_webhook_secret.as_deref()),
            host: args.host.clone(),
            port: args.port,
        }
    }

    /// The directory holding per-job progress files.
    pub fn progress_dir(&self) -> PathBuf {
        self.progress_path
            .clone()
            .unwrap_or_else(|| self.arm_log_path.join(PROGRESS_SUBDIR))
    }

    /// The socket address to bind.
    pub fn addr(&self) -> ArmUiResult<SocketAddr> {
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        let ip: IpAddr = host
            .parse()
            .map_err(|e| ArmUiError::InvalidArgument(format!("bad listen address: {e}")))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
