use std::time::Duration;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Default location of the ripping service's SQLite database.
pub const DEFAULT_ARM_DB_PATH: &str = "/home/arm/db/arm.db";

/// Default directory holding the ripping service's log files.
pub const DEFAULT_ARM_LOG_PATH: &str = "/home/arm/logs";

/// Default location of the ripping service's main configuration file.
pub const DEFAULT_ARM_CONFIG_PATH: &str = "/etc/arm/config/arm.yaml";

/// Default location of the HandBrake presets list.
pub const DEFAULT_HB_PRESETS_PATH: &str = "/etc/arm/config/hb_presets.json";

/// Name of the progress directory inside the log directory.
pub const PROGRESS_SUBDIR: &str = "progress";

/// Default base URL of the ripping service.
pub const DEFAULT_ARM_URL: &str = "http://localhost:8080";

/// Default base URL of the transcoding service.
pub const DEFAULT_TRANSCODER_URL: &str = "http://localhost:5000";

/// Default address the server binds to.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port the server listens on.
pub const DEFAULT_PORT: u16 = 8888;

/// Connect timeout shared by every upstream HTTP client.
pub const UPSTREAM_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Total request timeout for the ripping service.
pub const ARM_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Total request timeout for the transcoding service.
pub const TRANSCODER_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Total request timeout for third-party metadata providers.
pub const METADATA_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The value substituted for sensitive configuration values.
pub const MASK_TOKEN: &str = "***";
