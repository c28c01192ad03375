//! Shared server state.

use std::sync::Arc;

use getset::Getters;

use crate::{
    config::{ConfigResolver, Settings},
    logs::LogReader,
    metadata::{MetadataEndpoints, MetadataKeyCache, MetadataService, MusicBrainzClient},
    mirror::{MirrorReader, SqliteMirror},
    progress::ProgressReader,
    upstream::{ArmClient, CrcClient, HardwareCache, TranscoderClient, DEFAULT_CRC_DB_URL},
    ArmUiResult,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Everything request handlers need, built once at startup and cloned into each request.
///
/// HTTP clients hold one connection pool per upstream for the lifetime of the process.
#[derive(Clone, Getters)]
#[getset(get = "pub with_prefix")]
pub struct ServerState {
    /// Process settings.
    settings: Arc<Settings>,

    /// The database mirror.
    mirror: Arc<dyn MirrorReader>,

    /// The ripping service.
    arm: ArmClient,

    /// The transcoding service.
    transcoder: TranscoderClient,

    /// The community CRC database.
    crc: CrcClient,

    /// Movie/TV metadata.
    metadata: MetadataService,

    /// Music metadata.
    music: MusicBrainzClient,

    /// Metadata provider keys read from `arm.yaml`.
    keys: Arc<MetadataKeyCache>,

    /// Hardware descriptions of both hosts.
    hardware: Arc<HardwareCache>,

    /// Current ripping-service configuration, with fallbacks.
    resolver: Arc<ConfigResolver>,

    /// The local log directory.
    logs: LogReader,

    /// Per-job progress files.
    progress: ProgressReader,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ServerState {
    /// Builds the state for `settings` against the real database and public services.
    pub fn new(settings: Settings) -> ArmUiResult<Self> {
        let mirror = Arc::new(SqliteMirror::new(settings.get_arm_db_path()));
        Self::with_dependencies(
            settings,
            mirror,
            MetadataEndpoints::default(),
            DEFAULT_CRC_DB_URL,
        )
    }

    /// Builds the state with an explicit mirror and third-party endpoints.
    pub fn with_dependencies(
        settings: Settings,
        mirror: Arc<dyn MirrorReader>,
        endpoints: MetadataEndpoints,
        crc_url: &str,
    ) -> ArmUiResult<Self> {
        let arm = ArmClient::new(settings.get_arm_url())?;
        let transcoder = TranscoderClient::new(
            settings.get_transcoder_url(),
            settings.get_transcoder_api_key().as_deref(),
            settings.get_transcoder_webhook_secret().as_deref(),
        )?;
        let keys = Arc::new(MetadataKeyCache::new(settings.get_arm_config_path()));
        let resolver = ConfigResolver::standard(
            arm.clone(),
            mirror.clone(),
            settings.get_arm_config_path(),
        );

        Ok(Self {
            crc: CrcClient::new(crc_url)?,
            metadata: MetadataService::new(keys.clone(), endpoints.clone())?,
            music: MusicBrainzClient::new(&endpoints)?,
            logs: LogReader::new(settings.get_arm_log_path()),
            progress: ProgressReader::new(settings.progress_dir()),
            hardware: Arc::new(HardwareCache::new()),
            resolver: Arc::new(resolver),
            settings: Arc::new(settings),
            mirror,
            arm,
            transcoder,
            keys,
        })
    }

    /// Releases the state. Connection pools close once the last clone is dropped.
    pub fn shutdown(self) {
        tracing::info!(
            "closing upstream clients for {} and {}",
            self.arm.get_base_url(),
            self.transcoder.get_base_url()
        );
        self.hardware.invalidate();
        drop(self);
    }
}
