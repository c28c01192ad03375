use std::sync::RwLock;

use serde_json::Value;

use super::{ArmClient, TranscoderClient, Upstream};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Snapshot of the static hardware descriptions of both services.
///
/// Filled by [`HardwareCache::refresh`] at startup and on demand; never refreshed implicitly.
#[derive(Debug, Default)]
pub struct HardwareCache {
    arm: RwLock<Option<Value>>,
    transcoder: RwLock<Option<Value>>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl HardwareCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches both hardware descriptions concurrently and replaces the cached values.
    ///
    /// A service that is down leaves `None` in its slot.
    pub async fn refresh(&self, arm: &ArmClient, transcoder: &TranscoderClient) {
        let (arm_info, transcoder_info) = tokio::join!(arm.system_info(), transcoder.system_info());

        tracing::info!(
            "hardware cache refreshed: arm={}, transcoder={}",
            describe(&arm_info),
            describe(&transcoder_info)
        );

        store(&self.arm, arm_info.ok());
        store(&self.transcoder, transcoder_info.ok());
    }

    /// Forgets both cached descriptions.
    pub fn invalidate(&self) {
        store(&self.arm, None);
        store(&self.transcoder, None);
    }

    /// The ripping host's cached hardware description.
    pub fn arm_info(&self) -> Option<Value> {
        load(&self.arm)
    }

    /// The transcoding host's cached hardware description.
    pub fn transcoder_info(&self) -> Option<Value> {
        load(&self.transcoder)
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn describe(outcome: &Upstream<Value>) -> &'static str {
    match outcome {
        Upstream::Ok(_) => "ok",
        Upstream::Unavailable => "unavailable",
        Upstream::Failed(_) => "failed",
    }
}

fn store(slot: &RwLock<Option<Value>>, value: Option<Value>) {
    let mut guard = slot.write().unwrap_or_else(|e| e.into_inner());
    *guard = value;
}

fn load(slot: &RwLock<Option<Value>>) -> Option<Value> {
    slot.read().unwrap_or_else(|e| e.into_inner()).clone()
}
