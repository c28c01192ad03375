use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::{
    config::{ARM_REQUEST_TIMEOUT, UPSTREAM_CONNECT_TIMEOUT},
    ArmUiResult,
};

use super::{fold_response, Upstream};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The community CRC64 disc database.
pub const DEFAULT_CRC_DB_URL: &str = "https://1337server.pythonanywhere.com/api/v1/";

/// Error reported when the CRC database cannot be reached.
pub const CRC_UNREACHABLE: &str = "CRC database unreachable";

/// Fields copied from each database entry, as `(output, source)` pairs.
const CRC_FIELDS: &[(&str, &str)] = &[
    ("title", "title"),
    ("year", "year"),
    ("imdb_id", "imdb_id"),
    ("tmdb_id", "tmdb_id"),
    ("video_type", "video_type"),
    ("disctype", "disctype"),
    ("label", "label"),
    ("poster_url", "poster_img"),
    ("hasnicetitle", "hasnicetitle"),
    ("validated", "validated"),
    ("date_added", "date_added"),
];

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Client for the community CRC64 database.
#[derive(Debug, Clone)]
pub struct CrcClient {
    client: Client,
    base_url: String,
}

/// Result of looking up a disc CRC.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrcLookup {
    /// The job has no CRC to look up.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub no_crc: bool,

    /// At least one entry matched.
    pub found: bool,

    /// Matching entries, each a flat object of [`CRC_FIELDS`].
    pub results: Vec<serde_json::Map<String, Value>>,

    /// Whether `arm.yaml` carries an API key for submitting CRCs.
    pub has_api_key: bool,

    /// Why the lookup could not be performed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl CrcClient {
    /// Creates a client for the CRC database at `base_url`.
    pub fn new(base_url: impl Into<String>) -> ArmUiResult<Self> {
        let client = Client::builder()
            .connect_timeout(UPSTREAM_CONNECT_TIMEOUT)
            .timeout(ARM_REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Looks up a disc by its CRC64.
    pub async fn lookup(&self, crc64: &str) -> CrcLookup {
        let request = self
            .client
            .get(&self.base_url)
            .query(&[("mode", "s"), ("crc64", crc64)]);

        let data = match fold_response(request.send().await).await {
            Upstream::Ok(data) => data,
            Upstream::Failed(_) => return CrcLookup::default(),
            Upstream::Unavailable => {
                return CrcLookup {
                    error: Some(CRC_UNREACHABLE.to_string()),
                    ..Default::default()
                }
            }
        };

        if data["success"].as_bool() != Some(true) {
            return CrcLookup::default();
        }

        let results: Vec<_> = match &data["results"] {
            Value::Object(entries) => entries.values().map(normalize_entry).collect(),
            Value::Array(entries) => entries.iter().map(normalize_entry).collect(),
            _ => Vec::new(),
        };

        CrcLookup {
            found: !results.is_empty(),
            results,
            ..Default::default()
        }
    }
}

impl CrcLookup {
    /// The response for a job that has no CRC recorded.
    pub fn no_crc() -> Self {
        Self {
            no_crc: true,
            ..Default::default()
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn normalize_entry(entry: &Value) -> serde_json::Map<String, Value> {
    CRC_FIELDS
        .iter()
        .map(|(output, source)| {
            let value = match entry.get(*source) {
                Some(Value::Null) | None => Value::String(String::new()),
                Some(value) => value.clone(),
            };
            (output.to_string(), value)
        })
        .collect()
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
