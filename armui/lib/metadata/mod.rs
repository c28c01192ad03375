//! Movie/TV and music metadata lookups, normalized to one shape per media kind.
//!
//! Movie/TV lookups go to exactly one of two providers, picked from `arm.yaml`: OMDb or
//! TMDb. A missing or rejected API key is a [`ArmUiError::MetadataConfig`] error, never an
//! empty result, so callers can tell "fix your configuration" apart from "no matches".

mod keys;
mod music;
mod omdb;
mod tmdb;

use std::sync::{Arc, LazyLock};

use regex::Regex;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use typed_builder::TypedBuilder;

use crate::{
    config::{METADATA_REQUEST_TIMEOUT, UPSTREAM_CONNECT_TIMEOUT},
    ArmUiError, ArmUiResult,
};

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use keys::*;
pub use music::*;
pub use omdb::*;
pub use tmdb::*;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// OMDb API endpoint.
pub const OMDB_API_URL: &str = "https://www.omdbapi.com/";

/// TMDb API base.
pub const TMDB_API_URL: &str = "https://api.themoviedb.org/3";

/// TMDb image base for posters and backdrops.
pub const TMDB_IMAGE_URL: &str = "https://image.tmdb.org/t/p/original";

/// MusicBrainz web service base.
pub const MUSICBRAINZ_API_URL: &str = "https://musicbrainz.org/ws/2";

/// Cover Art Archive release base.
pub const COVER_ART_URL: &str = "https://coverartarchive.org/release";

/// User agent MusicBrainz requires from API clients.
pub const METADATA_USER_AGENT: &str = concat!(
    "ARM-UI/",
    env!("CARGO_PKG_VERSION"),
    " ( https://github.com/automatic-ripping-machine/arm-ui )"
);

static LEADING_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})(?:\s*[-–].*)?$").expect("leading year pattern is valid")
});

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Movie or series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// A film.
    Movie,

    /// A TV series.
    Series,
}

/// One movie/TV search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Title.
    pub title: String,

    /// Four-digit year, or empty.
    pub year: String,

    /// IMDb id, when known.
    pub imdb_id: Option<String>,

    /// Movie or series.
    pub media_type: MediaType,

    /// Poster image URL.
    pub poster_url: Option<String>,
}

/// Full movie/TV details.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaDetail {
    /// Title.
    pub title: String,

    /// Four-digit year, or empty.
    pub year: String,

    /// IMDb id.
    pub imdb_id: Option<String>,

    /// Movie or series.
    pub media_type: MediaType,

    /// Poster image URL.
    pub poster_url: Option<String>,

    /// Short plot summary.
    pub plot: Option<String>,

    /// Backdrop image URL.
    pub background_url: Option<String>,
}

/// Base URLs of every metadata service.
#[derive(Debug, Clone, TypedBuilder)]
pub struct MetadataEndpoints {
    /// OMDb API endpoint.
    #[builder(default = OMDB_API_URL.to_string(), setter(into))]
    pub omdb: String,

    /// TMDb API base.
    #[builder(default = TMDB_API_URL.to_string(), setter(into))]
    pub tmdb: String,

    /// TMDb image base.
    #[builder(default = TMDB_IMAGE_URL.to_string(), setter(into))]
    pub tmdb_images: String,

    /// MusicBrainz web service base.
    #[builder(default = MUSICBRAINZ_API_URL.to_string(), setter(into))]
    pub musicbrainz: String,

    /// Cover Art Archive release base.
    #[builder(default = COVER_ART_URL.to_string(), setter(into))]
    pub cover_art: String,
}

/// The movie/TV provider in use for one call.
#[derive(Debug, Clone)]
pub enum MetadataProvider {
    /// OMDb.
    Omdb(OmdbProvider),

    /// TMDb.
    Tmdb(TmdbProvider),
}

/// Movie/TV metadata lookups against whichever provider `arm.yaml` selects.
#[derive(Debug, Clone)]
pub struct MetadataService {
    client: Client,
    keys: Arc<MetadataKeyCache>,
    endpoints: MetadataEndpoints,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl MetadataProvider {
    /// Searches by title, with an optional year hint.
    pub async fn search(&self, query: &str, year: Option<&str>) -> ArmUiResult<Vec<SearchResult>> {
        match self {
            MetadataProvider::Omdb(provider) => provider.search(query, year).await,
            MetadataProvider::Tmdb(provider) => provider.search(query, year).await,
        }
    }

    /// Fetches details by IMDb id. `None` if the provider does not know it.
    pub async fn get_details(&self, imdb_id: &str) -> ArmUiResult<Option<MediaDetail>> {
        match self {
            MetadataProvider::Omdb(provider) => provider.get_details(imdb_id).await,
            MetadataProvider::Tmdb(provider) => provider.get_details(imdb_id).await,
        }
    }

    /// Short provider name.
    pub fn name(&self) -> &'static str {
        match self {
            MetadataProvider::Omdb(_) => "omdb",
            MetadataProvider::Tmdb(_) => "tmdb",
        }
    }
}

impl MetadataService {
    /// Creates a service reading provider keys from `keys`.
    pub fn new(keys: Arc<MetadataKeyCache>, endpoints: MetadataEndpoints) -> ArmUiResult<Self> {
        Ok(Self {
            client: metadata_client()?,
            keys,
            endpoints,
        })
    }

    /// The key cache backing provider selection.
    pub fn keys(&self) -> &Arc<MetadataKeyCache> {
        &self.keys
    }

    /// Picks the provider for the current keys.
    ///
    /// TMDb is used when selected and keyed; otherwise OMDb when keyed.
    pub async fn provider(&self) -> ArmUiResult<MetadataProvider> {
        let keys = self.keys.get().await;

        if keys.provider.eq_ignore_ascii_case("tmdb") {
            if let Some(key) = &keys.tmdb_api_key {
                return Ok(MetadataProvider::Tmdb(TmdbProvider::new(
                    self.client.clone(),
                    &self.endpoints.tmdb,
                    &self.endpoints.tmdb_images,
                    key,
                )));
            }
        }

        if let Some(key) = &keys.omdb_api_key {
            return Ok(MetadataProvider::Omdb(OmdbProvider::new(
                self.client.clone(),
                &self.endpoints.omdb,
                key,
            )));
        }

        tracing::warn!("no metadata api key configured for provider {}", keys.provider);
        Err(ArmUiError::MetadataConfig(format!(
            "No API key configured for metadata provider '{}'. Set OMDB_API_KEY or TMDB_API_KEY in arm.yaml",
            keys.provider
        )))
    }

    /// Searches the configured provider.
    pub async fn search(&self, query: &str, year: Option<&str>) -> ArmUiResult<Vec<SearchResult>> {
        let year = year.map(str::trim).filter(|y| !y.is_empty());
        self.provider().await?.search(query, year).await
    }

    /// Fetches details from the configured provider.
    pub async fn get_details(&self, imdb_id: &str) -> ArmUiResult<Option<MediaDetail>> {
        self.provider().await?.get_details(imdb_id).await
    }
}

impl Default for MetadataEndpoints {
    fn default() -> Self {
        Self::builder().build()
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Reduces a release date or year range to its leading four-digit year.
///
/// `"2006-05-19"`, `"2006–2008"` and `"2006–"` all become `"2006"`. Anything without a
/// leading year, such as `""` or `"N/A"`, is returned unchanged.
pub fn extract_year(raw: &str) -> String {
    match LEADING_YEAR.captures(raw.trim()) {
        Some(captures) => captures[1].to_string(),
        None => raw.to_string(),
    }
}

/// Builds the HTTP client shared by metadata providers.
pub(crate) fn metadata_client() -> ArmUiResult<Client> {
    Ok(Client::builder()
        .connect_timeout(UPSTREAM_CONNECT_TIMEOUT)
        .timeout(METADATA_REQUEST_TIMEOUT)
        .user_agent(METADATA_USER_AGENT)
        .build()?)
}

/// Sends a provider request and decodes the JSON body.
///
/// 401/403 become [`ArmUiError::MetadataConfig`], 404 yields `None`, transport failures and
/// other error statuses become [`ArmUiError::MetadataUnavailable`].
pub(crate) async fn fetch_json(request: RequestBuilder, provider: &str) -> ArmUiResult<Option<Value>> {
    let response = request
        .send()
        .await
        .map_err(|e| ArmUiError::MetadataUnavailable(format!("{provider}: {e}")))?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ArmUiError::MetadataConfig(format!(
            "{provider} rejected the configured API key"
        )));
    }

    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }

    if !status.is_success() {
        return Err(ArmUiError::MetadataUnavailable(format!(
            "{provider} returned {status}"
        )));
    }

    let body = response
        .json::<Value>()
        .await
        .map_err(|e| ArmUiError::MetadataUnavailable(format!("{provider}: {e}")))?;
    Ok(Some(body))
}

/// A string field of a provider record, `None` when absent, null or empty.
pub(crate) fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key)?.as_str().filter(|s| !s.is_empty())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("2006-05-19"), "2006");
        assert_eq!(extract_year("2006–2008"), "2006");
        assert_eq!(extract_year("2006–"), "2006");
        assert_eq!(extract_year("2006-2008"), "2006");
        assert_eq!(extract_year("2006"), "2006");
        assert_eq!(extract_year(""), "");
        assert_eq!(extract_year("N/A"), "N/A");
    }

    #[test]
    fn test_media_type_serializes_lowercase() {
        assert_eq!(serde_json::to_value(MediaType::Series).unwrap(), "series");
        assert_eq!(serde_json::to_value(MediaType::Movie).unwrap(), "movie");
    }
}
