use std::sync::LazyLock;

use regex::Regex;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ArmUiResult;

use super::{fetch_json, metadata_client, str_field, MetadataEndpoints};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const PROVIDER: &str = "MusicBrainz";

/// Releases returned per search page.
pub const MUSIC_SEARCH_LIMIT: u32 = 15;

/// Cover Art Archive thumbnail suffix.
const COVER_ART_SIZE: &str = "front-250";

/// Relations included in release lookups.
const RELEASE_INCLUDES: &str = "artist-credits+recordings+release-groups+labels";

static LUCENE_SPECIAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([+\-&|!(){}\[\]^"~*?:\\/<>])"#).expect("lucene pattern is valid")
});

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Release search parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MusicSearchQuery {
    /// Free-text release query.
    pub q: String,

    /// Restrict to an artist.
    pub artist: Option<String>,

    /// Release group primary type, e.g. `album`.
    pub release_type: Option<String>,

    /// Medium format, e.g. `CD`.
    pub format: Option<String>,

    /// Release country code.
    pub country: Option<String>,

    /// Release status, e.g. `official`.
    pub status: Option<String>,

    /// Exact number of tracks.
    pub tracks: Option<u32>,

    /// Results to skip.
    pub offset: u32,
}

/// One page of release search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MusicSearchPage {
    /// Normalized releases.
    pub results: Vec<MusicSearchResult>,

    /// Total matches reported by MusicBrainz.
    pub total: u64,
}

/// A release search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MusicSearchResult {
    /// Release title.
    pub title: String,

    /// Flattened artist credit.
    pub artist: String,

    /// Four-digit release year, or empty.
    pub year: String,

    /// MusicBrainz release id.
    pub release_id: String,

    /// Always `"music"`.
    pub media_type: &'static str,

    /// Cover art thumbnail.
    pub poster_url: Option<String>,

    /// Track count across all media.
    pub track_count: Option<u64>,

    /// Release country.
    pub country: Option<String>,

    /// Release group primary type.
    pub release_type: Option<String>,

    /// Format of the first medium.
    pub format: Option<String>,

    /// First label.
    pub label: Option<String>,
}

/// Full release details.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MusicDetail {
    /// Search fields.
    #[serde(flatten)]
    pub summary: MusicSearchResult,

    /// Catalog number of the first label entry.
    pub catalog_number: Option<String>,

    /// Barcode.
    pub barcode: Option<String>,

    /// Release status.
    pub status: Option<String>,

    /// Tracks of every medium, in order.
    pub tracks: Vec<MusicTrack>,
}

/// One track of a release.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MusicTrack {
    /// Position label, e.g. `"3"` or `"A1"`.
    pub number: String,

    /// Recording title.
    pub title: String,

    /// Duration in milliseconds.
    pub length_ms: Option<u64>,
}

/// MusicBrainz release search and lookup.
#[derive(Debug, Clone)]
pub struct MusicBrainzClient {
    client: Client,
    base_url: String,
    cover_art_url: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl MusicSearchQuery {
    /// Creates a query for free text alone.
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Default::default()
        }
    }

    /// Builds the Lucene query string.
    ///
    /// User text is escaped before being placed in a field clause.
    pub fn lucene(&self) -> String {
        let query = escape_lucene(&self.q);
        let mut parts = match present(&self.artist) {
            Some(artist) => vec![format!(
                "release:\"{query}\" AND artist:\"{}\"",
                escape_lucene(artist)
            )],
            None => vec![query],
        };

        if let Some(release_type) = present(&self.release_type) {
            parts.push(format!("AND type:{}", escape_lucene(release_type)));
        }
        if let Some(format) = present(&self.format) {
            parts.push(format!("AND format:\"{}\"", escape_lucene(format)));
        }
        if let Some(country) = present(&self.country) {
            parts.push(format!("AND country:{}", escape_lucene(country)));
        }
        if let Some(status) = present(&self.status) {
            parts.push(format!("AND status:{}", escape_lucene(status)));
        }
        if let Some(tracks) = self.tracks {
            parts.push(format!("AND tracks:{tracks}"));
        }

        parts.join(" ")
    }
}

impl MusicBrainzClient {
    /// Creates a client against the MusicBrainz and Cover Art Archive bases in `endpoints`.
    pub fn new(endpoints: &MetadataEndpoints) -> ArmUiResult<Self> {
        Ok(Self {
            client: metadata_client()?,
            base_url: endpoints.musicbrainz.trim_end_matches('/').to_string(),
            cover_art_url: endpoints.cover_art.trim_end_matches('/').to_string(),
        })
    }

    /// Searches releases.
    pub async fn search(&self, query: &MusicSearchQuery) -> ArmUiResult<MusicSearchPage> {
        let lucene = query.lucene();
        tracing::debug!("musicbrainz release search: {lucene}");

        let limit = MUSIC_SEARCH_LIMIT.to_string();
        let offset = query.offset.to_string();
        let request = self
            .client
            .get(format!("{}/release", self.base_url))
            .header(header::ACCEPT, "application/json")
            .query(&[
                ("query", lucene.as_str()),
                ("fmt", "json"),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
            ]);

        let Some(data) = fetch_json(request, PROVIDER).await? else {
            return Ok(MusicSearchPage {
                results: Vec::new(),
                total: 0,
            });
        };

        let results: Vec<MusicSearchResult> = data
            .get("releases")
            .and_then(Value::as_array)
            .map(|releases| releases.iter().map(|r| self.summarize(r, None)).collect())
            .unwrap_or_default();

        Ok(MusicSearchPage {
            results,
            total: data.get("count").and_then(Value::as_u64).unwrap_or(0),
        })
    }

    /// Looks up a release by id. `None` if MusicBrainz does not know it.
    pub async fn get_details(&self, release_id: &str) -> ArmUiResult<Option<MusicDetail>> {
        let request = self
            .client
            .get(format!("{}/release/{release_id}", self.base_url))
            .header(header::ACCEPT, "application/json")
            .query(&[("inc", RELEASE_INCLUDES), ("fmt", "json")]);

        let Some(data) = fetch_json(request, PROVIDER).await? else {
            return Ok(None);
        };

        let media = array(&data, "media");
        let tracks: Vec<MusicTrack> = media
            .iter()
            .flat_map(|medium| array(medium, "tracks"))
            .map(track)
            .collect();
        let declared: u64 = media
            .iter()
            .filter_map(|medium| medium.get("track-count").and_then(Value::as_u64))
            .sum();
        let track_count = if declared > 0 {
            declared
        } else {
            tracks.len() as u64
        };

        let mut summary = self.summarize(&data, Some(release_id));
        summary.track_count = Some(track_count);

        Ok(Some(MusicDetail {
            summary,
            catalog_number: array(&data, "label-info")
                .first()
                .and_then(|info| str_field(info, "catalog-number"))
                .map(str::to_string),
            barcode: str_field(&data, "barcode").map(str::to_string),
            status: str_field(&data, "status").map(str::to_string),
            tracks,
        }))
    }

    fn summarize(&self, release: &Value, fallback_id: Option<&str>) -> MusicSearchResult {
        let release_id = str_field(release, "id")
            .or(fallback_id)
            .unwrap_or_default()
            .to_string();
        let poster_url = (!release_id.is_empty())
            .then(|| format!("{}/{release_id}/{COVER_ART_SIZE}", self.cover_art_url));

        MusicSearchResult {
            title: str_field(release, "title").unwrap_or_default().to_string(),
            artist: artist_credit(array(release, "artist-credit")),
            year: str_field(release, "date")
                .map(|date| date.chars().take(4).collect())
                .unwrap_or_default(),
            release_id,
            media_type: "music",
            poster_url,
            track_count: release.get("track-count").and_then(Value::as_u64),
            country: str_field(release, "country").map(str::to_string),
            release_type: release
                .get("release-group")
                .and_then(|group| str_field(group, "primary-type"))
                .map(str::to_string),
            format: array(release, "media")
                .first()
                .and_then(|medium| str_field(medium, "format"))
                .map(str::to_string),
            label: array(release, "label-info")
                .first()
                .and_then(|info| info.get("label"))
                .and_then(|label| str_field(label, "name"))
                .map(str::to_string),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Backslash-escapes Lucene query syntax characters.
///
/// Every occurrence is escaped, backslashes included, so escaping is not idempotent:
/// escaping `AC\/DC` yields `AC\\\/DC`, exactly as for any text holding a literal backslash.
pub fn escape_lucene(text: &str) -> String {
    LUCENE_SPECIAL.replace_all(text, r"\$1").into_owned()
}

/// Joins artist credit names, placing each join phrase between a name and the next.
pub fn artist_credit(credits: &[Value]) -> String {
    let mut artist = String::new();
    for (i, credit) in credits.iter().enumerate() {
        artist.push_str(str_field(credit, "name").unwrap_or_default());
        if i + 1 < credits.len() {
            artist.push_str(str_field(credit, "joinphrase").unwrap_or_default());
        }
    }

    artist
}

fn track(track: &Value) -> MusicTrack {
    let recording = track.get("recording");
    MusicTrack {
        number: str_field(track, "number").unwrap_or_default().to_string(),
        title: recording
            .and_then(|r| str_field(r, "title"))
            .or_else(|| str_field(track, "title"))
            .unwrap_or_default()
            .to_string(),
        length_ms: track
            .get("length")
            .and_then(Value::as_u64)
            .or_else(|| recording.and_then(|r| r.get("length")).and_then(Value::as_u64)),
    }
}

fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
