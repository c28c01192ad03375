use reqwest::Client;
use serde_json::Value;

use crate::{ArmUiError, ArmUiResult};

use super::{extract_year, fetch_json, str_field, MediaDetail, MediaType, SearchResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const PROVIDER: &str = "OMDb";

/// Placeholder OMDb uses for missing values.
const NOT_AVAILABLE: &str = "N/A";

/// OMDb error messages that mean the key is missing or wrong.
const AUTH_ERRORS: &[&str] = &["Invalid API key!", "No API key provided."];

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// OMDb: title search with an exact-title fallback, details by IMDb id.
#[derive(Debug, Clone)]
pub struct OmdbProvider {
    client: Client,
    url: String,
    api_key: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl OmdbProvider {
    /// Creates a provider against `url`.
    pub fn new(client: Client, url: &str, api_key: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Searches by title. Falls back to an exact-title lookup when the search finds nothing.
    pub async fn search(&self, query: &str, year: Option<&str>) -> ArmUiResult<Vec<SearchResult>> {
        let data = self.get(&[("s", query)], year).await?;
        if let Some(items) = data
            .as_ref()
            .filter(|d| responded(d))
            .and_then(|d| d.get("Search"))
            .and_then(Value::as_array)
        {
            return Ok(items.iter().map(normalize).collect());
        }

        tracing::debug!("omdb search for {query:?} found nothing, trying exact title");
        let data = self.get(&[("t", query)], year).await?;
        Ok(data
            .filter(responded)
            .map(|d| vec![normalize(&d)])
            .unwrap_or_default())
    }

    /// Fetches details with a short plot.
    pub async fn get_details(&self, imdb_id: &str) -> ArmUiResult<Option<MediaDetail>> {
        let Some(data) = self
            .get(&[("i", imdb_id), ("plot", "short")], None)
            .await?
            .filter(responded)
        else {
            return Ok(None);
        };

        let result = normalize(&data);
        Ok(Some(MediaDetail {
            title: result.title,
            year: result.year,
            imdb_id: result.imdb_id,
            media_type: result.media_type,
            poster_url: result.poster_url,
            plot: available(&data, "Plot"),
            background_url: None,
        }))
    }

    async fn get(&self, params: &[(&str, &str)], year: Option<&str>) -> ArmUiResult<Option<Value>> {
        let mut request = self
            .client
            .get(&self.url)
            .query(params)
            .query(&[("r", "json"), ("apikey", self.api_key.as_str())]);
        if let Some(year) = year {
            request = request.query(&[("y", year)]);
        }

        let data = fetch_json(request, PROVIDER).await?;
        if let Some(error) = data.as_ref().and_then(|d| str_field(d, "Error")) {
            if AUTH_ERRORS.contains(&error) {
                return Err(ArmUiError::MetadataConfig(format!("{PROVIDER}: {error}")));
            }
        }

        Ok(data)
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn responded(data: &Value) -> bool {
    data.get("Response").and_then(Value::as_str) == Some("True")
}

fn available(item: &Value, key: &str) -> Option<String> {
    str_field(item, key)
        .filter(|v| *v != NOT_AVAILABLE)
        .map(str::to_string)
}

fn normalize(item: &Value) -> SearchResult {
    let media_type = match str_field(item, "Type") {
        Some("series") => MediaType::Series,
        _ => MediaType::Movie,
    };

    SearchResult {
        title: str_field(item, "Title").unwrap_or_default().to_string(),
        year: extract_year(str_field(item, "Year").unwrap_or_default()),
        imdb_id: str_field(item, "imdbID").map(str::to_string),
        media_type,
        poster_url: available(item, "Poster"),
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_normalize_maps_type_and_placeholders() {
        let result = normalize(&json!({
            "Title": "Breaking Bad",
            "Year": "2008–2013",
            "imdbID": "tt0903747",
            "Type": "series",
            "Poster": "N/A",
        }));
        assert_eq!(result.title, "Breaking Bad");
        assert_eq!(result.year, "2008");
        assert_eq!(result.media_type, MediaType::Series);
        assert_eq!(result.poster_url, None);

        let result = normalize(&json!({"Title": "Short", "Type": "episode"}));
        assert_eq!(result.media_type, MediaType::Movie);
        assert_eq!(result.imdb_id, None);
        assert_eq!(result.year, "");
    }
}
