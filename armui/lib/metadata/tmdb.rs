use futures::future;
use reqwest::Client;
use serde_json::Value;

use crate::{ArmUiError, ArmUiResult};

use super::{extract_year, fetch_json, str_field, MediaDetail, MediaType, SearchResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const PROVIDER: &str = "TMDb";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// TMDb: movie search with a TV fallback, details through `/find`.
///
/// TMDb ids are internal, so every search hit costs one more request to recover its IMDb id.
#[derive(Debug, Clone)]
pub struct TmdbProvider {
    client: Client,
    base_url: String,
    image_url: String,
    api_key: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl TmdbProvider {
    /// Creates a provider against `base_url`, building image links on `image_url`.
    pub fn new(client: Client, base_url: &str, image_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            image_url: image_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Searches movies, then TV when no movie matches.
    ///
    /// The collection that answered decides the media type of every result.
    pub async fn search(&self, query: &str, year: Option<&str>) -> ArmUiResult<Vec<SearchResult>> {
        let collections = [
            ("search/movie", "year", MediaType::Movie),
            ("search/tv", "first_air_date_year", MediaType::Series),
        ];

        for (path, year_param, media_type) in collections {
            let mut params = vec![("query", query)];
            if let Some(year) = year {
                params.push((year_param, year));
            }

            let Some(data) = self.get(path, &params).await? else {
                continue;
            };

            let total = data.get("total_results").and_then(Value::as_u64).unwrap_or(0);
            let items = data
                .get("results")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            if total == 0 || items.is_empty() {
                continue;
            }

            return future::try_join_all(
                items
                    .iter()
                    .map(|item| self.normalize_search(item, media_type)),
            )
            .await;
        }

        Ok(Vec::new())
    }

    /// Looks up an IMDb id, preferring movie matches over TV matches.
    pub async fn get_details(&self, imdb_id: &str) -> ArmUiResult<Option<MediaDetail>> {
        let path = format!("find/{imdb_id}");
        let Some(data) = self.get(&path, &[("external_source", "imdb_id")]).await? else {
            return Ok(None);
        };

        let hit = first_result(&data, "movie_results")
            .map(|item| (item, MediaType::Movie))
            .or_else(|| first_result(&data, "tv_results").map(|item| (item, MediaType::Series)));

        Ok(hit.map(|(item, media_type)| MediaDetail {
            title: title(item),
            year: year(item),
            imdb_id: Some(imdb_id.to_string()),
            media_type,
            poster_url: self.image(item, "poster_path"),
            plot: str_field(item, "overview").map(str::to_string),
            background_url: self.image(item, "backdrop_path"),
        }))
    }

    async fn normalize_search(&self, item: &Value, media_type: MediaType) -> ArmUiResult<SearchResult> {
        let imdb_id = match item.get("id").and_then(Value::as_i64) {
            Some(id) => self.imdb_id(id).await?,
            None => None,
        };

        Ok(SearchResult {
            title: title(item),
            year: year(item),
            imdb_id,
            media_type,
            poster_url: self.image(item, "poster_path"),
        })
    }

    /// Resolves the IMDb id of a TMDb id, trying the movie record then the TV record.
    async fn imdb_id(&self, tmdb_id: i64) -> ArmUiResult<Option<String>> {
        let movie = self
            .xref(&format!("movie/{tmdb_id}"), &[("append_to_response", "external_ids")])
            .await?;
        if let Some(movie) = movie {
            return Ok(movie
                .get("external_ids")
                .and_then(|ids| str_field(ids, "imdb_id"))
                .map(str::to_string));
        }

        let tv = self.xref(&format!("tv/{tmdb_id}/external_ids"), &[]).await?;
        Ok(tv.and_then(|ids| str_field(&ids, "imdb_id").map(str::to_string)))
    }

    /// A cross-reference lookup. Misses and outages yield `None`; rejected keys still fail.
    async fn xref(&self, path: &str, params: &[(&str, &str)]) -> ArmUiResult<Option<Value>> {
        match self.get(path, params).await {
            Ok(data) => Ok(data.filter(|d| d.get("status_code").is_none())),
            Err(ArmUiError::MetadataUnavailable(e)) => {
                tracing::debug!("tmdb cross-reference {path} failed: {e}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> ArmUiResult<Option<Value>> {
        let request = self
            .client
            .get(format!("{}/{path}", self.base_url))
            .query(&[("api_key", self.api_key.as_str())])
            .query(params);
        fetch_json(request, PROVIDER).await
    }

    fn image(&self, item: &Value, key: &str) -> Option<String> {
        str_field(item, key).map(|path| format!("{}{path}", self.image_url))
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn first_result<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    data.get(key)?.as_array()?.first()
}

fn title(item: &Value) -> String {
    str_field(item, "title")
        .or_else(|| str_field(item, "name"))
        .unwrap_or_default()
        .to_string()
}

fn year(item: &Value) -> String {
    str_field(item, "release_date")
        .or_else(|| str_field(item, "first_air_date"))
        .map(extract_year)
        .unwrap_or_default()
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
