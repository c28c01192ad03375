mod common;

use std::{collections::HashMap, sync::Arc};

use armui::{
    metadata::{MediaType, MetadataKeyCache, MetadataService, MusicBrainzClient, MusicSearchQuery},
    ArmUiError,
};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

type Params = Query<HashMap<String, String>>;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

async fn omdb(Query(params): Params) -> Json<Value> {
    if params.get("apikey").map(String::as_str) != Some("omdb-key") {
        return Json(json!({ "Response": "False", "Error": "Invalid API key!" }));
    }

    let not_found = json!({ "Response": "False", "Error": "Movie not found!" });
    if let Some(search) = params.get("s") {
        return Json(match search.as_str() {
            "Serenity" => json!({
                "Response": "True",
                "Search": [{
                    "Title": "Serenity",
                    "Year": params.get("y").cloned().unwrap_or_else(|| "2005".into()),
                    "imdbID": "tt0379786",
                    "Type": "movie",
                    "Poster": "N/A",
                }],
            }),
            _ => not_found,
        });
    }

    if let Some(title) = params.get("t") {
        return Json(match title.as_str() {
            "Firefly" => json!({
                "Response": "True",
                "Title": "Firefly",
                "Year": "2002–2003",
                "imdbID": "tt0303461",
                "Type": "series",
                "Poster": "https://img/firefly.jpg",
            }),
            _ => not_found,
        });
    }

    Json(match params.get("i").map(String::as_str) {
        Some("tt0379786") => json!({
            "Response": "True",
            "Title": "Serenity",
            "Year": "2005",
            "imdbID": "tt0379786",
            "Type": "movie",
            "Poster": "https://img/serenity.jpg",
            "Plot": "The crew of the ship Serenity gets caught up in danger.",
        }),
        _ => json!({ "Response": "False", "Error": "Incorrect IMDb ID." }),
    })
}

async fn tmdb_search(Path(kind): Path<String>, Query(params): Params) -> (StatusCode, Json<Value>) {
    if params.get("api_key").map(String::as_str) != Some("tmdb-key") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "status_code": 7 })));
    }

    let query = params.get("query").map(String::as_str).unwrap_or_default();
    let body = match (kind.as_str(), query) {
        ("movie", "Serenity") => json!({
            "total_results": 1,
            "results": [{
                "id": 16320,
                "title": "Serenity",
                "release_date": "2005-09-25",
                "poster_path": "/serenity.jpg",
            }],
        }),
        ("tv", "Dark") => json!({
            "total_results": 1,
            "results": [{ "id": 70523, "name": "Dark", "first_air_date": "2017-12-01" }],
        }),
        _ => json!({ "total_results": 0, "results": [] }),
    };
    (StatusCode::OK, Json(body))
}

async fn tmdb_movie(Path(id): Path<i64>) -> (StatusCode, Json<Value>) {
    match id {
        16320 => (
            StatusCode::OK,
            Json(json!({ "id": id, "external_ids": { "imdb_id": "tt0379786" } })),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status_code": 34, "status_message": "not found" })),
        ),
    }
}

async fn tmdb_tv_ids(Path(id): Path<i64>) -> Json<Value> {
    Json(json!({ "id": id, "imdb_id": "tt5753856" }))
}

async fn tmdb_find(Path(imdb_id): Path<String>) -> Json<Value> {
    Json(match imdb_id.as_str() {
        "tt5753856" => json!({
            "movie_results": [],
            "tv_results": [{
                "name": "Dark",
                "first_air_date": "2017-12-01",
                "overview": "A missing child sets four families on a frantic hunt.",
                "poster_path": "/dark.jpg",
                "backdrop_path": "/dark-wide.jpg",
            }],
        }),
        _ => json!({ "movie_results": [], "tv_results": [] }),
    })
}

async fn mb_search(Query(params): Params) -> Json<Value> {
    let expected = r#"release:"OK Computer" AND artist:"Radiohead" AND format:"CD""#;
    if params.get("query").map(String::as_str) != Some(expected) {
        return Json(json!({ "count": 0, "releases": [] }));
    }

    Json(json!({
        "count": 42,
        "releases": [{
            "id": "0b6b4ba0-d36f-47bd-b4ea-6a5b91842d29",
            "title": "OK Computer",
            "date": "1997-05-21",
            "country": "GB",
            "track-count": 12,
            "artist-credit": [{ "name": "Radiohead", "joinphrase": " & " }],
            "release-group": { "primary-type": "Album" },
            "media": [{ "format": "CD" }],
            "label-info": [{ "label": { "name": "Parlophone" } }],
        }],
    }))
}

async fn mb_release(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    if id != "rel-1" {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "Not Found" })));
    }

    (
        StatusCode::OK,
        Json(json!({
            "title": "Double Fantasy",
            "date": "1980",
            "status": "Official",
            "barcode": "075992429927",
            "artist-credit": [
                { "name": "John Lennon", "joinphrase": " & " },
                { "name": "Yoko Ono", "joinphrase": "!" },
            ],
            "label-info": [{ "catalog-number": "GHS 2001", "label": { "name": "Geffen" } }],
            "media": [
                {
                    "format": "Vinyl",
                    "track-count": 7,
                    "tracks": [
                        { "number": "A1", "length": 216000, "recording": { "title": "(Just Like) Starting Over" } },
                        { "number": "A2", "title": "Kiss Kiss Kiss", "recording": { "length": 161000 } },
                    ],
                },
                {
                    "format": "Vinyl",
                    "track-count": 7,
                    "tracks": [{ "number": "B1", "recording": { "title": "Watching the Wheels" } }],
                },
            ],
        })),
    )
}

fn provider_stub() -> Router {
    Router::new()
        .route("/omdb/", get(omdb))
        .route("/tmdb/search/{kind}", get(tmdb_search))
        .route("/tmdb/movie/{id}", get(tmdb_movie))
        .route("/tmdb/tv/{id}/external_ids", get(tmdb_tv_ids))
        .route("/tmdb/find/{imdb_id}", get(tmdb_find))
        .route("/mb/release", get(mb_search))
        .route("/mb/release/{id}", get(mb_release))
}

async fn service_with(yaml: &str) -> anyhow::Result<(TempDir, MetadataService)> {
    let dir = tempdir()?;
    let path = dir.path().join("arm.yaml");
    tokio::fs::write(&path, yaml).await?;

    let base = common::spawn_stub(provider_stub()).await?;
    let keys = Arc::new(MetadataKeyCache::new(path));
    let service = MetadataService::new(keys, common::endpoints_at(&base))?;
    Ok((dir, service))
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[test_log::test(tokio::test)]
async fn test_metadata_requires_a_key() -> anyhow::Result<()> {
    let (_dir, service) = service_with("METADATA_PROVIDER: tmdb\nOMDB_API_KEY: \"\"\n").await?;

    match service.search("Serenity", None).await {
        Err(ArmUiError::MetadataConfig(message)) => {
            assert!(message.contains("'tmdb'"));
            assert!(message.contains("OMDB_API_KEY or TMDB_API_KEY"));
        }
        other => panic!("expected a configuration error, got {other:?}"),
    }

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_omdb_search_and_exact_title_fallback() -> anyhow::Result<()> {
    let (_dir, service) = service_with("OMDB_API_KEY: omdb-key\n").await?;
    assert_eq!(service.provider().await?.name(), "omdb");

    let results = service.search("Serenity", Some(" 2005 ")).await?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].imdb_id.as_deref(), Some("tt0379786"));
    assert_eq!(results[0].year, "2005");
    assert_eq!(results[0].poster_url, None);
    assert_eq!(results[0].media_type, MediaType::Movie);

    let results = service.search("Firefly", None).await?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].year, "2002");
    assert_eq!(results[0].media_type, MediaType::Series);

    assert!(service.search("Nothing At All", None).await?.is_empty());

    let detail = service.get_details("tt0379786").await?.unwrap();
    assert_eq!(detail.title, "Serenity");
    assert!(detail.plot.unwrap().starts_with("The crew"));
    assert_eq!(detail.background_url, None);
    assert!(service.get_details("tt0000000").await?.is_none());

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_omdb_rejected_key_is_a_configuration_error() -> anyhow::Result<()> {
    let (_dir, service) = service_with("OMDB_API_KEY: stale\n").await?;

    let result = service.search("Serenity", None).await;
    assert!(matches!(result, Err(ArmUiError::MetadataConfig(_))));

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_tmdb_search_falls_back_to_tv_and_cross_references() -> anyhow::Result<()> {
    let (_dir, service) =
        service_with("METADATA_PROVIDER: TMDB\nTMDB_API_KEY: tmdb-key\nOMDB_API_KEY: omdb-key\n")
            .await?;
    assert_eq!(service.provider().await?.name(), "tmdb");

    let results = service.search("Serenity", None).await?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].imdb_id.as_deref(), Some("tt0379786"));
    assert_eq!(results[0].year, "2005");
    assert!(results[0].poster_url.as_deref().unwrap().ends_with("/images/serenity.jpg"));

    let results = service.search("Dark", None).await?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Dark");
    assert_eq!(results[0].media_type, MediaType::Series);
    assert_eq!(results[0].imdb_id.as_deref(), Some("tt5753856"));

    assert!(service.search("Nothing", None).await?.is_empty());

    let detail = service.get_details("tt5753856").await?.unwrap();
    assert_eq!(detail.media_type, MediaType::Series);
    assert_eq!(detail.year, "2017");
    assert!(detail.background_url.unwrap().ends_with("/images/dark-wide.jpg"));
    assert!(service.get_details("tt0000000").await?.is_none());

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_tmdb_rejected_key_is_a_configuration_error() -> anyhow::Result<()> {
    let (_dir, service) = service_with("METADATA_PROVIDER: tmdb\nTMDB_API_KEY: wrong\n").await?;

    let result = service.search("Serenity", None).await;
    assert!(matches!(result, Err(ArmUiError::MetadataConfig(_))));

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_metadata_outage_is_unavailable() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("arm.yaml");
    tokio::fs::write(&path, "OMDB_API_KEY: omdb-key\n").await?;
    let service = MetadataService::new(
        Arc::new(MetadataKeyCache::new(path)),
        common::endpoints_at(common::UNREACHABLE_URL),
    )?;

    let result = service.search("Serenity", None).await;
    assert!(matches!(result, Err(ArmUiError::MetadataUnavailable(_))));

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_musicbrainz_search() -> anyhow::Result<()> {
    let base = common::spawn_stub(provider_stub()).await?;
    let client = MusicBrainzClient::new(&common::endpoints_at(&base))?;

    let mut query = MusicSearchQuery::new("OK Computer");
    query.artist = Some("Radiohead".into());
    query.format = Some("CD".into());
    query.country = Some(" ".into());

    let page = client.search(&query).await?;
    assert_eq!(page.total, 42);
    let release = &page.results[0];
    assert_eq!(release.title, "OK Computer");
    assert_eq!(release.artist, "Radiohead");
    assert_eq!(release.year, "1997");
    assert_eq!(release.media_type, "music");
    assert_eq!(release.track_count, Some(12));
    assert_eq!(release.release_type.as_deref(), Some("Album"));
    assert_eq!(release.label.as_deref(), Some("Parlophone"));
    assert_eq!(
        release.poster_url.as_deref(),
        Some(format!("{base}/caa/0b6b4ba0-d36f-47bd-b4ea-6a5b91842d29/front-250").as_str())
    );

    let page = client.search(&MusicSearchQuery::new("nothing")).await?;
    assert!(page.results.is_empty());
    assert_eq!(page.total, 0);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_musicbrainz_release_detail() -> anyhow::Result<()> {
    let base = common::spawn_stub(provider_stub()).await?;
    let client = MusicBrainzClient::new(&common::endpoints_at(&base))?;

    let detail = client.get_details("rel-1").await?.unwrap();
    assert_eq!(detail.summary.release_id, "rel-1");
    assert_eq!(detail.summary.artist, "John Lennon & Yoko Ono");
    assert_eq!(detail.summary.year, "1980");
    assert_eq!(detail.summary.track_count, Some(14));
    assert_eq!(detail.summary.format.as_deref(), Some("Vinyl"));
    assert_eq!(detail.catalog_number.as_deref(), Some("GHS 2001"));
    assert_eq!(detail.barcode.as_deref(), Some("075992429927"));
    assert_eq!(detail.status.as_deref(), Some("Official"));

    let tracks: Vec<_> = detail
        .tracks
        .iter()
        .map(|t| (t.number.as_str(), t.title.as_str(), t.length_ms))
        .collect();
    assert_eq!(
        tracks,
        vec![
            ("A1", "(Just Like) Starting Over", Some(216000)),
            ("A2", "Kiss Kiss Kiss", Some(161000)),
            ("B1", "Watching the Wheels", None),
        ]
    );

    let value = serde_json::to_value(&detail)?;
    assert_eq!(value["title"], "Double Fantasy");
    assert_eq!(value["media_type"], "music");

    assert!(client.get_details("missing").await?.is_none());

    Ok(())
}
