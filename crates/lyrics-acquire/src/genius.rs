use crate::credentials::{AuthPlacement, Credentials};
use crate::http::Pacer;
use anyhow::{Context, Result};
use lyrics_model::{GeniusArtistRef, GeniusSong, LyricsError, Song, SongsPage};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

pub const API_BASE: &str = "https://api.genius.com";

/// Credential file stem holding the Genius API access token.
pub const DEFAULT_CREDENTIAL: &str = "genius_key";

/// The largest page size the songs endpoint accepts.
pub const MAX_PER_PAGE: u32 = 50;

pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(500);

/// Client for the Genius REST API.
pub struct GeniusClient {
    http: reqwest::Client,
    credentials: Credentials,
    credential_name: String,
    placement: AuthPlacement,
    base_url: String,
    page_delay: Duration,
}

impl GeniusClient {
    pub fn new(http: reqwest::Client, credentials: Credentials) -> Self {
        Self {
            http,
            credentials,
            credential_name: DEFAULT_CREDENTIAL.to_string(),
            placement: AuthPlacement::QueryParam,
            base_url: API_BASE.to_string(),
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }

    pub fn with_credential(mut self, name: &str, placement: AuthPlacement) -> Self {
        self.credential_name = name.to_string();
        self.placement = placement;
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET an API path and parse the body as JSON.
    async fn request_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = self.url(path);
        let request = self.http.get(&url).query(params);
        let request = self
            .credentials
            .authorize(request, &self.credential_name, self.placement)?;

        tracing::info!(url = %url, params = ?params, "GET");
        let response = request.send().await.map_err(|e| LyricsError::Request {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        tracing::info!(status = status.as_u16(), "Response");
        if !status.is_success() {
            return Err(LyricsError::Http {
                status: status.as_u16(),
                url,
            }
            .into());
        }

        response
            .json::<Value>()
            .await
            .with_context(|| format!("Response from {url} is not valid JSON"))
    }

    /// Search Genius and return the distinct primary artists of the hits.
    pub async fn search(&self, query: &str) -> Result<Vec<GeniusArtistRef>> {
        let body = self.request_json("search", &[("q", query.to_string())]).await?;
        parse_search_artists(&body)
    }

    /// Artist details, as the raw `response.artist` object.
    pub async fn artist(&self, artist_id: u64) -> Result<Value> {
        let body = self.request_json(&format!("artists/{artist_id}"), &[]).await?;
        body.pointer("/response/artist")
            .cloned()
            .with_context(|| format!("No artist {artist_id} in response"))
    }

    /// One page of an artist's songs.
    pub async fn songs_by_artist(&self, artist_id: u64, per_page: u32, page: u32) -> Result<SongsPage> {
        let params = [("per_page", per_page.to_string()), ("page", page.to_string())];
        let body = self
            .request_json(&format!("artists/{artist_id}/songs"), &params)
            .await?;
        parse_songs_page(&body)
    }

    /// Every song of an artist, walking pages until the API runs out.
    pub async fn all_songs_by_artist(&self, artist_id: u64, per_page: u32) -> Result<Vec<GeniusSong>> {
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let mut pacer = Pacer::new(self.page_delay);
        let mut all_songs = Vec::new();
        let mut page = 1;

        loop {
            pacer.wait().await;
            tracing::info!(artist_id, page, "Fetching songs page");
            let result = self.songs_by_artist(artist_id, per_page, page).await?;

            if result.songs.is_empty() {
                break;
            }
            all_songs.extend(result.songs);

            match result.next_page {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        tracing::info!(artist_id, songs = all_songs.len(), "Fetched artist songs");
        Ok(all_songs)
    }
}

/// Fetch an artist's whole catalogue and write it as a songs CSV.
pub async fn fetch_catalog(
    client: &GeniusClient,
    artist_id: u64,
    per_page: u32,
    output: &Path,
) -> Result<Vec<Song>> {
    let songs: Vec<Song> = client
        .all_songs_by_artist(artist_id, per_page)
        .await?
        .into_iter()
        .map(Song::from)
        .collect();

    for (i, song) in songs.iter().enumerate() {
        tracing::debug!(n = i + 1, title = %song.title, url = %song.url, "Song");
    }

    lyrics_catalog::write_songs(output, &songs)?;
    Ok(songs)
}

/// Extract the songs page from an API envelope; a missing `response` is an empty page.
fn parse_songs_page(body: &Value) -> Result<SongsPage> {
    match body.get("response") {
        Some(response) if !response.is_null() => {
            serde_json::from_value(response.clone()).context("Unexpected songs page shape")
        }
        _ => Ok(SongsPage::default()),
    }
}

fn parse_search_artists(body: &Value) -> Result<Vec<GeniusArtistRef>> {
    let hits = body
        .pointer("/response/hits")
        .and_then(Value::as_array)
        .context("Search response has no hits array")?;

    let mut artists: Vec<GeniusArtistRef> = Vec::new();
    for hit in hits {
        let Some(artist) = hit.pointer("/result/primary_artist") else {
            continue;
        };
        let artist: GeniusArtistRef =
            serde_json::from_value(artist.clone()).context("Unexpected artist shape in search hit")?;
        if !artists.iter().any(|a| a.id == artist.id) {
            artists.push(artist);
        }
    }
    Ok(artists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn mock_client(server: &MockServer) -> GeniusClient {
        let mut credentials = Credentials::default();
        credentials.insert("genius_key", "secret");
        GeniusClient::new(reqwest::Client::builder().no_proxy().build().unwrap(), credentials)
            .with_base_url(&server.base_url())
            .with_page_delay(Duration::ZERO)
    }

    fn songs_json(ids: &[u64]) -> Vec<Value> {
        ids.iter()
            .map(|id| {
                json!({
                    "id": id,
                    "title": format!("Song {id}"),
                    "url": format!("https://genius.com/song-{id}"),
                    "primary_artist": {"id": 24580, "name": "Caparezza"}
                })
            })
            .collect()
    }

    fn mock_page<'a>(server: &'a MockServer, page: u32, ids: &[u64], next_page: Option<u32>) -> httpmock::Mock<'a> {
        let body = json!({"response": {"songs": songs_json(ids), "next_page": next_page}});
        server.mock(|when, then| {
            when.method(GET)
                .path("/artists/24580/songs")
                .query_param("page", page.to_string())
                .query_param("per_page", "2")
                .query_param("access_token", "secret");
            then.status(200).json_body(body);
        })
    }

    #[test]
    fn test_parse_songs_page() {
        let body = json!({
            "meta": {"status": 200},
            "response": {
                "songs": [
                    {"id": 10, "title": "Il secondo secondo me", "url": "https://genius.com/a",
                     "primary_artist": {"id": 24580, "name": "Caparezza"}}
                ],
                "next_page": 3
            }
        });
        let page = parse_songs_page(&body).unwrap();
        assert_eq!(page.songs.len(), 1);
        assert_eq!(page.songs[0].title, "Il secondo secondo me");
        assert_eq!(page.next_page, Some(3));
    }

    #[test]
    fn test_missing_response_is_empty_page() {
        let page = parse_songs_page(&json!({"meta": {"status": 404}})).unwrap();
        assert!(page.songs.is_empty());
        assert_eq!(page.next_page, None);

        let page = parse_songs_page(&json!({"response": null})).unwrap();
        assert!(page.songs.is_empty());
    }

    #[test]
    fn test_parse_search_dedups_artists() {
        let body = json!({
            "response": {
                "hits": [
                    {"type": "song", "result": {"title": "A", "primary_artist": {"id": 24580, "name": "Caparezza", "url": "https://genius.com/artists/Caparezza"}}},
                    {"type": "song", "result": {"title": "B", "primary_artist": {"id": 24580, "name": "Caparezza", "url": "https://genius.com/artists/Caparezza"}}},
                    {"type": "song", "result": {"title": "C", "primary_artist": {"id": 7, "name": "Other"}}},
                    {"type": "song", "result": {"title": "D"}}
                ]
            }
        });
        let artists = parse_search_artists(&body).unwrap();
        assert_eq!(artists.len(), 2);
        assert_eq!(artists[0].name, "Caparezza");
        assert_eq!(artists[1].id, 7);
    }

    #[test]
    fn test_search_without_hits_is_error() {
        assert!(parse_search_artists(&json!({"response": {}})).is_err());
    }

    #[test]
    fn test_url_joining() {
        let client = GeniusClient::new(reqwest::Client::new(), Credentials::default())
            .with_base_url("http://localhost:8080/");
        assert_eq!(client.url("/artists/1/songs"), "http://localhost:8080/artists/1/songs");
        assert_eq!(client.url("search"), "http://localhost:8080/search");
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_request() {
        let client = GeniusClient::new(reqwest::Client::new(), Credentials::default())
            .with_base_url("http://127.0.0.1:9");
        let err = client.search("Caparezza").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LyricsError>(),
            Some(LyricsError::MissingCredential(name)) if name == "genius_key"
        ));
    }

    #[tokio::test]
    async fn test_all_songs_stops_at_last_page() {
        let server = MockServer::start();
        let first = mock_page(&server, 1, &[1, 2], Some(2));
        let second = mock_page(&server, 2, &[3], None);
        let third = mock_page(&server, 3, &[4], None);

        let songs = mock_client(&server).all_songs_by_artist(24580, 2).await.unwrap();

        assert_eq!(songs.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        first.assert();
        second.assert();
        assert_eq!(third.hits(), 0);
    }

    #[tokio::test]
    async fn test_all_songs_stops_at_empty_page() {
        let server = MockServer::start();
        mock_page(&server, 1, &[1, 2], Some(2));
        let empty = mock_page(&server, 2, &[], Some(3));
        let after = mock_page(&server, 3, &[5], None);

        let songs = mock_client(&server).all_songs_by_artist(24580, 2).await.unwrap();

        assert_eq!(songs.len(), 2);
        empty.assert();
        assert_eq!(after.hits(), 0);
    }

    #[tokio::test]
    async fn test_all_songs_stops_when_next_page_does_not_advance() {
        let server = MockServer::start();
        let first = mock_page(&server, 1, &[1, 2], Some(1));

        let songs = mock_client(&server).all_songs_by_artist(24580, 2).await.unwrap();

        assert_eq!(songs.len(), 2);
        first.assert_hits(1);
    }

    #[tokio::test]
    async fn test_http_error_is_typed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/artists/24580/songs");
            then.status(401).json_body(json!({"meta": {"status": 401}}));
        });

        let err = mock_client(&server).all_songs_by_artist(24580, 2).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LyricsError>(),
            Some(LyricsError::Http { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_catalog_writes_csv() {
        let server = MockServer::start();
        mock_page(&server, 1, &[1, 2], None);
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("artist_songs.csv");

        let songs = fetch_catalog(&mock_client(&server), 24580, 2, &output).await.unwrap();

        assert_eq!(songs.len(), 2);
        assert_eq!(lyrics_catalog::read_songs(&output).unwrap(), songs);
        assert_eq!(songs[0].primary_artist, "Caparezza");
    }
}
