use crate::html::stripped_text;
use crate::http::{fetch_page, Pacer};
use crate::{normalize, output};
use anyhow::Result;
use lyrics_model::Song;
use scraper::{Html, Selector};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Result of scraping one URL; `lyrics` is `None` when nothing was found
/// or the request failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeOutcome {
    pub url: String,
    pub lyrics: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogReport {
    pub saved: usize,
    pub failed: usize,
}

/// Lyrics text from a Genius song page.
///
/// Lyrics are split across several `div[data-lyrics-container]` blocks; each
/// block becomes one stanza group and the groups are separated by a blank line.
pub fn extract_lyrics(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let container_sel = Selector::parse("div[data-lyrics-container]").expect("valid selector");

    let blocks: Vec<String> = document
        .select(&container_sel)
        .map(|div| stripped_text(div, "\n"))
        .filter(|text| !text.is_empty())
        .collect();

    if blocks.is_empty() {
        return None;
    }
    Some(blocks.join("\n\n"))
}

/// Fetch one Genius song page and extract its lyrics.
pub async fn scrape_lyrics(client: &reqwest::Client, url: &str) -> Result<Option<String>> {
    tracing::info!(url = %url, "Scraping");
    let html = fetch_page(client, url).await?;

    let lyrics = extract_lyrics(&html);
    match &lyrics {
        Some(text) => tracing::info!(url = %url, lines = text.lines().count(), "Found lyrics"),
        None => tracing::warn!(url = %url, "No lyrics containers found"),
    }
    Ok(lyrics)
}

/// Scrape several pages in order, waiting `delay` between requests.
///
/// A failed request records `None` for its URL. With `stop_on_error` the
/// batch ends at the first failure instead, without recording that URL.
pub async fn scrape_many(
    client: &reqwest::Client,
    urls: &[String],
    delay: Duration,
    stop_on_error: bool,
) -> Vec<ScrapeOutcome> {
    let mut pacer = Pacer::new(delay);
    let mut outcomes = Vec::with_capacity(urls.len());

    for url in urls {
        pacer.wait().await;
        match scrape_lyrics(client, url).await {
            Ok(lyrics) => outcomes.push(ScrapeOutcome {
                url: url.clone(),
                lyrics,
            }),
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Error scraping");
                if stop_on_error {
                    break;
                }
                outcomes.push(ScrapeOutcome {
                    url: url.clone(),
                    lyrics: None,
                });
            }
        }
    }

    outcomes
}

/// Scrape every song of a catalogue and save each one as `<title>.txt`.
pub async fn scrape_catalog(
    client: &reqwest::Client,
    songs: &[Song],
    output_dir: &Path,
    delay: Duration,
    stop_on_error: bool,
) -> Result<CatalogReport> {
    tracing::info!(songs = songs.len(), "Scraping catalogue");
    let urls: Vec<String> = songs.iter().map(|s| s.url.clone()).collect();
    let outcomes = scrape_many(client, &urls, delay, stop_on_error).await;

    let mut report = CatalogReport::default();
    for (song, outcome) in songs.iter().zip(&outcomes) {
        match &outcome.lyrics {
            Some(lyrics) => {
                let path = output_dir.join(normalize::title_filename(&song.title));
                match output::save_lyrics(&path, lyrics) {
                    Ok(()) => report.saved += 1,
                    Err(e) => {
                        tracing::error!(title = %song.title, error = %e, "Error saving lyrics");
                        report.failed += 1;
                    }
                }
            }
            None => {
                tracing::warn!(title = %song.title, url = %song.url, "Failed to scrape lyrics");
                report.failed += 1;
            }
        }
    }

    tracing::info!(saved = report.saved, failed = report.failed, "Catalogue scrape finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn test_client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    fn lyrics_page(text: &str) -> String {
        format!(r#"<html><body><div data-lyrics-container="true">{text}</div></body></html>"#)
    }

    #[test]
    fn test_extract_joins_containers() {
        let html = r#"
        <html><body>
        <div class="Header">Caparezza - Fuori dal tunnel</div>
        <div data-lyrics-container="true" class="Lyrics__Container">
            [Strofa 1]<br>Giro per le strade<br><a href="/x"><span>e vedo gente</span></a><br>
        </div>
        <div data-lyrics-container="true">   </div>
        <div data-lyrics-container="true">[Ritornello]<br>Fuori dal tunnel</div>
        </body></html>
        "#;
        assert_eq!(
            extract_lyrics(html).as_deref(),
            Some("[Strofa 1]\nGiro per le strade\ne vedo gente\n\n[Ritornello]\nFuori dal tunnel")
        );
    }

    #[test]
    fn test_extract_without_containers() {
        let html = "<html><body><div class=\"lyrics\">Not marked up</div></body></html>";
        assert_eq!(extract_lyrics(html), None);
    }

    #[test]
    fn test_extract_only_empty_containers() {
        let html = r#"<div data-lyrics-container="true"> <br> </div>"#;
        assert_eq!(extract_lyrics(html), None);
    }

    #[tokio::test]
    async fn test_scrape_many_records_failures() {
        // Nothing listens on the discard port, so every request fails fast.
        let client = test_client();
        let urls = vec![
            "http://127.0.0.1:9/a".to_string(),
            "http://127.0.0.1:9/b".to_string(),
        ];

        let outcomes = scrape_many(&client, &urls, Duration::ZERO, false).await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.lyrics.is_none()));
        assert_eq!(outcomes[1].url, "http://127.0.0.1:9/b");

        let outcomes = scrape_many(&client, &urls, Duration::ZERO, true).await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_scrape_catalog_continues_after_write_error() {
        let server = MockServer::start();
        let long = server.mock(|when, then| {
            when.method(GET).path("/long-title-lyrics");
            then.status(200).body(lyrics_page("Prima riga"));
        });
        let tunnel = server.mock(|when, then| {
            when.method(GET).path("/fuori-dal-tunnel-lyrics");
            then.status(200).body(lyrics_page("Fuori dal tunnel<br>della disoccupazione"));
        });

        let dir = tempfile::tempdir().unwrap();
        let songs = vec![
            Song {
                // Longer than any filesystem allows for a single name.
                title: "x".repeat(300),
                url: server.url("/long-title-lyrics"),
                primary_artist: "Caparezza".into(),
            },
            Song {
                title: "Fuori dal tunnel".into(),
                url: server.url("/fuori-dal-tunnel-lyrics"),
                primary_artist: "Caparezza".into(),
            },
        ];

        let report = scrape_catalog(&test_client(), &songs, dir.path(), Duration::ZERO, false)
            .await
            .unwrap();

        assert_eq!(report, CatalogReport { saved: 1, failed: 1 });
        assert_eq!(
            std::fs::read_to_string(dir.path().join("Fuori_dal_tunnel.txt")).unwrap(),
            "Fuori dal tunnel\ndella disoccupazione"
        );
        long.assert();
        tunnel.assert();
    }

    #[tokio::test]
    async fn test_scrape_many_keeps_order_and_missing_lyrics() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/a");
            then.status(200).body(lyrics_page("Verso A"));
        });
        server.mock(|when, then| {
            when.method(GET).path("/b");
            then.status(200).body("<html><body>No lyrics here</body></html>");
        });
        server.mock(|when, then| {
            when.method(GET).path("/c");
            then.status(404);
        });

        let urls = vec![server.url("/a"), server.url("/b"), server.url("/c")];
        let outcomes = scrape_many(&test_client(), &urls, Duration::ZERO, false).await;

        assert_eq!(
            outcomes,
            vec![
                ScrapeOutcome { url: urls[0].clone(), lyrics: Some("Verso A".into()) },
                ScrapeOutcome { url: urls[1].clone(), lyrics: None },
                ScrapeOutcome { url: urls[2].clone(), lyrics: None },
            ]
        );
    }
}
