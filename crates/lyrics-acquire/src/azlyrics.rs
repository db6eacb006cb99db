use crate::html::{has_class, is_classless, stripped_text};
use crate::http::{fetch_page, is_request_error, Pacer};
use crate::{normalize, output};
use anyhow::Result;
use lyrics_model::{AlbumLinks, LyricsError, ScrapedLyrics};
use scraper::{ElementRef, Html, Selector};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// AZLyrics bans addresses that fetch faster than this.
pub const DEFAULT_SONG_DELAY: Duration = Duration::from_secs(10);
pub const DEFAULT_ALBUM_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Wait between songs of the same album.
    pub song_delay: Duration,
    /// Wait between albums.
    pub album_delay: Duration,
    /// Don't re-fetch songs already saved by an earlier run.
    pub skip_existing: bool,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            song_delay: DEFAULT_SONG_DELAY,
            album_delay: DEFAULT_ALBUM_DELAY,
            skip_existing: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    pub albums: usize,
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Scrape every album of an AZLyrics artist page into `output_dir`.
///
/// Each album gets its own directory named after the album heading; each song
/// is saved as `<title>.txt`. Song failures are logged and counted, never fatal.
pub async fn scrape_artist(
    client: &reqwest::Client,
    page_url: &str,
    output_dir: &Path,
    options: &ScrapeOptions,
) -> Result<ScrapeReport> {
    tracing::info!(url = %page_url, "Fetching album links");
    let html = fetch_page(client, page_url).await?;
    let albums = parse_album_index(&html, page_url);

    let mut report = ScrapeReport::default();
    if albums.is_empty() {
        tracing::warn!(url = %page_url, "No albums found");
        return Ok(report);
    }
    tracing::info!(albums = albums.len(), "Found albums");

    let mut album_pacer = Pacer::new(options.album_delay);
    for album in &albums {
        scrape_album(client, album, output_dir, options, &mut album_pacer, &mut report).await?;
        report.albums += 1;
    }

    tracing::info!(
        dir = %output_dir.display(),
        albums = report.albums,
        saved = report.saved,
        skipped = report.skipped,
        failed = report.failed,
        "Done"
    );
    Ok(report)
}

async fn scrape_album(
    client: &reqwest::Client,
    album: &AlbumLinks,
    output_dir: &Path,
    options: &ScrapeOptions,
    album_pacer: &mut Pacer,
    report: &mut ScrapeReport,
) -> Result<()> {
    let album_dir = output_dir.join(normalize::sanitize_path_component(&album.name));
    fs::create_dir_all(&album_dir)?;
    let mut sources = output::load_sources(&album_dir, &album.name)?;

    tracing::info!(album = %album.name, songs = album.urls.len(), "Processing album");

    // Album delay is taken before the album's first request; fully skipped albums take none.
    let mut pacer = Pacer::new(options.song_delay);
    let mut requested = false;
    let total = album.urls.len();
    for (i, url) in album.urls.iter().enumerate() {
        if options.skip_existing {
            if let Some(path) = already_saved(&album_dir, sources.file_for(url)) {
                tracing::info!(path = %path.display(), "Already saved, skipping");
                report.skipped += 1;
                continue;
            }
        }

        if !requested {
            album_pacer.wait().await;
            requested = true;
        }
        pacer.wait().await;
        tracing::info!(n = i + 1, total, url = %url, "Scraping");

        match scrape_song(client, url).await {
            Ok(song) => {
                let filename = format!("{}.txt", normalize::sanitize_filename(&song.title));
                let saved = output::save_lyrics(&album_dir.join(&filename), &song.lyrics)
                    .and_then(|()| {
                        sources.record(url, &filename);
                        output::write_sources(&album_dir, &sources)
                    });
                match saved {
                    Ok(()) => report.saved += 1,
                    Err(e) => {
                        tracing::error!(file = %filename, error = %e, "Error saving lyrics");
                        report.failed += 1;
                    }
                }
            }
            Err(e) if is_request_error(&e) => {
                tracing::error!(url = %url, error = %e, "Error fetching song");
                report.failed += 1;
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Could not extract lyrics");
                report.failed += 1;
            }
        }
    }

    Ok(())
}

fn already_saved(album_dir: &Path, file: Option<&str>) -> Option<PathBuf> {
    let path = album_dir.join(file?);
    path.is_file().then_some(path)
}

/// Fetch and parse one song page.
pub async fn scrape_song(client: &reqwest::Client, url: &str) -> Result<ScrapedLyrics> {
    let html = fetch_page(client, url).await?;
    Ok(parse_song_page(&html, url)?)
}

/// Group the song links of an artist page by album, in page order.
///
/// The `#listAlbum` container holds a flat run of `div.album` headings, each
/// followed by the `div.listalbum-item` entries of that album. Items seen
/// before the first heading are dropped. Relative links are resolved
/// against `page_url`.
pub fn parse_album_index(html: &str, page_url: &str) -> Vec<AlbumLinks> {
    let document = Html::parse_document(html);
    let list_sel = Selector::parse("div#listAlbum").expect("valid selector");
    let link_sel = Selector::parse("a[href]").expect("valid selector");

    let Some(list) = document.select(&list_sel).next() else {
        return Vec::new();
    };

    let base = reqwest::Url::parse(page_url).ok();
    let mut albums: Vec<AlbumLinks> = Vec::new();

    for child in list.children().filter_map(ElementRef::wrap) {
        if child.value().name() != "div" {
            continue;
        }

        if has_class(child, "album") {
            albums.push(AlbumLinks {
                name: stripped_text(child, ""),
                urls: Vec::new(),
            });
        } else if has_class(child, "listalbum-item") {
            let Some(current) = albums.last_mut() else {
                continue;
            };
            let href = child
                .select(&link_sel)
                .next()
                .and_then(|a| a.value().attr("href"));
            if let Some(href) = href {
                current.urls.push(resolve_href(base.as_ref(), href));
            }
        }
    }

    albums
}

fn resolve_href(base: Option<&reqwest::Url>, href: &str) -> String {
    match base.and_then(|b| b.join(href).ok()) {
        Some(url) => url.to_string(),
        None => href.to_string(),
    }
}

/// Extract the title and lyrics from an AZLyrics song page.
///
/// Layout inside the main `div.col-xs-12.col-lg-8` column:
/// `div.ringtone`, then a `<b>` holding the quoted title, then a class-less
/// `div` with the lyrics, then `div.noprint`.
pub fn parse_song_page(html: &str, url: &str) -> Result<ScrapedLyrics, LyricsError> {
    let document = Html::parse_document(html);
    let div_sel = Selector::parse("div").expect("valid selector");
    let ringtone_sel = Selector::parse("div.ringtone").expect("valid selector");
    let noprint_sel = Selector::parse("div.noprint").expect("valid selector");

    let missing = |what: &str| LyricsError::MissingElement {
        what: what.to_string(),
        url: url.to_string(),
    };

    let main = document
        .select(&div_sel)
        .find(|div| has_class(*div, "col-xs-12") && has_class(*div, "col-lg-8"))
        .ok_or_else(|| missing("main content div"))?;

    let ringtone = main
        .select(&ringtone_sel)
        .next()
        .ok_or_else(|| missing("ringtone div"))?;

    let title = ringtone
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "b")
        .map(|b| stripped_text(b, ""))
        .unwrap_or_default();

    let noprint = main
        .select(&noprint_sel)
        .next()
        .ok_or_else(|| missing("noprint div"))?;

    let lyrics = ringtone
        .next_siblings()
        .take_while(|node| node.id() != noprint.id())
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "div" && is_classless(*el))
        .map(|div| stripped_text(div, "\n"))
        .filter(|text| !text.is_empty())
        .ok_or_else(|| missing("lyrics"))?;

    if title.is_empty() {
        return Err(missing("song title"));
    }

    Ok(ScrapedLyrics { title, lyrics })
}
