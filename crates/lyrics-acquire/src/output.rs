use crate::normalize;
use anyhow::{Context, Result};
use lyrics_model::AlbumSources;
use std::fs;
use std::path::Path;

/// Provenance file kept in every scraped album directory.
pub const SOURCES_FILE: &str = ".sources.json";

/// Write lyrics to a text file, creating parent directories as needed.
///
/// The text is NFC-normalized with runs of blank lines collapsed.
pub fn save_lyrics(path: &Path, lyrics: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let text = normalize::normalize_text(lyrics);
    let text = normalize::collapse_blank_lines(&text);
    fs::write(path, &text).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), lines = text.lines().count(), "Saved lyrics");
    Ok(())
}

/// Load an album directory's provenance, or start a fresh one.
pub fn load_sources(album_dir: &Path, album: &str) -> Result<AlbumSources> {
    let path = album_dir.join(SOURCES_FILE);
    if !path.exists() {
        return Ok(AlbumSources::new(album));
    }
    let text = fs::read_to_string(&path)?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn write_sources(album_dir: &Path, sources: &AlbumSources) -> Result<()> {
    let path = album_dir.join(SOURCES_FILE);
    let json = serde_json::to_string_pretty(sources)?;
    fs::write(&path, json)?;
    tracing::debug!(path = %path.display(), entries = sources.entries.len(), "Wrote album sources");
    Ok(())
}
