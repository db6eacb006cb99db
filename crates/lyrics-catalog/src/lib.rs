use anyhow::{Context, Result};
use lyrics_model::Song;
use std::fs;
use std::path::Path;

pub mod filter;

pub use filter::SongFilter;

/// Read a songs CSV (`title,url,primary_artist`).
pub fn read_songs(path: &Path) -> Result<Vec<Song>> {
    let mut reader = csv::ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut songs = Vec::new();
    for (row, record) in reader.deserialize::<Song>().enumerate() {
        let song = record.with_context(|| format!("Bad row {} in {}", row + 1, path.display()))?;
        songs.push(song);
    }

    tracing::debug!(path = %path.display(), songs = songs.len(), "Read songs CSV");
    Ok(songs)
}

/// Write songs to a CSV file with a header row.
///
/// An empty list writes nothing and returns `Ok(false)`.
pub fn write_songs(path: &Path, songs: &[Song]) -> Result<bool> {
    if songs.is_empty() {
        tracing::warn!(path = %path.display(), "No songs to save");
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for song in songs {
        writer.serialize(song)?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), songs = songs.len(), "Wrote songs CSV");
    Ok(true)
}

/// Filter a songs CSV into a new one. Returns the number of songs kept.
pub fn clean(input: &Path, output: &Path, filter: &SongFilter) -> Result<usize> {
    let songs = read_songs(input)?;
    let total = songs.len();
    let kept = filter.apply(songs);

    tracing::info!(
        total,
        kept = kept.len(),
        dropped = total - kept.len(),
        "Filtered song catalogue"
    );

    write_songs(output, &kept)?;
    Ok(kept.len())
}
