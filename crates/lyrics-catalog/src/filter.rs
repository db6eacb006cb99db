use anyhow::{Context, Result};
use lyrics_model::Song;
use regex::Regex;

/// Title keywords that mark alternate versions and interludes.
pub const DEFAULT_EXCLUDE: &str = "remix|live|demo|radio|skit";

/// Keeps the songs of one artist whose titles don't match an exclusion pattern.
#[derive(Debug, Clone)]
pub struct SongFilter {
    primary_artist: Option<String>,
    exclude: Option<Regex>,
}

impl SongFilter {
    /// `exclude` is matched against the lowercased title.
    pub fn new(primary_artist: Option<String>, exclude: Option<&str>) -> Result<Self> {
        let exclude = exclude
            .filter(|p| !p.is_empty())
            .map(|p| Regex::new(p).with_context(|| format!("Invalid exclude pattern: {p}")))
            .transpose()?;
        Ok(Self {
            primary_artist,
            exclude,
        })
    }

    pub fn keeps(&self, song: &Song) -> bool {
        if let Some(artist) = &self.primary_artist {
            if &song.primary_artist != artist {
                return false;
            }
        }
        match &self.exclude {
            Some(re) => !re.is_match(&song.title.to_lowercase()),
            None => true,
        }
    }

    pub fn apply(&self, songs: Vec<Song>) -> Vec<Song> {
        songs.into_iter().filter(|s| self.keeps(s)).collect()
    }
}
