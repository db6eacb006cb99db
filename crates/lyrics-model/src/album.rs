use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One album section of an artist index page, in page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumLinks {
    /// Album heading as shown on the page (e.g., `album: "Prisoner 709" (2017)`).
    pub name: String,
    /// Absolute song page URLs.
    pub urls: Vec<String>,
}

/// Title and lyrics extracted from a single song page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedLyrics {
    pub title: String,
    pub lyrics: String,
}

/// Where a saved lyrics file came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub url: String,
    /// File name inside the album directory.
    pub file: String,
    pub fetched_at: String,
}

/// Provenance of every lyrics file in one album directory, keyed by song URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumSources {
    pub album: String,
    pub entries: BTreeMap<String, SourceEntry>,
}

impl AlbumSources {
    pub fn new(album: &str) -> Self {
        Self {
            album: album.to_string(),
            entries: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, url: &str, file: &str) {
        self.entries.insert(
            url.to_string(),
            SourceEntry {
                url: url.to_string(),
                file: file.to_string(),
                fetched_at: chrono::Utc::now().to_rfc3339(),
            },
        );
    }

    pub fn file_for(&self, url: &str) -> Option<&str> {
        self.entries.get(url).map(|e| e.file.as_str())
    }
}
