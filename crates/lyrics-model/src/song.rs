use serde::{Deserialize, Serialize};

/// One row of an artist's song catalogue.
///
/// This is the shape written to and read from the songs CSV
/// (`title,url,primary_artist`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    /// Genius song page URL.
    pub url: String,
    /// Name of the song's primary artist; empty if the API omitted it.
    #[serde(default)]
    pub primary_artist: String,
}

/// The subset of a Genius song object that the tools care about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeniusSong {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub primary_artist: Option<GeniusArtistRef>,
}

/// An artist reference embedded in Genius song and search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeniusArtistRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// One page of `/artists/{id}/songs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SongsPage {
    #[serde(default)]
    pub songs: Vec<GeniusSong>,
    /// Number of the following page, `None` on the last page.
    #[serde(default)]
    pub next_page: Option<u32>,
}

impl From<GeniusSong> for Song {
    fn from(song: GeniusSong) -> Self {
        Song {
            title: song.title,
            url: song.url,
            primary_artist: song.primary_artist.map(|a| a.name).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_songs_page_from_api_json() {
        let json = r#"{
            "songs": [
                {
                    "id": 1,
                    "title": "Fuori dal tunnel",
                    "url": "https://genius.com/Caparezza-fuori-dal-tunnel-lyrics",
                    "primary_artist": {"id": 24580, "name": "Caparezza", "url": "https://genius.com/artists/Caparezza"},
                    "annotation_count": 12
                },
                {"id": 2, "title": "Untitled", "url": "https://genius.com/x"}
            ],
            "next_page": 2
        }"#;

        let page: SongsPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.songs.len(), 2);
        assert_eq!(page.next_page, Some(2));

        let songs: Vec<Song> = page.songs.into_iter().map(Song::from).collect();
        assert_eq!(songs[0].primary_artist, "Caparezza");
        assert_eq!(songs[1].primary_artist, "");
    }

    #[test]
    fn test_last_page_has_null_next_page() {
        let page: SongsPage = serde_json::from_str(r#"{"songs": [], "next_page": null}"#).unwrap();
        assert!(page.songs.is_empty());
        assert_eq!(page.next_page, None);
    }
}
