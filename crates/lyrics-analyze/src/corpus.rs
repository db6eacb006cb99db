use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A directory of album directories holding one `.txt` file per song.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub root: PathBuf,
    pub albums: Vec<AlbumDir>,
}

#[derive(Debug, Clone)]
pub struct AlbumDir {
    pub path: PathBuf,
    /// Album heading cleaned for display.
    pub name: String,
    pub songs: Vec<SongFile>,
}

#[derive(Debug, Clone)]
pub struct SongFile {
    pub path: PathBuf,
    /// File stem.
    pub name: String,
}

impl Corpus {
    /// Scan `root`. Albums and songs are sorted by file name; loose files at
    /// the top level and non-`.txt` files inside albums are ignored.
    pub fn open(root: &Path) -> Result<Self> {
        let mut album_paths = sorted_entries(root)?;
        album_paths.retain(|p| p.is_dir());

        let mut albums = Vec::with_capacity(album_paths.len());
        for path in album_paths {
            let songs: Vec<SongFile> = sorted_entries(&path)?
                .into_iter()
                .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("txt"))
                .map(|p| SongFile {
                    name: file_stem(&p),
                    path: p,
                })
                .collect();

            let dir_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            albums.push(AlbumDir {
                name: display_album_name(&dir_name),
                path,
                songs,
            });
        }

        tracing::debug!(root = %root.display(), albums = albums.len(), "Opened corpus");
        Ok(Self {
            root: root.to_path_buf(),
            albums,
        })
    }
}

impl AlbumDir {
    /// Sibling file holding this album's analysis (`<album dir>.json`).
    pub fn analysis_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".json");
        PathBuf::from(name)
    }
}

impl SongFile {
    /// Non-blank lines of the song, trimmed at the end.
    pub fn lines(&self) -> Result<Vec<String>> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        Ok(text
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.trim().is_empty())
            .map(String::from)
            .collect())
    }
}

/// `album:"Prisoner 709"(2017)` -> `Prisoner 709(2017)`.
pub fn display_album_name(dir_name: &str) -> String {
    let name = dir_name.strip_prefix("album:").unwrap_or(dir_name);
    name.replace('"', "").trim().to_string()
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();
    Ok(paths)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
