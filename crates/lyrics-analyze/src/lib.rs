use anyhow::{Context, Result};
use lyrics_model::LineAnalysis;
use std::fs;
use std::path::Path;

pub mod classifier;
pub mod corpus;
pub mod render;

pub use classifier::{EmotionClassifier, InferenceClassifier};
pub use corpus::Corpus;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzeReport {
    pub albums_written: usize,
    pub albums_skipped: usize,
    pub lines: usize,
}

/// Classify every line of every song in a corpus, one output file per album.
///
/// Each album directory gets a sibling `<album dir>.json` holding its
/// [`LineAnalysis`] rows. Albums that already have that file are skipped, so
/// an interrupted run picks up where it stopped.
pub async fn analyze_corpus<C: EmotionClassifier + ?Sized>(
    root: &Path,
    classifier: &C,
) -> Result<AnalyzeReport> {
    let corpus = Corpus::open(root)?;
    let mut report = AnalyzeReport::default();

    for album in &corpus.albums {
        let output = album.analysis_path();
        if output.exists() {
            tracing::info!(album = %album.name, path = %output.display(), "Skipping album, analysis already exists");
            report.albums_skipped += 1;
            continue;
        }
        if album.songs.is_empty() {
            tracing::warn!(album = %album.name, "Album has no songs");
            continue;
        }

        tracing::info!(album = %album.name, songs = album.songs.len(), "Processing album");
        let mut rows: Vec<LineAnalysis> = Vec::new();

        for song in &album.songs {
            tracing::info!(album = %album.name, song = %song.name, "Processing song");
            let lines = song.lines()?;
            if lines.is_empty() {
                tracing::warn!(song = %song.name, "Song has no lyrics");
                continue;
            }

            let predictions = classifier
                .classify(&lines)
                .await
                .with_context(|| format!("Error processing {} - {}", album.name, song.name))?;
            anyhow::ensure!(
                predictions.len() == lines.len(),
                "Classifier returned {} predictions for {} lines of {}",
                predictions.len(),
                lines.len(),
                song.name
            );

            rows.extend(lines.into_iter().zip(predictions).map(|(lyric, predictions)| {
                LineAnalysis {
                    album: album.name.clone(),
                    song: song.name.clone(),
                    lyric,
                    predictions,
                }
            }));
        }

        let json = serde_json::to_string_pretty(&rows)?;
        fs::write(&output, json).with_context(|| format!("Failed to write {}", output.display()))?;
        tracing::info!(path = %output.display(), lines = rows.len(), "Wrote album analysis");

        report.albums_written += 1;
        report.lines += rows.len();
    }

    Ok(report)
}

/// Read an album analysis file.
pub fn read_analysis(path: &Path) -> Result<Vec<LineAnalysis>> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
