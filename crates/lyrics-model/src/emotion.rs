use serde::{Deserialize, Serialize};

/// A single label/score pair returned by an emotion classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    pub score: f64,
}

/// One analysed lyric line, the row format of an album's analysis file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineAnalysis {
    pub album: String,
    pub song: String,
    pub lyric: String,
    /// Top-k predictions, highest score first.
    pub predictions: Vec<EmotionScore>,
}

impl LineAnalysis {
    /// The highest scoring prediction, if the classifier returned any.
    pub fn top(&self) -> Option<&EmotionScore> {
        self.predictions.first()
    }
}

/// Display color for an emotion label.
pub fn emotion_color(label: &str) -> &'static str {
    match label {
        "joy" => "yellow",
        "sadness" => "blue",
        "anger" => "red",
        "fear" => "purple",
        _ => "gray",
    }
}
