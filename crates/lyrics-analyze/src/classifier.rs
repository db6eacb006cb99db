use anyhow::{Context, Result};
use async_trait::async_trait;
use lyrics_acquire::credentials::Credentials;
use lyrics_model::{EmotionScore, LyricsError};
use serde::{Deserialize, Serialize};

/// Italian emotion model (joy, sadness, anger, fear) served by the hosted inference API.
pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/MilaNLProc/feel-it-italian-emotion";

/// Credential file stem holding the inference API token.
pub const DEFAULT_CREDENTIAL: &str = "hf_token";

pub const DEFAULT_TOP_K: usize = 2;
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Assigns emotion labels to lines of text.
#[async_trait]
pub trait EmotionClassifier {
    /// One prediction list per input line, in input order, best first.
    async fn classify(&self, lines: &[String]) -> Result<Vec<Vec<EmotionScore>>>;
}

/// Text classification over a hosted inference HTTP endpoint.
pub struct InferenceClassifier {
    http: reqwest::Client,
    endpoint: String,
    token: String,
    top_k: usize,
    batch_size: usize,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a [String],
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    top_k: usize,
}

/// The endpoint answers a single input with a flat list and a batch with a
/// list of lists.
#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Batch(Vec<Vec<EmotionScore>>),
    Single(Vec<EmotionScore>),
}

impl InferenceClassifier {
    pub fn new(http: reqwest::Client, endpoint: &str, token: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.to_string(),
            token: token.to_string(),
            top_k: DEFAULT_TOP_K,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Build a classifier whose token comes from the named credential file.
    pub fn from_credentials(
        http: reqwest::Client,
        endpoint: &str,
        credentials: &Credentials,
        credential_name: &str,
    ) -> Result<Self> {
        let token = credentials.require(credential_name)?;
        Ok(Self::new(http, endpoint, token))
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    async fn classify_batch(&self, batch: &[String]) -> Result<Vec<Vec<EmotionScore>>> {
        let body = InferenceRequest {
            inputs: batch,
            parameters: InferenceParameters { top_k: self.top_k },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| LyricsError::Request {
                url: self.endpoint.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), detail = %detail, "Inference request rejected");
            return Err(LyricsError::Http {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            }
            .into());
        }

        let parsed: InferenceResponse = response
            .json()
            .await
            .context("Unexpected inference response shape")?;
        let predictions = into_predictions(parsed, batch.len())?;
        Ok(predictions
            .into_iter()
            .map(|p| rank(p, self.top_k))
            .collect())
    }
}

#[async_trait]
impl EmotionClassifier for InferenceClassifier {
    async fn classify(&self, lines: &[String]) -> Result<Vec<Vec<EmotionScore>>> {
        let mut all = Vec::with_capacity(lines.len());
        for batch in lines.chunks(self.batch_size) {
            tracing::debug!(lines = batch.len(), "Classifying batch");
            all.extend(self.classify_batch(batch).await?);
        }
        Ok(all)
    }
}

fn into_predictions(response: InferenceResponse, expected: usize) -> Result<Vec<Vec<EmotionScore>>> {
    let predictions = match response {
        InferenceResponse::Batch(batch) => batch,
        InferenceResponse::Single(single) if expected == 1 => vec![single],
        InferenceResponse::Single(_) => {
            anyhow::bail!("Got a single prediction list for {expected} inputs")
        }
    };
    anyhow::ensure!(
        predictions.len() == expected,
        "Classifier returned {} predictions for {expected} lines",
        predictions.len()
    );
    Ok(predictions)
}

/// Sort best first and keep the top `k`.
fn rank(mut scores: Vec<EmotionScore>, k: usize) -> Vec<EmotionScore> {
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores.truncate(k);
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn score(label: &str, score: f64) -> EmotionScore {
        EmotionScore {
            label: label.to_string(),
            score,
        }
    }

    #[test]
    fn test_batch_response() {
        let json = r#"[[{"label":"joy","score":0.9},{"label":"fear","score":0.05}],
                       [{"label":"anger","score":0.7},{"label":"sadness","score":0.2}]]"#;
        let parsed: InferenceResponse = serde_json::from_str(json).unwrap();
        let predictions = into_predictions(parsed, 2).unwrap();
        assert_eq!(predictions[1][0], score("anger", 0.7));
    }

    #[test]
    fn test_single_response_for_one_line() {
        let json = r#"[{"label":"sadness","score":0.8},{"label":"joy","score":0.1}]"#;
        let parsed: InferenceResponse = serde_json::from_str(json).unwrap();
        let predictions = into_predictions(parsed, 1).unwrap();
        assert_eq!(predictions, vec![vec![score("sadness", 0.8), score("joy", 0.1)]]);
    }

    #[test]
    fn test_length_mismatch_is_error() {
        let parsed: InferenceResponse = serde_json::from_str(r#"[[{"label":"joy","score":1.0}]]"#).unwrap();
        assert!(into_predictions(parsed, 3).is_err());
    }

    #[test]
    fn test_rank_orders_and_truncates() {
        let ranked = rank(
            vec![score("fear", 0.1), score("joy", 0.6), score("anger", 0.3)],
            2,
        );
        assert_eq!(ranked, vec![score("joy", 0.6), score("anger", 0.3)]);
    }

    #[test]
    fn test_from_credentials_requires_token() {
        let creds = Credentials::default();
        let result = InferenceClassifier::from_credentials(reqwest::Client::new(), DEFAULT_ENDPOINT, &creds, DEFAULT_CREDENTIAL);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_classify_batches_in_order() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(POST)
                .path("/models/feel-it")
                .header("authorization", "Bearer tok")
                .json_body(json!({"inputs": ["uno", "due"], "parameters": {"top_k": 2}}));
            then.status(200).json_body(json!([
                [{"label": "joy", "score": 0.2}, {"label": "fear", "score": 0.7}],
                [{"label": "anger", "score": 0.9}, {"label": "joy", "score": 0.1}]
            ]));
        });
        let second = server.mock(|when, then| {
            when.method(POST)
                .path("/models/feel-it")
                .json_body(json!({"inputs": ["tre"], "parameters": {"top_k": 2}}));
            then.status(200).json_body(json!([{"label": "sadness", "score": 0.6}]));
        });

        let classifier = InferenceClassifier::new(
            reqwest::Client::builder().no_proxy().build().unwrap(),
            &server.url("/models/feel-it"),
            "tok",
        )
        .with_batch_size(2);
        let lines = vec!["uno".to_string(), "due".to_string(), "tre".to_string()];

        let predictions = classifier.classify(&lines).await.unwrap();

        assert_eq!(
            predictions,
            vec![
                vec![score("fear", 0.7), score("joy", 0.2)],
                vec![score("anger", 0.9), score("joy", 0.1)],
                vec![score("sadness", 0.6)],
            ]
        );
        first.assert();
        second.assert();
    }

    #[tokio::test]
    async fn test_classify_rejected_request() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/models/feel-it");
            then.status(503).body("Model is currently loading");
        });

        let classifier = InferenceClassifier::new(
            reqwest::Client::builder().no_proxy().build().unwrap(),
            &server.url("/models/feel-it"),
            "tok",
        );
        let err = classifier.classify(&["uno".to_string()]).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LyricsError>(),
            Some(LyricsError::Http { status: 503, .. })
        ));
    }
}
