use anyhow::{Context, Result};
use lyrics_model::LyricsError;
use std::time::Duration;

/// Lyrics sites serve an error page to non-browser agents.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the HTTP client shared by one run.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// GET a page and return its body.
///
/// Transport failures and non-success statuses are reported as
/// [`LyricsError`] so batch callers can tell them apart from parse problems.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String> {
    tracing::debug!(url = %url, "GET");
    let response = client.get(url).send().await.map_err(|e| LyricsError::Request {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(LyricsError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        }
        .into());
    }

    let body = response.text().await.map_err(|e| LyricsError::Request {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    tracing::debug!(url = %url, bytes = body.len(), "Received page");
    Ok(body)
}

/// True if the error came from the network rather than from page content.
pub fn is_request_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<LyricsError>()
        .is_some_and(LyricsError::is_request_error)
}

/// Fixed delay between sequential requests.
///
/// The first [`wait`](Pacer::wait) returns immediately; every later one
/// sleeps for the configured delay.
#[derive(Debug, Clone)]
pub struct Pacer {
    delay: Duration,
    started: bool,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: false,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn wait(&mut self) {
        if self.started && !self.delay.is_zero() {
            tracing::debug!(delay_ms = self.delay.as_millis() as u64, "Waiting before next request");
            tokio::time::sleep(self.delay).await;
        }
        self.started = true;
    }
}
