use thiserror::Error;

/// Failures that callers distinguish instead of just reporting.
#[derive(Debug, Error)]
pub enum LyricsError {
    #[error("credential '{0}' not found")]
    MissingCredential(String),

    #[error("HTTP {status} for {url}")]
    Http { status: u16, url: String },

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("could not find {what} in {url}")]
    MissingElement { what: String, url: String },
}

impl LyricsError {
    /// True for transport and HTTP status failures, as opposed to content problems.
    pub fn is_request_error(&self) -> bool {
        matches!(self, LyricsError::Http { .. } | LyricsError::Request { .. })
    }
}
