use anyhow::{Context, Result};
use lyrics_model::LyricsError;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Where a credential goes on an outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPlacement {
    /// `access_token=<value>` query parameter.
    #[default]
    QueryParam,
    /// A request header chosen from the credential name.
    Header,
}

/// Named secrets loaded from `*.id` files.
///
/// Each file contributes one credential: the file stem is the name and the
/// trimmed contents are the value (e.g., `genius_key.id`).
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    values: BTreeMap<String, String>,
}

impl Credentials {
    /// Load every `*.id` file directly inside `dir`.
    ///
    /// Unreadable files are skipped with an error log. A missing directory or
    /// one without credential files yields an empty set and a warning.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut values = BTreeMap::new();

        if dir.is_dir() {
            let entries = fs::read_dir(dir)
                .with_context(|| format!("Failed to list credentials in {}", dir.display()))?;
            for entry in entries {
                let path = entry?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("id") || !path.is_file() {
                    continue;
                }
                let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                match fs::read_to_string(&path) {
                    Ok(contents) => {
                        tracing::info!(credential = %name, "Loaded credential");
                        values.insert(name.to_string(), contents.trim().to_string());
                    }
                    Err(e) => {
                        tracing::error!(path = %path.display(), error = %e, "Error loading credential file");
                    }
                }
            }
        }

        if values.is_empty() {
            tracing::warn!(dir = %dir.display(), "No credential files (.id) found");
        }

        Ok(Self { values })
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.trim().to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn require(&self, name: &str) -> Result<&str, LyricsError> {
        self.get(name)
            .ok_or_else(|| LyricsError::MissingCredential(name.to_string()))
    }

    /// Credential names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Attach credential `name` to a request.
    pub fn authorize(
        &self,
        request: reqwest::RequestBuilder,
        name: &str,
        placement: AuthPlacement,
    ) -> Result<reqwest::RequestBuilder, LyricsError> {
        let value = self.require(name)?;
        Ok(match placement {
            AuthPlacement::QueryParam => request.query(&[("access_token", value)]),
            AuthPlacement::Header => {
                let (header, value) = auth_header(name, value);
                request.header(header, value)
            }
        })
    }
}

/// Header name and value used to send a credential, chosen by its name.
pub fn auth_header(name: &str, value: &str) -> (&'static str, String) {
    match name.to_lowercase().as_str() {
        "genius_key" | "api_key" | "token" => ("Authorization", format!("Bearer {value}")),
        "client" | "client_id" => ("X-Client-ID", value.to_string()),
        _ => ("Authorization", value.to_string()),
    }
}
