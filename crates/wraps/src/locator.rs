//! Locators for library documents and wrap schemas.
//!
//! A locator is either a `file://` reference, read from disk, or an
//! `http(s)://` URL, fetched over the network.

use std::path::PathBuf;

use url::Url;
use wrapwright_core::error::RegistryError;

const FILE_SCHEME: &str = "file://";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    File(PathBuf),
    Remote(Url),
}

impl Locator {
    /// Parse a locator. `file://` paths may be relative to the working directory.
    pub fn parse(text: &str) -> Result<Self, RegistryError> {
        let text = text.trim();
        if let Some(path) = text.strip_prefix(FILE_SCHEME) {
            if path.is_empty() {
                return Err(RegistryError::InvalidLocator(text.to_string()));
            }
            return Ok(Self::File(PathBuf::from(path)));
        }

        let url = Url::parse(text)
            .map_err(|e| RegistryError::InvalidLocator(format!("{text}: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(Self::Remote(url)),
            other => Err(RegistryError::InvalidLocator(format!(
                "{text}: unsupported scheme '{other}'"
            ))),
        }
    }

    /// Append a path segment, treating the locator as a directory.
    pub fn join(&self, segment: &str) -> Result<Self, RegistryError> {
        match self {
            Self::File(path) => Ok(Self::File(path.join(segment))),
            Self::Remote(url) => {
                let joined = format!("{}/{}", url.as_str().trim_end_matches('/'), segment);
                Url::parse(&joined)
                    .map(Self::Remote)
                    .map_err(|e| RegistryError::InvalidLocator(format!("{joined}: {e}")))
            }
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// Fetch the document behind this locator as text.
    pub async fn fetch_text(&self, client: &reqwest::Client) -> Result<String, String> {
        match self {
            Self::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| format!("{}: {e}", path.display())),
            Self::Remote(url) => {
                let response = client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| e.to_string())?
                    .error_for_status()
                    .map_err(|e| e.to_string())?;
                response.text().await.map_err(|e| e.to_string())
            }
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{FILE_SCHEME}{}", path.display()),
            Self::Remote(url) => write!(f, "{url}"),
        }
    }
}
