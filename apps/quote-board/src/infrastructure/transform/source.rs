//! Where a transform artifact comes from.

use std::{fmt, path::PathBuf, time::Duration};

use super::TransformError;

/// Location of a transform artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformSource {
    /// A local file.
    File(PathBuf),
    /// An `http://` or `https://` URL.
    Http(String),
}

impl TransformSource {
    /// Classify a configured location.
    #[must_use]
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Http(location.to_owned())
        } else {
            Self::File(PathBuf::from(location))
        }
    }

    /// Fetch the artifact text.
    ///
    /// Completes before the feed connection is opened, so messages are never
    /// rendered against a half-loaded transform.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or the request fails or
    /// returns a non-success status.
    pub async fn load(&self, timeout: Duration) -> Result<String, TransformError> {
        match self {
            Self::File(path) => Ok(std::fs::read_to_string(path)?),
            Self::Http(url) => {
                let client = reqwest::Client::builder().timeout(timeout).build()?;
                let text = client
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?;
                Ok(text)
            }
        }
    }
}

impl fmt::Display for TransformSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Http(url) => f.write_str(url),
        }
    }
}
