//! Text sources
//!
//! A source turns a locator into the full text of a corpus. Any failure is
//! terminal for the run and reported as [`PipelineError::SourceUnavailable`].

mod file;
mod http;

pub use file::{FileSource, StdinSource};
pub use http::HttpSource;

use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use url::Url;

/// Corpus analysed when no source is given
pub const DEFAULT_SOURCE_URL: &str = "https://www.gutenberg.org/files/1342/1342-0.txt";

/// Provider of the text fed into the pipeline
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Locator shown in logs and errors
    fn locator(&self) -> String;

    /// Fetch the complete text
    async fn fetch(&self) -> Result<String>;
}

/// In-memory text, mostly useful in tests
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    text: Option<String>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Some(text.into()),
        }
    }

    /// A source whose fetch always fails
    pub fn unavailable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: None,
        }
    }
}

#[async_trait]
impl TextSource for StaticSource {
    fn locator(&self) -> String {
        self.name.clone()
    }

    async fn fetch(&self) -> Result<String> {
        self.text
            .clone()
            .ok_or_else(|| PipelineError::SourceUnavailable {
                locator: self.name.clone(),
                reason: "no text available".to_string(),
                source: None,
            })
    }
}

/// Pick a source for `locator`: `-` is stdin, `http(s)://` is fetched over
/// HTTP, anything else is a file path
pub fn source_for_locator(locator: &str) -> Result<Box<dyn TextSource>> {
    if locator == "-" {
        return Ok(Box::new(StdinSource));
    }

    match Url::parse(locator) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            Ok(Box::new(HttpSource::new(url)?))
        }
        Ok(url) if url.scheme() == "file" => {
            let path = url.to_file_path().map_err(|_| PipelineError::SourceUnavailable {
                locator: locator.to_string(),
                reason: "not a local file URL".to_string(),
                source: None,
            })?;
            Ok(Box::new(FileSource::new(path)))
        }
        // Windows drive letters parse as single-letter schemes
        Ok(url) if url.scheme().len() > 1 => Err(PipelineError::SourceUnavailable {
            locator: locator.to_string(),
            reason: format!("unsupported scheme {:?}", url.scheme()),
            source: None,
        }),
        _ => Ok(Box::new(FileSource::new(PathBuf::from(locator)))),
    }
}
