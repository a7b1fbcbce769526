use super::TextSource;
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Reads a local UTF-8 file
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TextSource for FileSource {
    fn locator(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<String> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| PipelineError::source_unavailable(self.locator(), e))?;
        debug!("Read {} bytes from {}", text.len(), self.path.display());
        Ok(text)
    }
}

/// Reads standard input to the end
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinSource;

#[async_trait]
impl TextSource for StdinSource {
    fn locator(&self) -> String {
        "<stdin>".to_string()
    }

    async fn fetch(&self) -> Result<String> {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .map_err(|e| PipelineError::source_unavailable(self.locator(), e))?;
        Ok(text)
    }
}
