//! Pipeline configuration
//!
//! Settings are layered: built-in defaults, then the global `config.toml`,
//! then an explicit `--config` file, then `WORDFREQ_*` environment variables,
//! then command-line flags. Every layer is a [`ConfigOverlay`] whose unset
//! fields leave the value below untouched.

use crate::error::{PipelineError, Result};
use crate::pipeline::normalizer::{PunctuationSet, ASCII_PUNCTUATION};
use crate::pipeline::pool::{default_worker_count, WorkerPool, DEFAULT_BATCH_SIZE};
use directories::ProjectDirs;
use serde::de::IntoDeserializer;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub mod loader;

pub use loader::ConfigLoader;

/// Number of ranked words shown when nothing else is configured
pub const DEFAULT_TOP_N: usize = 10;

/// Width in characters of the longest bar in the text chart
pub const DEFAULT_CHART_WIDTH: usize = 50;

/// Get the directory holding the global configuration file
pub fn get_global_config_dir() -> Result<PathBuf> {
    ProjectDirs::from("org", "wordfreq", "wordfreq")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            PipelineError::invalid_config("config_dir", "could not determine home directory")
        })
}

/// Fully resolved settings for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Worker pool size for the map and reduce phases
    pub workers: usize,
    /// Items handled by one pool task
    pub batch_size: usize,
    /// Number of ranked entries to return
    pub top_n: usize,
    /// Characters stripped before tokenizing
    pub punctuation: String,
    /// Upper bound on a whole pipeline run
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    pub chart_width: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: default_worker_count(),
            batch_size: DEFAULT_BATCH_SIZE,
            top_n: DEFAULT_TOP_N,
            punctuation: ASCII_PUNCTUATION.to_string(),
            timeout: None,
            chart_width: DEFAULT_CHART_WIDTH,
        }
    }
}

impl PipelineConfig {
    /// Apply an overlay; set fields win
    pub fn merge(&mut self, overlay: ConfigOverlay) {
        if let Some(workers) = overlay.workers {
            self.workers = workers;
        }
        if let Some(batch_size) = overlay.batch_size {
            self.batch_size = batch_size;
        }
        if let Some(top_n) = overlay.top_n {
            self.top_n = top_n;
        }
        if let Some(punctuation) = overlay.punctuation {
            self.punctuation = punctuation;
        }
        if overlay.timeout.is_some() {
            self.timeout = overlay.timeout;
        }
        if let Some(chart_width) = overlay.chart_width {
            self.chart_width = chart_width;
        }
    }

    pub fn with_overlay(mut self, overlay: ConfigOverlay) -> Self {
        self.merge(overlay);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(PipelineError::invalid_config(
                "workers",
                "must be at least 1",
            ));
        }
        if self.batch_size == 0 {
            return Err(PipelineError::invalid_config(
                "batch_size",
                "must be at least 1",
            ));
        }
        if self.chart_width == 0 {
            return Err(PipelineError::invalid_config(
                "chart_width",
                "must be at least 1",
            ));
        }
        if let Some(c) = self.punctuation.chars().find(|c| c.is_whitespace()) {
            return Err(PipelineError::invalid_config(
                "punctuation",
                format!("whitespace {c:?} cannot be stripped as punctuation"),
            ));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(PipelineError::invalid_config(
                "timeout",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn punctuation_set(&self) -> PunctuationSet {
        PunctuationSet::from_chars(&self.punctuation)
    }

    pub fn worker_pool(&self) -> Result<WorkerPool> {
        WorkerPool::new(self.workers, self.batch_size)
    }
}

/// A partial configuration layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverlay {
    pub workers: Option<usize>,
    pub batch_size: Option<usize>,
    pub top_n: Option<usize>,
    pub punctuation: Option<String>,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    pub chart_width: Option<usize>,
}

impl ConfigOverlay {
    /// Read `WORDFREQ_WORKERS`, `WORDFREQ_BATCH_SIZE`, `WORDFREQ_TOP_N` and
    /// `WORDFREQ_TIMEOUT`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse_count = |key: &str| -> Result<Option<usize>> {
            lookup(key)
                .map(|value| {
                    value.trim().parse::<usize>().map_err(|e| {
                        PipelineError::invalid_config(key, format!("{value:?} is not a count: {e}"))
                    })
                })
                .transpose()
        };

        Ok(Self {
            workers: parse_count("WORDFREQ_WORKERS")?,
            batch_size: parse_count("WORDFREQ_BATCH_SIZE")?,
            top_n: parse_count("WORDFREQ_TOP_N")?,
            punctuation: None,
            timeout: lookup("WORDFREQ_TIMEOUT")
                .map(|value| parse_duration(&value))
                .transpose()
                .map_err(|e| PipelineError::invalid_config("WORDFREQ_TIMEOUT", e))?,
            chart_width: None,
        })
    }
}

/// Parse a human-readable duration such as `30s` or `2m 30s`
pub fn parse_duration(value: &str) -> std::result::Result<Duration, String> {
    let deserializer: serde::de::value::StrDeserializer<'_, serde::de::value::Error> =
        value.trim().into_deserializer();
    humantime_serde::deserialize(deserializer).map_err(|e| e.to_string())
}
