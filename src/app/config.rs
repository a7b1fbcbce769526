//! Application configuration
//!
//! Process-wide settings that are not part of a pipeline run.

/// Environment variable overriding the log filter
pub const LOG_ENV_VAR: &str = "WORDFREQ_LOG";

/// Application configuration structure
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    /// Log filter taken from the environment, if any
    pub log_filter: Option<String>,
}

impl AppConfig {
    pub fn new(verbose: u8) -> Self {
        Self {
            verbose,
            log_filter: std::env::var(LOG_ENV_VAR).ok().filter(|f| !f.is_empty()),
        }
    }

    /// Get the log level string based on verbosity
    pub fn log_level(&self) -> &str {
        if let Some(filter) = &self.log_filter {
            return filter;
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            2 => "trace",
            _ => "trace,hyper=debug,reqwest=debug",
        }
    }
}
