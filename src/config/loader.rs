use super::{get_global_config_dir, ConfigOverlay, PipelineConfig};
use crate::error::{PipelineError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Resolves a [`PipelineConfig`] from files and the environment
pub struct ConfigLoader {
    global_path: Option<PathBuf>,
    use_env: bool,
}

impl ConfigLoader {
    /// Loader reading the global config file and the environment
    pub fn new() -> Self {
        let global_path = get_global_config_dir()
            .ok()
            .map(|dir| dir.join("config.toml"));

        Self {
            global_path,
            use_env: true,
        }
    }

    pub fn with_global_path(mut self, path: Option<PathBuf>) -> Self {
        self.global_path = path;
        self
    }

    pub fn with_env(mut self, use_env: bool) -> Self {
        self.use_env = use_env;
        self
    }

    /// Defaults, then the global file, then `explicit`, then the environment
    ///
    /// A missing global file is skipped; a missing explicit file is an error.
    pub async fn load(&self, explicit: Option<&Path>) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::default();

        if let Some(global) = &self.global_path {
            if global.exists() {
                debug!("Loading global config from {}", global.display());
                config.merge(read_overlay(global).await?);
            }
        }

        if let Some(path) = explicit {
            info!("Loading config from {}", path.display());
            config.merge(read_overlay(path).await?);
        }

        if self.use_env {
            config.merge(ConfigOverlay::from_env()?);
        }

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_overlay(path: &Path) -> Result<ConfigOverlay> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| PipelineError::ConfigLoad {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

    toml::from_str(&content).map_err(|e| PipelineError::ConfigLoad {
        path: path.display().to_string(),
        source: Box::new(e),
    })
}
