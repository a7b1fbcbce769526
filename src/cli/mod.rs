//! Command-line entry point
//!
//! Resolves configuration, fetches the text, runs the pipeline and prints
//! the rendered result.

pub mod args;

pub use args::Cli;

use crate::config::ConfigLoader;
use crate::pipeline::{CancellationHandle, FrequencyPipeline};
use crate::render::{chart_entries, default_title, renderer_for};
use crate::source::source_for_locator;
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

/// Run the command described by `cli`
pub async fn execute(cli: Cli) -> Result<()> {
    let loader = ConfigLoader::new();
    let config = loader
        .load(cli.config.as_deref())
        .await?
        .with_overlay(cli.overlay());
    config.validate()?;
    debug!("Resolved configuration: {:?}", config);

    let source = source_for_locator(&cli.source)?;
    let text = source.fetch().await?;
    info!("Loaded {} bytes from {}", text.len(), source.locator());

    let cancel = CancellationHandle::new();
    spawn_ctrl_c_handler(cancel.clone());

    let pipeline = FrequencyPipeline::new(&config)?;
    let output = pipeline
        .run_with_cancellation(&text, config.top_n, &cancel)
        .await
        .with_context(|| format!("Word count over {} failed", source.locator()))?;

    let title = cli.title.unwrap_or_else(|| default_title(config.top_n));
    let rendered = renderer_for(cli.format, config.chart_width)
        .render(&title, &chart_entries(&output.ranked))?;
    print!("{rendered}");

    if cli.stats {
        let stats = serde_json::to_string_pretty(&output.stats)?;
        eprintln!("{stats}");
    }

    Ok(())
}

fn spawn_ctrl_c_handler(cancel: CancellationHandle) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received; cancelling");
                cancel.cancel();
            }
            Err(e) => debug!("Could not install Ctrl-C handler: {}", e),
        }
    });
}
