//! CLI argument structures

use crate::config::{parse_duration, ConfigOverlay};
use crate::render::OutputFormat;
use crate::source::DEFAULT_SOURCE_URL;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Count word frequencies with a parallel map/shuffle/reduce pipeline
#[derive(Debug, Parser)]
#[command(name = "wordfreq")]
#[command(about = "wordfreq - Count the most frequent words in a text", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Text to analyse: an http(s) URL, a file path, or `-` for stdin
    #[arg(default_value = DEFAULT_SOURCE_URL)]
    pub source: String,

    /// Number of words to show
    #[arg(short = 'n', long = "top")]
    pub top_n: Option<usize>,

    /// Worker pool size (defaults to available parallelism)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Items processed per pool task
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Characters to strip instead of ASCII punctuation
    #[arg(long)]
    pub punctuation: Option<String>,

    /// Abort the run after this long (e.g. `30s`, `2m`)
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Chart)]
    pub format: OutputFormat,

    /// Chart title (defaults to "Top N most frequent words")
    #[arg(long)]
    pub title: Option<String>,

    /// Print run statistics after the results
    #[arg(long)]
    pub stats: bool,

    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Cli {
    /// Flags given on the command line as the topmost config layer
    pub fn overlay(&self) -> ConfigOverlay {
        ConfigOverlay {
            workers: self.workers,
            batch_size: self.batch_size,
            top_n: self.top_n,
            punctuation: self.punctuation.clone(),
            timeout: self.timeout,
            chart_width: None,
        }
    }
}
