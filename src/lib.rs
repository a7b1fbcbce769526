//! # wordfreq
//!
//! Word-frequency counting with a three-stage map/shuffle/reduce pipeline.
//!
//! ## Usage
//!
//! ```bash
//! wordfreq [SOURCE] [-n TOP] [-w WORKERS] [--format chart|json|plain]
//! ```
//!
//! ## Modules
//!
//! - `pipeline` - Normalizer, parallel map, shuffle barrier, parallel reduce, ranker
//! - `source` - Text sources (HTTP, file, stdin, in-memory)
//! - `render` - Bar chart, JSON and plain-text output
//! - `config` - Layered TOML/environment configuration
//! - `error` - Structured pipeline errors
//! - `app` - Logging and fatal error reporting for the binary
//! - `cli` - Command-line arguments and entry point
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod source;

pub use error::{PipelineError, Result};
pub use pipeline::{compute_frequencies, FrequencyPipeline, PipelineOutput, RankedEntry};
