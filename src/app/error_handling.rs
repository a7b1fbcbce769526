//! Error handling utilities

use crate::error::PipelineError;
use tracing::error;

/// Exit code for failures that are not pipeline errors
pub const GENERAL_ERROR: i32 = 1;

/// Handle fatal errors and exit with appropriate status code
///
/// `PipelineError`s print their user message; the full error chain is added
/// in verbose mode.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {:#}", error);

    let exit_code = if let Some(pipeline_err) = error.downcast_ref::<PipelineError>() {
        eprintln!("Error: {}", pipeline_err.user_message());
        pipeline_err.exit_code()
    } else {
        eprintln!("Error: {error}");
        GENERAL_ERROR
    };

    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    }

    std::process::exit(exit_code)
}
