use clap::Parser;
use wordfreq::app::{handle_fatal_error, init_logging, AppConfig};
use wordfreq::cli::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    init_logging(&AppConfig::new(verbose));

    if let Err(e) = cli::execute(cli).await {
        handle_fatal_error(e, verbose);
    }
}
