use std::process::ExitCode;

use clap::Parser;
use commit_digest::Cli;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr; stdout carries the analyses JSON when no
/// `--output` file is given.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match Cli::parse().execute().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {e}");
            for cause in e.chain().skip(1) {
                eprintln!("   caused by: {cause}");
            }
            ExitCode::FAILURE
        }
    }
}
