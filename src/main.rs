mod auth;
mod cli;
mod config;
mod error;
mod output;
mod providers;

use clap::Parser;
use cli::Cli;
use log::{debug, info};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    output::print_banner();

    info!("Starting sentry2csv");
    match cli.execute().await {
        Ok(summary) => {
            println!(
                "{} {}",
                output::done("Exported"),
                output::export_report(&summary.path, summary.issue_count)
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            debug!("{err:?}");
            eprintln!("{} {err:#}", output::failed("Error:"));
            ExitCode::FAILURE
        }
    }
}
