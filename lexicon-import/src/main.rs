mod api;
mod cli;
mod config;
mod import;

use clap::Parser;
use colored::*;

use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp_secs()
        .init();

    let code = match cli::run(cli).await {
        Ok(()) => 0,
        Err(err) => {
            log::debug!("{:?}", err);
            eprintln!("{} {:#}", "Error:".bright_red().bold(), err);
            import::error::exit_code(&err)
        }
    };

    std::process::exit(code);
}
