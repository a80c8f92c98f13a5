use anyhow::Result;
use clap::Parser;

use common::logger::init_tracing;
use watcher::{
    app,
    cli::{Cli, Command},
    config::AppConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let cfg = AppConfig::from_env()?;

    init_tracing("watcher", cfg.json_logs);

    match cli.command.unwrap_or_default() {
        Command::Run(args) => app::run(cfg, args).await,
        Command::TestSink => app::test_sink(cfg).await,
    }
}
