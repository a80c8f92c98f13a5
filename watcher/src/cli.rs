use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[clap(name = "watcher", version, about = "Liquidity pool monitor with chat alerts")]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll the pool and dispatch alerts until Ctrl-C (default)
    Run(RunArgs),

    /// Send a connectivity message and a sample alert to Telegram, then exit
    TestSink,
}

impl Default for Command {
    fn default() -> Self {
        Command::Run(RunArgs::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourceKind {
    /// STON.fi HTTP API (needs POOL_ADDRESS)
    #[default]
    Stonfi,
    /// Fixed placeholder readings, no network
    Static,
}

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Where readings come from
    #[clap(long, value_enum, default_value_t = SourceKind::Stonfi)]
    pub source: SourceKind,

    /// Log alerts only; never contact Telegram
    #[clap(long)]
    pub dry_run: bool,

    /// Override CHECK_INTERVAL (milliseconds)
    #[clap(long)]
    pub check_interval_ms: Option<u64>,

    /// Override ALERT_THRESHOLD (percent, both metrics)
    #[clap(long)]
    pub threshold: Option<f64>,
}
