mod cmds;
mod render;

use anyhow::Result;
use clap::Parser;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_BRANCH"),
    "@",
    env!("GIT_COMMIT"),
    ")"
);

#[derive(Parser)]
#[command(name = "roundwatch")]
#[command(version = VERSION)]
#[command(disable_version_flag = true)]
#[command(about = "Watch Tendermint consensus rounds from the terminal", long_about = None)]
struct Cli {
    /// Print version information
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,

    #[command(flatten)]
    watch: cmds::watch::Opts,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cmds::watch::run(&cli.watch).await
}
