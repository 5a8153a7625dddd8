use anyhow::Result;
use clap::Parser;

use forex_news::app;
use forex_news::app_config::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    app::app_init()?;
    app::run(cli).await
}
