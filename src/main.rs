use anyhow::Result;
use dotenv::dotenv;

mod api;
mod cli;
mod commands;
mod config;
mod error;
mod feed;
mod listing;
mod location;
mod logging;
mod pagination;
mod query;
mod reply;
mod review;
mod store;
mod text;
mod timestamp;
mod ui;

use ui::ReviewUI;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    dotenv().ok();

    let matches = cli::command().get_matches();
    let config = config::Config::from_args_and_env(&matches)?;
    let _log_guard = logging::setup_logging(&config.log_dir)?;

    match matches.subcommand() {
        Some(("list", sub)) => commands::list(&config, sub).await,
        Some(("reply", sub)) => commands::reply(&config, sub).await,
        Some(("reply-batch", sub)) => commands::reply_batch(&config, sub).await,
        Some(("location", sub)) => commands::location(&config, sub).await,
        Some(("hygiene", sub)) => commands::hygiene(&config, sub).await,
        _ => {
            let mut ui = ReviewUI::new(&config).await?;
            ui.run().await
        }
    }
}
