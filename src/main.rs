use clap::Parser;
use mogibot::{config::Config, init, logging, run};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Parser)]
#[command(about = "Clan war signup and result bot")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "mogibot.conf")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;
    logging::setup_logging(config.log_level)?;

    let config = Arc::new(RwLock::new(config));
    let clients = init(Arc::clone(&config)).await?;

    run(clients).await?;

    Ok(())
}
