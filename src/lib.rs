pub mod config;
pub mod discord;
pub mod logging;
pub mod lounge;
pub mod roster;
pub mod signup;
pub mod storage;

use crate::config::Config;
use crate::discord::{DiscordClient, Handler};
use crate::lounge::LoungeClient;
use crate::roster::Roster;
use crate::signup::{FileStore, SignupRegistry};
use crate::storage::StorageClient;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

pub struct BotClients {
    pub discord: Arc<DiscordClient>,
}

pub async fn init(
    config: Arc<RwLock<Config>>,
) -> Result<BotClients, Box<dyn std::error::Error + Send + Sync>> {
    let (guild_id, data_dir) = {
        let config_read = config.read().await;
        if !config_read.is_discord_configured() {
            return Err("Discord token or guild id missing from configuration".into());
        }
        (
            config_read
                .guild_id()
                .ok_or("discord_guild_id is not a valid id")?,
            config_read.data_dir(),
        )
    };

    std::fs::create_dir_all(&data_dir)?;

    let store = FileStore::new(data_dir.join("hours.json"));
    let registry = SignupRegistry::load(&store);
    info!("loaded {} signup slots", registry.len());
    let registry = Arc::new(Mutex::new(registry));

    let storage = Arc::new(StorageClient::new(data_dir.join("results.db"))?);

    let roster = match Roster::load(data_dir.join("member.txt")) {
        Ok(roster) => roster,
        Err(e) => {
            warn!("no roster loaded ({e}); result registration by alias will not resolve");
            Roster::default()
        }
    };

    let handler = Handler::new(
        guild_id,
        registry,
        store,
        storage,
        LoungeClient::new(),
        Arc::new(roster),
    );
    let discord = Arc::new(DiscordClient::new(config, handler).await?);

    Ok(BotClients { discord })
}

pub async fn run(clients: BotClients) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let discord = clients.discord.clone();
    let gateway = tokio::spawn(async move { discord.start().await });

    tokio::select! {
        result = gateway => {
            result??;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    clients.discord.shutdown().await?;
    Ok(())
}
