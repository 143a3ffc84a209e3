// src/config.rs

use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use serenity::model::id::GuildId;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub discord_token: Option<String>,
    pub discord_guild_id: Option<String>,
    pub data_dir: Option<String>,
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(skip)]
    path: PathBuf,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let mut config = if path.exists() {
            let mut config: Config = toml::from_str(&fs::read_to_string(path)?)?;
            config.path = path.to_path_buf();
            config
        } else {
            println!("Welcome! Let's set up your bot configuration.");
            println!("You'll need a bot token from https://discord.com/developers/applications");
            println!("with the Server Members intent enabled, invited to your guild with the");
            println!("Manage Roles permission, and the guild id (right-click your server with");
            println!("Developer Mode enabled and pick 'Copy ID').");
            Config {
                discord_token: None,
                discord_guild_id: None,
                data_dir: None,
                log_level: LogLevel::INFO,
                path: path.to_path_buf(),
            }
        };

        config.prompt_for_missing_fields()?;
        Ok(config)
    }

    fn prompt_for_missing_fields(
        &mut self,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.discord_token.is_none() {
            self.discord_token = Some(Self::prompt_input("Enter your Discord bot token: ")?);
        }
        if self.discord_guild_id.is_none() {
            self.discord_guild_id =
                Some(Self::prompt_input("Enter the guild id the bot will operate in: ")?);
        }

        self.save()?;
        Ok(())
    }

    fn prompt_input(prompt: &str) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        print!("{}", prompt);
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let toml = toml::to_string(self)?;
        fs::write(&self.path, toml)?;
        Ok(())
    }

    pub fn is_discord_configured(&self) -> bool {
        self.discord_token.is_some() && self.guild_id().is_some()
    }

    pub fn guild_id(&self) -> Option<GuildId> {
        self.discord_guild_id
            .as_ref()
            .and_then(|id| id.parse::<u64>().ok())
            .map(GuildId::new)
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(self.data_dir.as_deref().unwrap_or("data"))
    }
}
