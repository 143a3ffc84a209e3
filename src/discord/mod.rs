// src/discord/mod.rs
mod client;
mod commands;
mod events;
mod roles;
mod signup_ui;
pub use client::DiscordClient;
pub use events::Handler;
pub use roles::GuildDirectory;
