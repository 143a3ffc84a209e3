// src/discord/events/mod.rs
mod handler;
pub use handler::Handler;
