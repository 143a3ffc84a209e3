// src/storage/mod.rs
mod client;
pub mod models;
pub use client::StorageClient;
