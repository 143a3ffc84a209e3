// src/lounge/mod.rs
//
// Thin client for the MK Central lounge rating API.

use serde::Deserialize;
use serenity::model::id::UserId;

const BASE_URL: &str = "https://lounge.mkcentral.com";
const GAME: &str = "mkworld";

#[derive(Debug, Clone, Deserialize)]
pub struct LoungePlayer {
    pub name: String,
    pub mmr: Option<i32>,
    #[serde(rename = "maxMmr")]
    pub max_mmr: Option<i32>,
}

#[derive(Clone)]
pub struct LoungeClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for LoungeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LoungeClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// `Ok(None)` when the player is not registered on the lounge (any
    /// non-200 answer), mirroring how callers treat "no rating".
    pub async fn fetch_player(
        &self,
        discord_id: UserId,
        season: Option<u32>,
    ) -> Result<Option<LoungePlayer>, reqwest::Error> {
        let mut params = vec![
            ("discordId", discord_id.to_string()),
            ("game", GAME.to_string()),
        ];
        if let Some(season) = season {
            params.push(("season", season.to_string()));
        }

        let resp = self
            .http
            .get(format!("{}/api/player", self.base_url))
            .query(&params)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Ok(None);
        }
        Ok(Some(resp.json().await?))
    }

    pub async fn fetch_mmr(&self, discord_id: UserId) -> Result<Option<i32>, reqwest::Error> {
        Ok(self
            .fetch_player(discord_id, None)
            .await?
            .and_then(|p| p.mmr))
    }

    pub async fn fetch_peak(&self, discord_id: UserId) -> Result<Option<i32>, reqwest::Error> {
        Ok(self
            .fetch_player(discord_id, None)
            .await?
            .and_then(|p| p.max_mmr))
    }
}
