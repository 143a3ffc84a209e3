// src/discord/roles.rs

use crate::signup::{GroupDirectory, SignupError};
use async_trait::async_trait;
use serenity::builder::EditRole;
use serenity::http::Http;
use serenity::model::id::{GuildId, RoleId, UserId};

/// The guild's role system, seen through the signup core's directory trait.
/// Goes through the HTTP API rather than the cache so it works during
/// startup reconciliation before the cache is warm.
pub struct GuildDirectory<'a> {
    http: &'a Http,
    guild_id: GuildId,
}

impl<'a> GuildDirectory<'a> {
    pub fn new(http: &'a Http, guild_id: GuildId) -> Self {
        Self { http, guild_id }
    }
}

#[async_trait]
impl GroupDirectory for GuildDirectory<'_> {
    async fn list_groups(&self) -> Result<Vec<(String, RoleId)>, SignupError> {
        let roles = self.guild_id.roles(self.http).await?;
        Ok(roles.into_iter().map(|(id, role)| (role.name, id)).collect())
    }

    async fn members_of(&self, tag: RoleId) -> Result<Option<Vec<UserId>>, SignupError> {
        let roles = self.guild_id.roles(self.http).await?;
        if !roles.contains_key(&tag) {
            return Ok(None);
        }
        let members = self.guild_id.members(self.http, None, None).await?;
        Ok(Some(
            members
                .into_iter()
                .filter(|m| !m.user.bot && m.roles.contains(&tag))
                .map(|m| m.user.id)
                .collect(),
        ))
    }

    async fn add_member(&self, tag: RoleId, user: UserId) -> Result<(), SignupError> {
        let member = self.guild_id.member(self.http, user).await?;
        member.add_role(self.http, tag).await?;
        Ok(())
    }

    async fn remove_member(&self, tag: RoleId, user: UserId) -> Result<(), SignupError> {
        let member = self.guild_id.member(self.http, user).await?;
        member.remove_role(self.http, tag).await?;
        Ok(())
    }

    async fn create_group(&self, name: &str) -> Result<RoleId, SignupError> {
        let role = self
            .guild_id
            .create_role(self.http, EditRole::new().name(name).mentionable(true))
            .await?;
        Ok(role.id)
    }

    async fn delete_group(&self, tag: RoleId) -> Result<(), SignupError> {
        self.guild_id.delete_role(self.http, tag).await?;
        Ok(())
    }
}
