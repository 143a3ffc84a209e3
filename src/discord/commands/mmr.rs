// src/discord/commands/mmr.rs
//
// Lounge MMR lookups. /mmr fetches the caller's rating; /avemmr fans out
// one lookup per role member and reports the average.

use super::{option_int, option_role, respond_ephemeral};
use crate::lounge::LoungeClient;
use serenity::builder::{
    CreateCommand, CreateCommandOption, CreateEmbed, CreateEmbedFooter,
    CreateInteractionResponseFollowup,
};
use serenity::model::application::{CommandInteraction, CommandOptionType};
use serenity::model::id::GuildId;
use serenity::prelude::*;

const MAX_LISTED: usize = 20;

pub fn register_mmr() -> CreateCommand {
    CreateCommand::new("mmr")
        .description("Your lounge MMR")
        .add_option(CreateCommandOption::new(
            CommandOptionType::Integer,
            "season",
            "A past season instead of the current one",
        ))
}

pub fn register_avemmr() -> CreateCommand {
    CreateCommand::new("avemmr")
        .description("Average lounge MMR of a role's members")
        .add_option(
            CreateCommandOption::new(CommandOptionType::Role, "role", "The role to average")
                .required(true),
        )
}

pub async fn run_mmr(
    ctx: &Context,
    command: &CommandInteraction,
    lounge: &LoungeClient,
) -> Result<(), serenity::Error> {
    command.defer_ephemeral(&ctx.http).await?;

    let options = command.data.options();
    let season = option_int(&options, "season").and_then(|s| u32::try_from(s).ok());

    let text = match lounge.fetch_player(command.user.id, season).await {
        Ok(Some(player)) => match (player.mmr, player.max_mmr) {
            (Some(mmr), Some(peak)) => {
                format!("{}: **{mmr}** MMR (peak {peak})", player.name)
            }
            (Some(mmr), None) => format!("{}: **{mmr}** MMR", player.name),
            (None, _) => format!("{} is still in placements.", player.name),
        },
        Ok(None) => "You are not registered on the lounge.".to_string(),
        Err(e) => format!("Lounge lookup failed: {e}"),
    };

    command
        .create_followup(
            &ctx.http,
            CreateInteractionResponseFollowup::new()
                .content(text)
                .ephemeral(true),
        )
        .await
        .map(|_| ())
}

pub async fn run_avemmr(
    ctx: &Context,
    command: &CommandInteraction,
    lounge: &LoungeClient,
    guild_id: GuildId,
) -> Result<(), serenity::Error> {
    let options = command.data.options();
    let Some(role) = option_role(&options, "role") else {
        return respond_ephemeral(ctx, command, "Missing role.").await;
    };

    command.defer(&ctx.http).await?;

    let members: Vec<_> = match guild_id.members(&ctx.http, None, None).await {
        Ok(members) => members
            .into_iter()
            .filter(|m| !m.user.bot && m.roles.contains(&role.id))
            .collect(),
        Err(e) => {
            return command
                .create_followup(
                    &ctx.http,
                    CreateInteractionResponseFollowup::new()
                        .content(format!("Could not list members: {e}"))
                        .ephemeral(true),
                )
                .await
                .map(|_| ())
        }
    };
    if members.is_empty() {
        return command
            .create_followup(
                &ctx.http,
                CreateInteractionResponseFollowup::new()
                    .content(format!("Nobody has the {} role.", role.name))
                    .ephemeral(true),
            )
            .await
            .map(|_| ());
    }

    // one request per member, all in flight at once
    let lookups = members.iter().map(|m| lounge.fetch_mmr(m.user.id));
    let ratings = futures::future::join_all(lookups).await;

    let mut lines = Vec::new();
    let mut rated = Vec::new();
    let mut unrated = 0usize;
    for (member, rating) in members.iter().zip(ratings) {
        match rating {
            Ok(Some(mmr)) => {
                rated.push(mmr);
                if lines.len() < MAX_LISTED {
                    lines.push(format!("{}: **{mmr}**", member.display_name()));
                }
            }
            Ok(None) | Err(_) => unrated += 1,
        }
    }

    let mut embed = CreateEmbed::new()
        .title(format!("Lounge MMR: {}", role.name))
        .footer(CreateEmbedFooter::new(format!(
            "{} rated, {} unrated",
            rated.len(),
            unrated
        )));
    if rated.is_empty() {
        embed = embed.description("Nobody with this role has a lounge rating.");
    } else {
        let average = rated.iter().map(|&m| m as i64).sum::<i64>() as f64 / rated.len() as f64;
        embed = embed
            .description(lines.join("\n"))
            .field("Average MMR", format!("{average:.0}"), false);
    }

    command
        .create_followup(
            &ctx.http,
            CreateInteractionResponseFollowup::new().embed(embed),
        )
        .await
        .map(|_| ())
}
