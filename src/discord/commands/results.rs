// src/discord/commands/results.rs
//
// War result bookkeeping: registration, a paginated list, per-result detail
// and a button-confirmed delete. Two formats exist, the 6v6 two-team war
// and the four-team war.

use super::{option_int, option_str, respond_ephemeral};
use crate::discord::roles::GuildDirectory;
use crate::roster::Roster;
use crate::storage::models::{format_entry_date, MatchRecord, TwoTeamResult};
use crate::storage::StorageClient;
use serenity::builder::{
    CreateActionRow, CreateButton, CreateCommand, CreateCommandOption, CreateEmbed,
    CreateEmbedFooter, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage,
};
use serenity::model::application::{ButtonStyle, CommandInteraction, CommandOptionType};
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::time::Duration;

const PAGE_SIZE: usize = 20;
const PAGER_TIMEOUT: Duration = Duration::from_secs(120);
const CONFIRM_TIMEOUT: Duration = Duration::from_secs(60);

pub fn register_12() -> CreateCommand {
    CreateCommand::new("register_12")
        .description("Register a 6v6 war result")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "enemy", "Enemy team name")
                .required(true),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "scores",
                "Our score then theirs, e.g. \"512 420\"",
            )
            .required(true),
        )
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "date", "When, as yyyymmddhh")
                .required(true),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "member",
                "Six aliases, or a role mention",
            )
            .required(true),
        )
}

pub fn register_result_12() -> CreateCommand {
    CreateCommand::new("result_12")
        .description("List 6v6 war results")
        .add_option(CreateCommandOption::new(
            CommandOptionType::String,
            "member",
            "Only wars this member played (alias or mention)",
        ))
        .add_option(CreateCommandOption::new(
            CommandOptionType::String,
            "enemy",
            "Only wars against this team",
        ))
}

pub fn register_result_12_detail() -> CreateCommand {
    CreateCommand::new("result_12_detail")
        .description("Show one 6v6 result in full")
        .add_option(
            CreateCommandOption::new(CommandOptionType::Integer, "id", "The result id")
                .required(true),
        )
}

pub fn register_result_12_delete() -> CreateCommand {
    CreateCommand::new("result_12_delete")
        .description("Delete a 6v6 result")
        .add_option(
            CreateCommandOption::new(CommandOptionType::Integer, "id", "The result id")
                .required(true),
        )
}

pub fn register_4team() -> CreateCommand {
    CreateCommand::new("register_4team")
        .description("Register a four-team war result")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "enemies",
                "The three enemy teams, e.g. \"Koopas Yoshis Toads\"",
            )
            .required(true),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "points",
                "Our points then theirs in enemy order, e.g. \"320 300 280 250\"",
            )
            .required(true),
        )
        .add_option(
            CreateCommandOption::new(CommandOptionType::Integer, "rank", "Where we finished, 1-4")
                .required(true),
        )
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "date", "When, as yyyymmddhh")
                .required(true),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "member",
                "Six aliases, or a role mention",
            )
            .required(true),
        )
}

pub fn register_result_4team() -> CreateCommand {
    CreateCommand::new("result_4team")
        .description("List four-team war results")
        .add_option(CreateCommandOption::new(
            CommandOptionType::String,
            "member",
            "Only wars this member played (alias or mention)",
        ))
}

async fn followup_text(
    ctx: &Context,
    command: &CommandInteraction,
    text: impl Into<String>,
) -> Result<(), serenity::Error> {
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

fn list_embed(records: &[TwoTeamResult], page: usize, total_pages: usize) -> CreateEmbed {
    let start = page * PAGE_SIZE;
    let window = &records[start..(start + PAGE_SIZE).min(records.len())];

    let (mut win, mut draw, mut lose) = (0, 0, 0);
    let mut lines = Vec::with_capacity(window.len());
    for r in window {
        match r.outcome() {
            crate::storage::models::Outcome::Win => win += 1,
            crate::storage::models::Outcome::Draw => draw += 1,
            crate::storage::models::Outcome::Lose => lose += 1,
        }
        lines.push(MatchRecord::TwoTeam(r.clone()).list_line());
    }

    CreateEmbed::new()
        .title("6v6 war results")
        .description(format!("```text\n{}\n```", lines.join("\n")))
        .footer(CreateEmbedFooter::new(format!(
            "Win {win} / Draw {draw} / Lose {lose}  {} shown | {}/{}",
            window.len(),
            page + 1,
            total_pages
        )))
}

fn detail_embed(r: &TwoTeamResult) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("{} vs {}", r.date, r.enemy))
        .description(format!(
            "**{} - {} {}**\n\nMembers: {}",
            r.my_score,
            r.enemy_score,
            r.outcome(),
            r.player
        ))
        .footer(CreateEmbedFooter::new(format!("result_id: {}", r.result_id)))
}

fn pager_row() -> CreateActionRow {
    CreateActionRow::Buttons(vec![
        CreateButton::new("results_prev")
            .label("◀")
            .style(ButtonStyle::Secondary),
        CreateButton::new("results_next")
            .label("▶")
            .style(ButtonStyle::Secondary),
    ])
}

pub async fn run_register_12(
    ctx: &Context,
    command: &CommandInteraction,
    storage: &StorageClient,
    roster: &Roster,
    guild_id: GuildId,
) -> Result<(), serenity::Error> {
    command.defer_ephemeral(&ctx.http).await?;

    let options = command.data.options();
    let (Some(enemy), Some(scores), Some(date), Some(member)) = (
        option_str(&options, "enemy"),
        option_str(&options, "scores"),
        option_str(&options, "date"),
        option_str(&options, "member"),
    ) else {
        return followup_text(ctx, command, "Missing arguments.").await;
    };

    let mut parts = scores.split_whitespace().map(str::parse::<i64>);
    let (Some(Ok(my_score)), Some(Ok(enemy_score)), None) =
        (parts.next(), parts.next(), parts.next())
    else {
        return followup_text(ctx, command, "Scores look like \"512 420\".").await;
    };

    let Ok(date) = format_entry_date(date) else {
        return followup_text(ctx, command, "Dates look like yyyymmddhh, e.g. 2025082821.").await;
    };

    let directory = GuildDirectory::new(&ctx.http, guild_id);
    let players = match roster.resolve_players(member, &directory).await {
        Ok(players) => players,
        Err(e) => return followup_text(ctx, command, format!("Could not register: {e}")).await,
    };

    if let Err(e) = storage.add_two_team(&players.join(" "), my_score, enemy, enemy_score, &date)
    {
        return followup_text(ctx, command, format!("Could not register: {e}")).await;
    }
    followup_text(ctx, command, "Result registered.").await
}

pub async fn run_result_12(
    ctx: &Context,
    command: &CommandInteraction,
    storage: &StorageClient,
    roster: &Roster,
) -> Result<(), serenity::Error> {
    command.defer(&ctx.http).await?;

    let options = command.data.options();
    let member_name = match option_str(&options, "member") {
        Some(token) => match roster.resolve_single(token) {
            Some(name) => Some(name.to_string()),
            None => return followup_text(ctx, command, "Member not found on the roster.").await,
        },
        None => None,
    };
    let enemy = option_str(&options, "enemy");

    let records = match storage.list_two_team(member_name.as_deref(), enemy) {
        Ok(records) => records,
        Err(e) => return followup_text(ctx, command, format!("Could not list results: {e}")).await,
    };
    if records.is_empty() {
        return followup_text(ctx, command, "No matching results.").await;
    }

    let total_pages = (records.len() - 1) / PAGE_SIZE + 1;
    let mut page = total_pages - 1; // newest page first

    let mut followup = CreateInteractionResponseFollowup::new()
        .embed(list_embed(&records, page, total_pages));
    if total_pages > 1 {
        followup = followup.components(vec![pager_row()]);
    }
    let message = command.create_followup(&ctx.http, followup).await?;

    if total_pages <= 1 {
        return Ok(());
    }

    while let Some(ixn) = message
        .await_component_interaction(&ctx.shard)
        .timeout(PAGER_TIMEOUT)
        .await
    {
        match ixn.data.custom_id.as_str() {
            "results_prev" if page > 0 => page -= 1,
            "results_next" if page + 1 < total_pages => page += 1,
            _ => {}
        }
        ixn.create_response(
            &ctx.http,
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .embed(list_embed(&records, page, total_pages)),
            ),
        )
        .await?;
    }

    Ok(())
}

pub async fn run_result_12_detail(
    ctx: &Context,
    command: &CommandInteraction,
    storage: &StorageClient,
) -> Result<(), serenity::Error> {
    let options = command.data.options();
    let Some(id) = option_int(&options, "id") else {
        return respond_ephemeral(ctx, command, "Missing result id.").await;
    };

    match storage.get_two_team(id) {
        Ok(Some(record)) => {
            command
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .embed(detail_embed(&record))
                            .ephemeral(true),
                    ),
                )
                .await
        }
        Ok(None) => respond_ephemeral(ctx, command, format!("No result with id {id}.")).await,
        Err(e) => respond_ephemeral(ctx, command, format!("Could not load the result: {e}")).await,
    }
}

pub async fn run_result_12_delete(
    ctx: &Context,
    command: &CommandInteraction,
    storage: &StorageClient,
) -> Result<(), serenity::Error> {
    let options = command.data.options();
    let Some(id) = option_int(&options, "id") else {
        return respond_ephemeral(ctx, command, "Missing result id.").await;
    };

    let record = match storage.get_two_team(id) {
        Ok(Some(record)) => record,
        Ok(None) => return respond_ephemeral(ctx, command, format!("No result with id {id}.")).await,
        Err(e) => {
            return respond_ephemeral(ctx, command, format!("Could not load the result: {e}"))
                .await
        }
    };

    let buttons = CreateActionRow::Buttons(vec![
        CreateButton::new("result_delete")
            .label("Delete")
            .style(ButtonStyle::Danger),
        CreateButton::new("result_cancel")
            .label("Cancel")
            .style(ButtonStyle::Secondary),
    ]);
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content("Delete this result?")
                    .embed(detail_embed(&record))
                    .components(vec![buttons])
                    .ephemeral(true),
            ),
        )
        .await?;

    let message = command.get_response(&ctx.http).await?;
    let Some(ixn) = message
        .await_component_interaction(&ctx.shard)
        .author_id(command.user.id)
        .timeout(CONFIRM_TIMEOUT)
        .await
    else {
        return Ok(());
    };

    let content = if ixn.data.custom_id == "result_delete" {
        match storage.delete_two_team(id) {
            Ok(true) => format!("Deleted result {id}."),
            Ok(false) => format!("Result {id} was already gone."),
            Err(e) => format!("Could not delete: {e}"),
        }
    } else {
        "Deletion cancelled.".to_string()
    };

    ixn.create_response(
        &ctx.http,
        CreateInteractionResponse::UpdateMessage(
            CreateInteractionResponseMessage::new()
                .content(content)
                .embeds(vec![])
                .components(vec![]),
        ),
    )
    .await
}

pub async fn run_register_4team(
    ctx: &Context,
    command: &CommandInteraction,
    storage: &StorageClient,
    roster: &Roster,
    guild_id: GuildId,
) -> Result<(), serenity::Error> {
    command.defer_ephemeral(&ctx.http).await?;

    let options = command.data.options();
    let (Some(enemies), Some(points), Some(rank), Some(date), Some(member)) = (
        option_str(&options, "enemies"),
        option_str(&options, "points"),
        option_int(&options, "rank"),
        option_str(&options, "date"),
        option_str(&options, "member"),
    ) else {
        return followup_text(ctx, command, "Missing arguments.").await;
    };

    let names: Vec<&str> = enemies.split_whitespace().collect();
    if names.len() != 3 {
        return followup_text(ctx, command, "Give exactly three enemy team names.").await;
    }

    let scores: Vec<i64> = points
        .split_whitespace()
        .filter_map(|p| p.parse().ok())
        .collect();
    if scores.len() != 4 {
        return followup_text(
            ctx,
            command,
            "Points look like \"320 300 280 250\": ours first, then one per enemy.",
        )
        .await;
    }

    if !(1..=4).contains(&rank) {
        return followup_text(ctx, command, "Rank is between 1 and 4.").await;
    }

    let Ok(date) = format_entry_date(date) else {
        return followup_text(ctx, command, "Dates look like yyyymmddhh, e.g. 2025082821.").await;
    };

    let directory = GuildDirectory::new(&ctx.http, guild_id);
    let players = match roster.resolve_players(member, &directory).await {
        Ok(players) => players,
        Err(e) => return followup_text(ctx, command, format!("Could not register: {e}")).await,
    };

    let opponents = [
        (names[0].to_string(), scores[1]),
        (names[1].to_string(), scores[2]),
        (names[2].to_string(), scores[3]),
    ];
    if let Err(e) =
        storage.add_four_team(&players.join(" "), scores[0], &opponents, rank, &date)
    {
        return followup_text(ctx, command, format!("Could not register: {e}")).await;
    }
    followup_text(ctx, command, "Result registered.").await
}

pub async fn run_result_4team(
    ctx: &Context,
    command: &CommandInteraction,
    storage: &StorageClient,
    roster: &Roster,
) -> Result<(), serenity::Error> {
    command.defer(&ctx.http).await?;

    let options = command.data.options();
    let member_name = match option_str(&options, "member") {
        Some(token) => match roster.resolve_single(token) {
            Some(name) => Some(name.to_string()),
            None => return followup_text(ctx, command, "Member not found on the roster.").await,
        },
        None => None,
    };

    let records = match storage.list_four_team(member_name.as_deref()) {
        Ok(records) => records,
        Err(e) => return followup_text(ctx, command, format!("Could not list results: {e}")).await,
    };
    if records.is_empty() {
        return followup_text(ctx, command, "No matching results.").await;
    }

    let shown = &records[records.len().saturating_sub(PAGE_SIZE)..];
    let lines: Vec<String> = shown
        .iter()
        .map(|r| MatchRecord::FourTeam(r.clone()).list_line())
        .collect();

    let embed = CreateEmbed::new()
        .title("Four-team war results")
        .description(format!("```text\n{}\n```", lines.join("\n")))
        .footer(CreateEmbedFooter::new(format!(
            "showing {} of {}",
            shown.len(),
            records.len()
        )));

    command
        .create_followup(
            &ctx.http,
            CreateInteractionResponseFollowup::new().embed(embed),
        )
        .await
        .map(|_| ())
}
