// src/discord/commands/signup.rs
//
// Slash commands for the hour signup board. `/set` and `/out` manage which
// hours exist (organizer-only); the rest act on the caller's own signup.

use super::{option_str, respond_ephemeral};
use crate::discord::roles::GuildDirectory;
use crate::discord::signup_ui::{board_buttons, board_embed};
use crate::signup::{
    build_snapshot, clear_all, join, leave, pick, FileStore, GroupDirectory, SignupError,
    SignupRegistry, SLOT_ROLE_SUFFIX,
};
use log::warn;
use serenity::builder::{
    CreateCommand, CreateCommandOption, CreateInteractionResponse,
    CreateInteractionResponseMessage,
};
use serenity::model::application::{CommandInteraction, CommandOptionType};
use serenity::model::id::GuildId;
use serenity::model::Permissions;
use serenity::prelude::*;
use tokio::sync::Mutex;

fn hour_option() -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::String, "hour", "The hour, e.g. 21")
        .required(true)
}

pub fn register_set() -> CreateCommand {
    CreateCommand::new("set")
        .description("Open an hour for signups")
        .default_member_permissions(Permissions::MANAGE_ROLES)
        .add_option(hour_option())
}

pub fn register_out() -> CreateCommand {
    CreateCommand::new("out")
        .description("Close an hour and delete its role")
        .default_member_permissions(Permissions::MANAGE_ROLES)
        .add_option(hour_option())
}

pub fn register_now() -> CreateCommand {
    CreateCommand::new("now").description("Show the current signup board")
}

pub fn register_can() -> CreateCommand {
    CreateCommand::new("can")
        .description("Sign up for an hour")
        .add_option(hour_option())
}

pub fn register_drop() -> CreateCommand {
    CreateCommand::new("drop")
        .description("Withdraw your signup for an hour")
        .add_option(hour_option())
}

pub fn register_clear() -> CreateCommand {
    CreateCommand::new("clear")
        .description("Withdraw everyone from every hour")
        .default_member_permissions(Permissions::MANAGE_ROLES)
}

pub fn register_pick() -> CreateCommand {
    CreateCommand::new("pick")
        .description("Pick a random member signed up for an hour")
        .add_option(hour_option())
}

/// Hours are stored under their canonical decimal form, so "09" opens "9".
fn parse_label(raw: &str) -> Option<String> {
    let n: u64 = raw.trim().parse().ok()?;
    (n > 0).then(|| n.to_string())
}

/// Replies with the full board: embed plus one toggle button per slot.
async fn respond_with_board(
    ctx: &Context,
    command: &CommandInteraction,
    content: Option<String>,
    registry: &SignupRegistry,
    directory: &GuildDirectory<'_>,
) -> Result<(), serenity::Error> {
    let snapshot = match build_snapshot(registry, directory).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            return respond_ephemeral(ctx, command, format!("Could not read signups: {e}")).await
        }
    };

    let mut message = CreateInteractionResponseMessage::new()
        .embed(board_embed(&snapshot))
        .components(board_buttons(registry.all().map(|(label, _)| label)));
    if let Some(content) = content {
        message = message.content(content);
    }
    command
        .create_response(&ctx.http, CreateInteractionResponse::Message(message))
        .await
}

fn signup_error_text(label: &str, err: &SignupError) -> String {
    match err {
        SignupError::UnknownSlot(_) => format!("Hour {label} is not open."),
        SignupError::SlotGroupMissing(_) => {
            format!("The role backing {label}:00 is gone. Ask an organizer to reopen it.")
        }
        other => format!("Something went wrong: {other}"),
    }
}

pub async fn run_set(
    ctx: &Context,
    command: &CommandInteraction,
    registry: &Mutex<SignupRegistry>,
    store: &FileStore,
    guild_id: GuildId,
) -> Result<(), serenity::Error> {
    let options = command.data.options();
    let Some(label) = option_str(&options, "hour").and_then(parse_label) else {
        return respond_ephemeral(ctx, command, "Give the hour as a number, e.g. 21.").await;
    };

    let directory = GuildDirectory::new(&ctx.http, guild_id);
    let mut registry = registry.lock().await;

    if registry.get(&label).is_some() {
        return respond_ephemeral(ctx, command, format!("Hour {label} is already open.")).await;
    }

    let tag = match directory
        .create_group(&format!("{label}{SLOT_ROLE_SUFFIX}"))
        .await
    {
        Ok(tag) => tag,
        Err(e) => {
            return respond_ephemeral(ctx, command, format!("Could not create the role: {e}"))
                .await
        }
    };

    if let Err(e) = registry.open(&label, tag, store) {
        // The role exists but the slot didn't persist; the startup
        // reconciliation will pick the role back up.
        warn!("slot {label} created but not persisted: {e}");
        return respond_ephemeral(
            ctx,
            command,
            format!("Created the role but could not save the slot: {e}"),
        )
        .await;
    }

    respond_with_board(
        ctx,
        command,
        Some(format!("Hour {label} is open for signups.")),
        &registry,
        &directory,
    )
    .await
}

pub async fn run_out(
    ctx: &Context,
    command: &CommandInteraction,
    registry: &Mutex<SignupRegistry>,
    store: &FileStore,
    guild_id: GuildId,
) -> Result<(), serenity::Error> {
    let options = command.data.options();
    let Some(label) = option_str(&options, "hour").and_then(parse_label) else {
        return respond_ephemeral(ctx, command, "Give the hour as a number, e.g. 21.").await;
    };

    let directory = GuildDirectory::new(&ctx.http, guild_id);
    let mut registry = registry.lock().await;

    let Some(tag) = registry.get(&label) else {
        return respond_ephemeral(ctx, command, format!("Hour {label} is not open.")).await;
    };

    // The role may already be gone; the slot still has to go.
    if let Err(e) = directory.delete_group(tag).await {
        warn!("could not delete role for slot {label}: {e}");
    }
    if let Err(e) = registry.close(&label, store) {
        return respond_ephemeral(ctx, command, signup_error_text(&label, &e)).await;
    }

    respond_with_board(
        ctx,
        command,
        Some(format!("Hour {label} is closed.")),
        &registry,
        &directory,
    )
    .await
}

pub async fn run_now(
    ctx: &Context,
    command: &CommandInteraction,
    registry: &Mutex<SignupRegistry>,
    guild_id: GuildId,
) -> Result<(), serenity::Error> {
    let directory = GuildDirectory::new(&ctx.http, guild_id);
    let registry = registry.lock().await;
    respond_with_board(ctx, command, None, &registry, &directory).await
}

pub async fn run_can(
    ctx: &Context,
    command: &CommandInteraction,
    registry: &Mutex<SignupRegistry>,
    guild_id: GuildId,
) -> Result<(), serenity::Error> {
    let options = command.data.options();
    let Some(label) = option_str(&options, "hour").and_then(parse_label) else {
        return respond_ephemeral(ctx, command, "Give the hour as a number, e.g. 21.").await;
    };

    let directory = GuildDirectory::new(&ctx.http, guild_id);
    let registry = registry.lock().await;

    match join(&registry, &directory, command.user.id, &label).await {
        Ok(true) => {
            respond_with_board(
                ctx,
                command,
                Some(format!("<@{}> signed up for {label}:00.", command.user.id)),
                &registry,
                &directory,
            )
            .await
        }
        Ok(false) => {
            respond_ephemeral(
                ctx,
                command,
                format!("You are already signed up for {label}:00."),
            )
            .await
        }
        Err(e) => respond_ephemeral(ctx, command, signup_error_text(&label, &e)).await,
    }
}

pub async fn run_drop(
    ctx: &Context,
    command: &CommandInteraction,
    registry: &Mutex<SignupRegistry>,
    guild_id: GuildId,
) -> Result<(), serenity::Error> {
    let options = command.data.options();
    let Some(label) = option_str(&options, "hour").and_then(parse_label) else {
        return respond_ephemeral(ctx, command, "Give the hour as a number, e.g. 21.").await;
    };

    let directory = GuildDirectory::new(&ctx.http, guild_id);
    let registry = registry.lock().await;

    match leave(&registry, &directory, command.user.id, &label).await {
        Ok(true) => {
            respond_with_board(
                ctx,
                command,
                Some(format!("<@{}> withdrew from {label}:00.", command.user.id)),
                &registry,
                &directory,
            )
            .await
        }
        Ok(false) => {
            respond_ephemeral(ctx, command, format!("You are not signed up for {label}:00."))
                .await
        }
        Err(e) => respond_ephemeral(ctx, command, signup_error_text(&label, &e)).await,
    }
}

pub async fn run_clear(
    ctx: &Context,
    command: &CommandInteraction,
    registry: &Mutex<SignupRegistry>,
    guild_id: GuildId,
) -> Result<(), serenity::Error> {
    let directory = GuildDirectory::new(&ctx.http, guild_id);
    let registry = registry.lock().await;

    match clear_all(&registry, &directory).await {
        Ok(removed) => {
            respond_with_board(
                ctx,
                command,
                Some(format!("Cleared {removed} signups.")),
                &registry,
                &directory,
            )
            .await
        }
        Err(e) => respond_ephemeral(ctx, command, format!("Could not clear signups: {e}")).await,
    }
}

pub async fn run_pick(
    ctx: &Context,
    command: &CommandInteraction,
    registry: &Mutex<SignupRegistry>,
    guild_id: GuildId,
) -> Result<(), serenity::Error> {
    let options = command.data.options();
    let Some(label) = option_str(&options, "hour").and_then(parse_label) else {
        return respond_ephemeral(ctx, command, "Give the hour as a number, e.g. 21.").await;
    };

    let directory = GuildDirectory::new(&ctx.http, guild_id);
    let registry = registry.lock().await;

    match pick(&registry, &directory, &label).await {
        Ok(Some(user)) => {
            command
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .content(format!("{label}:00 diplomat: <@{user}>")),
                    ),
                )
                .await
        }
        Ok(None) => {
            respond_ephemeral(ctx, command, format!("Nobody is signed up for {label}:00."))
                .await
        }
        Err(e) => respond_ephemeral(ctx, command, signup_error_text(&label, &e)).await,
    }
}
