// src/discord/commands/rating.rs
//
// VR (in-game rating) bookkeeping. A member registers their VR exactly
// once; /ave averages the registered values of everyone signed up for a
// given hour.

use super::{option_int, option_str, respond_ephemeral};
use crate::discord::roles::GuildDirectory;
use crate::signup::{GroupDirectory, SignupRegistry};
use crate::storage::StorageClient;
use serenity::builder::{CreateCommand, CreateCommandOption};
use serenity::model::application::{CommandInteraction, CommandOptionType};
use serenity::model::id::GuildId;
use serenity::prelude::*;
use tokio::sync::Mutex;

pub fn register_vr() -> CreateCommand {
    CreateCommand::new("vr")
        .description("Register your VR (cannot be changed afterwards)")
        .add_option(
            CreateCommandOption::new(CommandOptionType::Integer, "value", "Your current VR")
                .required(true),
        )
}

pub fn register_ave() -> CreateCommand {
    CreateCommand::new("ave")
        .description("Average VR of everyone signed up for an hour")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "hour", "The hour, e.g. 21")
                .required(true),
        )
}

pub async fn run_vr(
    ctx: &Context,
    command: &CommandInteraction,
    storage: &StorageClient,
) -> Result<(), serenity::Error> {
    let options = command.data.options();
    let Some(value) = option_int(&options, "value") else {
        return respond_ephemeral(ctx, command, "Missing VR value.").await;
    };
    if value < 0 {
        return respond_ephemeral(ctx, command, "VR cannot be negative.").await;
    }

    match storage.set_vr(command.user.id, value) {
        Ok(None) => respond_ephemeral(ctx, command, format!("Registered your VR as {value}.")).await,
        Ok(Some(current)) => {
            respond_ephemeral(
                ctx,
                command,
                format!("You already registered {current}; VR cannot be changed."),
            )
            .await
        }
        Err(e) => respond_ephemeral(ctx, command, format!("Could not register: {e}")).await,
    }
}

pub async fn run_ave(
    ctx: &Context,
    command: &CommandInteraction,
    registry: &Mutex<SignupRegistry>,
    storage: &StorageClient,
    guild_id: GuildId,
) -> Result<(), serenity::Error> {
    let options = command.data.options();
    let Some(hour) = option_str(&options, "hour") else {
        return respond_ephemeral(ctx, command, "Missing hour.").await;
    };

    let tag = { registry.lock().await.get(hour) };
    let Some(tag) = tag else {
        return respond_ephemeral(ctx, command, format!("{hour}:00 is not open.")).await;
    };

    let directory = GuildDirectory::new(&ctx.http, guild_id);
    let members = match directory.members_of(tag).await {
        Ok(Some(members)) => members,
        Ok(None) => {
            return respond_ephemeral(ctx, command, format!("The {hour}h role is gone.")).await
        }
        Err(e) => return respond_ephemeral(ctx, command, format!("Could not look up: {e}")).await,
    };
    if members.is_empty() {
        return respond_ephemeral(ctx, command, format!("Nobody is signed up for {hour}:00."))
            .await;
    }

    let values = match storage.vr_for_users(&members) {
        Ok(values) => values,
        Err(e) => return respond_ephemeral(ctx, command, format!("Could not look up: {e}")).await,
    };
    if values.is_empty() {
        return respond_ephemeral(
            ctx,
            command,
            format!("Nobody signed up for {hour}:00 has registered a VR yet."),
        )
        .await;
    }

    let average = values.iter().sum::<i64>() as f64 / values.len() as f64;
    respond_ephemeral(
        ctx,
        command,
        format!(
            "Average VR at {hour}:00 is {average:.2} ({} of {} registered).",
            values.len(),
            members.len()
        ),
    )
    .await
}
