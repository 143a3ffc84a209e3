// src/discord/commands/mod.rs
pub mod mmr;
pub mod ping;
pub mod rating;
pub mod results;
pub mod signup;

use serenity::builder::{CreateInteractionResponse, CreateInteractionResponseMessage};
use serenity::model::application::{CommandInteraction, ResolvedOption, ResolvedValue};
use serenity::model::guild::Role;
use serenity::prelude::*;

pub(crate) fn option_str<'a>(options: &'a [ResolvedOption<'a>], name: &str) -> Option<&'a str> {
    options.iter().find_map(|opt| match opt.value {
        ResolvedValue::String(s) if opt.name == name => Some(s),
        _ => None,
    })
}

pub(crate) fn option_int(options: &[ResolvedOption<'_>], name: &str) -> Option<i64> {
    options.iter().find_map(|opt| match opt.value {
        ResolvedValue::Integer(i) if opt.name == name => Some(i),
        _ => None,
    })
}

pub(crate) fn option_role<'a>(options: &'a [ResolvedOption<'a>], name: &str) -> Option<&'a Role> {
    options.iter().find_map(|opt| match opt.value {
        ResolvedValue::Role(role) if opt.name == name => Some(role),
        _ => None,
    })
}

/// Ephemeral one-liner, the shape most command errors take.
pub(crate) async fn respond_ephemeral(
    ctx: &Context,
    command: &CommandInteraction,
    text: impl Into<String>,
) -> Result<(), serenity::Error> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(text)
                    .ephemeral(true),
            ),
        )
        .await
}
