// src/discord/commands/ping.rs
use serenity::builder::{CreateCommand, CreateInteractionResponse, CreateInteractionResponseMessage};
use serenity::model::application::CommandInteraction;
use serenity::prelude::*;

pub fn register() -> CreateCommand {
    CreateCommand::new("ping").description("Check whether the bot is awake")
}

pub async fn run(ctx: &Context, command: &CommandInteraction) -> Result<(), serenity::Error> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content("pong")
                    .ephemeral(true),
            ),
        )
        .await
}
