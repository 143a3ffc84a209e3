// src/discord/events/handler.rs

use crate::discord::commands::{mmr, ping, rating, results, signup};
use crate::discord::roles::GuildDirectory;
use crate::discord::signup_ui::{board_buttons, board_embed, TOGGLE_PREFIX};
use crate::lounge::LoungeClient;
use crate::roster::Roster;
use crate::signup::{build_snapshot, reconcile, toggle, FileStore, SignupRegistry, ToggleOutcome};
use crate::storage::StorageClient;
use log::{debug, error, info, warn};
use serenity::async_trait;
use serenity::builder::{CreateInteractionResponse, CreateInteractionResponseMessage};
use serenity::model::application::{ComponentInteraction, Interaction};
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct Handler {
    guild_id: GuildId,
    registry: Arc<Mutex<SignupRegistry>>,
    store: FileStore,
    storage: Arc<StorageClient>,
    lounge: LoungeClient,
    roster: Arc<Roster>,
}

impl Handler {
    pub fn new(
        guild_id: GuildId,
        registry: Arc<Mutex<SignupRegistry>>,
        store: FileStore,
        storage: Arc<StorageClient>,
        lounge: LoungeClient,
        roster: Arc<Roster>,
    ) -> Self {
        Self {
            guild_id,
            registry,
            store,
            storage,
            lounge,
            roster,
        }
    }

    /// One toggle button per open hour; the custom id carries the label so
    /// the buttons keep working across restarts.
    async fn handle_toggle(
        &self,
        ctx: &Context,
        component: &ComponentInteraction,
        label: &str,
    ) -> Result<(), serenity::Error> {
        let directory = GuildDirectory::new(&ctx.http, self.guild_id);
        let registry = self.registry.lock().await;

        let outcome = match toggle(&registry, &directory, component.user.id, label).await {
            Ok(outcome) => outcome,
            Err(e) => {
                return component
                    .create_response(
                        &ctx.http,
                        CreateInteractionResponse::Message(
                            CreateInteractionResponseMessage::new()
                                .content(format!("Could not update your signup: {e}"))
                                .ephemeral(true),
                        ),
                    )
                    .await
            }
        };

        let snapshot = match build_snapshot(&registry, &directory).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                return component
                    .create_response(
                        &ctx.http,
                        CreateInteractionResponse::Message(
                            CreateInteractionResponseMessage::new()
                                .content(format!("Could not refresh the board: {e}"))
                                .ephemeral(true),
                        ),
                    )
                    .await
            }
        };

        debug!(
            "{} {} slot {label}",
            component.user.id,
            match outcome {
                ToggleOutcome::Joined => "joined",
                ToggleOutcome::Left => "left",
            }
        );

        // full replacement, so a stale board never lingers
        component
            .create_response(
                &ctx.http,
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .embed(board_embed(&snapshot))
                        .components(board_buttons(registry.all().map(|(label, _)| label))),
                ),
            )
            .await
    }
}

#[async_trait]
impl serenity::client::EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        let commands = self
            .guild_id
            .set_commands(
                &ctx.http,
                vec![
                    ping::register(),
                    signup::register_set(),
                    signup::register_out(),
                    signup::register_now(),
                    signup::register_can(),
                    signup::register_drop(),
                    signup::register_clear(),
                    signup::register_pick(),
                    results::register_12(),
                    results::register_result_12(),
                    results::register_result_12_detail(),
                    results::register_result_12_delete(),
                    results::register_4team(),
                    results::register_result_4team(),
                    rating::register_vr(),
                    rating::register_ave(),
                    mmr::register_mmr(),
                    mmr::register_avemmr(),
                ],
            )
            .await;
        debug!("Slash commands registered: {:#?}", commands);

        // Roles are the source of truth for which hours exist; rebuild the
        // registry from them so out-of-band role edits are picked up.
        let directory = GuildDirectory::new(&ctx.http, self.guild_id);
        match reconcile(&directory, &self.store).await {
            Ok(rebuilt) => {
                info!("signup registry reconciled: {} slots", rebuilt.len());
                *self.registry.lock().await = rebuilt;
            }
            Err(e) => {
                warn!("signup reconciliation failed, keeping persisted state: {e}");
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command) => {
                debug!("Received command interaction: {}", command.data.name);

                let result = match command.data.name.as_str() {
                    "ping" => ping::run(&ctx, &command).await,
                    "set" => {
                        signup::run_set(&ctx, &command, &self.registry, &self.store, self.guild_id)
                            .await
                    }
                    "out" => {
                        signup::run_out(&ctx, &command, &self.registry, &self.store, self.guild_id)
                            .await
                    }
                    "now" => signup::run_now(&ctx, &command, &self.registry, self.guild_id).await,
                    "can" => signup::run_can(&ctx, &command, &self.registry, self.guild_id).await,
                    "drop" => signup::run_drop(&ctx, &command, &self.registry, self.guild_id).await,
                    "clear" => {
                        signup::run_clear(&ctx, &command, &self.registry, self.guild_id).await
                    }
                    "pick" => signup::run_pick(&ctx, &command, &self.registry, self.guild_id).await,
                    "register_12" => {
                        results::run_register_12(
                            &ctx,
                            &command,
                            &self.storage,
                            &self.roster,
                            self.guild_id,
                        )
                        .await
                    }
                    "result_12" => {
                        results::run_result_12(&ctx, &command, &self.storage, &self.roster).await
                    }
                    "result_12_detail" => {
                        results::run_result_12_detail(&ctx, &command, &self.storage).await
                    }
                    "result_12_delete" => {
                        results::run_result_12_delete(&ctx, &command, &self.storage).await
                    }
                    "register_4team" => {
                        results::run_register_4team(
                            &ctx,
                            &command,
                            &self.storage,
                            &self.roster,
                            self.guild_id,
                        )
                        .await
                    }
                    "result_4team" => {
                        results::run_result_4team(&ctx, &command, &self.storage, &self.roster)
                            .await
                    }
                    "vr" => rating::run_vr(&ctx, &command, &self.storage).await,
                    "ave" => {
                        rating::run_ave(
                            &ctx,
                            &command,
                            &self.registry,
                            &self.storage,
                            self.guild_id,
                        )
                        .await
                    }
                    "mmr" => mmr::run_mmr(&ctx, &command, &self.lounge).await,
                    "avemmr" => mmr::run_avemmr(&ctx, &command, &self.lounge, self.guild_id).await,
                    _ => {
                        command
                            .create_response(
                                &ctx.http,
                                CreateInteractionResponse::Message(
                                    CreateInteractionResponseMessage::new()
                                        .content("Command not implemented")
                                        .ephemeral(true),
                                ),
                            )
                            .await
                    }
                };

                if let Err(why) = result {
                    error!("Cannot respond to slash command: {}", why);
                }
            }
            Interaction::Component(component) => {
                let Some(label) = component
                    .data
                    .custom_id
                    .strip_prefix(TOGGLE_PREFIX)
                    .map(str::to_string)
                else {
                    // pagination and confirmation buttons are answered by
                    // their own collectors
                    return;
                };

                if let Err(why) = self.handle_toggle(&ctx, &component, &label).await {
                    error!("Cannot respond to signup button: {}", why);
                }
            }
            _ => {}
        }
    }
}
