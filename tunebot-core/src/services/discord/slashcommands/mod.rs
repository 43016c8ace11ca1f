// File: tunebot-core/src/services/discord/slashcommands/mod.rs

pub mod play_music;
pub mod play_radio;
pub mod queue_music;
pub mod skip_music;
pub mod stop_music;
pub mod stop_radio;

use std::sync::Arc;

use twilight_http::Client as HttpClient;
use twilight_model::{
    application::interaction::{Interaction, InteractionData},
    gateway::payload::incoming::InteractionCreate,
    http::interaction::{InteractionResponse, InteractionResponseData, InteractionResponseType},
    id::marker::ApplicationMarker,
    id::Id,
};

use crate::services::discord::CommandContext;
use crate::services::discord::slashcommands::play_music::{
    create_play_music_command,
    handle_play_music,
};
use crate::services::discord::slashcommands::play_radio::{
    create_play_radio_command,
    handle_play_radio,
};
use crate::services::discord::slashcommands::queue_music::{
    create_queue_music_command,
    handle_queue_music,
};
use crate::services::discord::slashcommands::skip_music::{
    create_skip_music_command,
    handle_skip_music,
};
use crate::services::discord::slashcommands::stop_music::{
    create_stop_music_command,
    handle_stop_music,
};
use crate::services::discord::slashcommands::stop_radio::{
    create_stop_radio_command,
    handle_stop_radio,
};
use crate::Error;

pub async fn register_global_slash_commands(
    http: &Arc<HttpClient>,
    application_id: Id<ApplicationMarker>,
) -> Result<(), Error> {
    let commands = &[
        create_play_radio_command().build(),
        create_stop_radio_command().build(),
        create_play_music_command().build(),
        create_skip_music_command().build(),
        create_stop_music_command().build(),
        create_queue_music_command().build(),
    ];

    http.interaction(application_id)
        .set_global_commands(commands)
        .await
        .map_err(|e| Error::Platform(format!("Failed to register global slash commands: {e}")))?;

    Ok(())
}

/// Dispatch slash commands from an `InteractionCreate`.
pub async fn handle_interaction_create(
    ctx: &CommandContext,
    event: &InteractionCreate,
) -> Result<(), Error> {
    let interaction = &event.0;

    // Only handle ApplicationCommand interactions:
    if let Some(InteractionData::ApplicationCommand(cmd_data)) = &interaction.data {
        let name = cmd_data.name.as_str();
        match name {
            "play_radio" => handle_play_radio(ctx, interaction).await?,
            "stop_radio" => handle_stop_radio(ctx, interaction).await?,
            "play_music" => handle_play_music(ctx, interaction, cmd_data).await?,
            "skip_music" => handle_skip_music(ctx, interaction).await?,
            "stop_music" => handle_stop_music(ctx, interaction).await?,
            "queue_music" => handle_queue_music(ctx, interaction).await?,
            other => {
                // For unknown commands, respond with error:
                ctx.http
                    .interaction(ctx.application_id)
                    .create_response(
                        interaction.id,
                        &interaction.token,
                        &InteractionResponse {
                            kind: InteractionResponseType::ChannelMessageWithSource,
                            data: Some(InteractionResponseData {
                                content: Some(format!("Unrecognized command: {other}")),
                                ..Default::default()
                            }),
                        },
                    )
                    .await
                    .ok(); // ignore error
            }
        }
    }

    Ok(())
}

/// Resolves the caller's current voice channel from the cache. `None` when
/// the command came from outside a guild or the caller is not in a voice
/// channel.
fn caller_voice_channel(ctx: &CommandContext, interaction: &Interaction) -> Option<(u64, u64)> {
    let guild_id = interaction.guild_id?;
    let user_id = interaction.author_id()?;
    let state = ctx.cache.voice_state(user_id, guild_id)?;
    Some((guild_id.get(), state.channel_id().get()))
}

async fn respond_text(
    ctx: &CommandContext,
    interaction: &Interaction,
    text: &str,
) -> Result<(), Error> {
    ctx.http
        .interaction(ctx.application_id)
        .create_response(
            interaction.id,
            &interaction.token,
            &InteractionResponse {
                kind: InteractionResponseType::ChannelMessageWithSource,
                data: Some(InteractionResponseData {
                    content: Some(text.to_string()),
                    ..Default::default()
                }),
            },
        )
        .await
        .map_err(|e| Error::Platform(format!("Error responding to interaction: {e}")))?;

    Ok(())
}

/// Acknowledges the interaction now so the real reply can follow once the
/// voice connection is up; connecting can outlast the response deadline.
async fn defer_response(ctx: &CommandContext, interaction: &Interaction) -> Result<(), Error> {
    ctx.http
        .interaction(ctx.application_id)
        .create_response(
            interaction.id,
            &interaction.token,
            &InteractionResponse {
                kind: InteractionResponseType::DeferredChannelMessageWithSource,
                data: None,
            },
        )
        .await
        .map_err(|e| Error::Platform(format!("Error deferring interaction: {e}")))?;

    Ok(())
}

async fn followup_text(
    ctx: &CommandContext,
    interaction: &Interaction,
    text: &str,
) -> Result<(), Error> {
    ctx.http
        .interaction(ctx.application_id)
        .create_followup(&interaction.token)
        .content(text)
        .await
        .map_err(|e| Error::Platform(format!("Error sending follow-up: {e}")))?;

    Ok(())
}
