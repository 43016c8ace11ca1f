// File: tunebot-core/src/services/discord/slashcommands/play_radio.rs

use tracing::warn;
use twilight_model::application::command::CommandType;
use twilight_model::application::interaction::Interaction;
use twilight_util::builder::command::CommandBuilder;

use crate::services::discord::slashcommands::{
    caller_voice_channel,
    defer_response,
    followup_text,
    respond_text,
};
use crate::services::discord::CommandContext;
use crate::services::playback::radio::StartOutcome;
use crate::Error;

/// Create a CommandBuilder for the "play_radio" slash command.
pub fn create_play_radio_command() -> CommandBuilder {
    CommandBuilder::new(
        "play_radio",
        "🎶 Play the radio station in a voice channel.",
        CommandType::ChatInput,
    )
    .dm_permission(false)
}

/// Handle the "/play_radio" slash command.
pub async fn handle_play_radio(
    ctx: &CommandContext,
    interaction: &Interaction,
) -> Result<(), Error> {
    let Some((guild_id, channel_id)) = caller_voice_channel(ctx, interaction) else {
        return respond_text(ctx, interaction, "📢 Please join a voice channel first!").await;
    };

    defer_response(ctx, interaction).await?;

    let text = match ctx.registry.get_or_create_radio(guild_id, channel_id).await {
        Ok(handle) => match handle.start().await {
            Some(StartOutcome::Started) => "🎶 The radio is now playing!",
            Some(StartOutcome::AlreadyStreaming) => "🎵 The radio is already playing.",
            Some(StartOutcome::Failed) | None => "❌ Could not start the radio stream.",
        },
        Err(e) => {
            warn!("(PlayRadio) guild {guild_id} => could not join voice: {e:?}");
            "❌ Could not join your voice channel."
        }
    };

    followup_text(ctx, interaction, text).await
}
