// File: tunebot-core/src/services/discord/slashcommands/play_music.rs

use tracing::warn;
use twilight_model::application::command::CommandType;
use twilight_model::application::interaction::application_command::{
    CommandData,
    CommandOptionValue,
};
use twilight_model::application::interaction::Interaction;
use twilight_util::builder::command::{CommandBuilder, StringBuilder};

use crate::services::discord::slashcommands::{
    caller_voice_channel,
    defer_response,
    followup_text,
    respond_text,
};
use crate::services::discord::CommandContext;
use crate::services::playback::music::EnqueueOutcome;
use crate::Error;

/// Create a CommandBuilder for the "play_music" slash command.
pub fn create_play_music_command() -> CommandBuilder {
    CommandBuilder::new(
        "play_music",
        "🎵 Play a music track from a URL.",
        CommandType::ChatInput,
    )
    .dm_permission(false)
    .option(StringBuilder::new("url", "Link to the audio to play").required(true))
}

/// Handle the "/play_music" slash command.
pub async fn handle_play_music(
    ctx: &CommandContext,
    interaction: &Interaction,
    data: &CommandData,
) -> Result<(), Error> {
    let Some(url) = url_option(data) else {
        // The option is registered as required, so this only happens when the
        // payload is malformed.
        return Err(Error::Platform(
            "play_music interaction is missing the url option".to_string(),
        ));
    };

    let Some((guild_id, channel_id)) = caller_voice_channel(ctx, interaction) else {
        return respond_text(ctx, interaction, "📢 Please join a voice channel first!").await;
    };

    defer_response(ctx, interaction).await?;

    let text = match ctx.registry.get_or_create_music(guild_id, channel_id).await {
        Ok(handle) => match handle.enqueue(url.clone()).await {
            Some(EnqueueOutcome::Started(started)) => format!("🎶 Now playing: {started}"),
            Some(EnqueueOutcome::Queued) => format!("✅ Added to queue: {url}"),
            Some(EnqueueOutcome::Failed) | None => format!("❌ Could not play: {url}"),
        },
        Err(e) => {
            warn!("(PlayMusic) guild {guild_id} => could not join voice: {e:?}");
            "❌ Could not join your voice channel.".to_string()
        }
    };

    followup_text(ctx, interaction, &text).await
}

fn url_option(data: &CommandData) -> Option<String> {
    for option in &data.options {
        if option.name == "url" {
            if let CommandOptionValue::String(url) = &option.value {
                return Some(url.clone());
            }
        }
    }
    None
}
