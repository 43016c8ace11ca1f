// File: tunebot-core/src/services/discord/slashcommands/skip_music.rs

use twilight_model::application::command::CommandType;
use twilight_model::application::interaction::Interaction;
use twilight_util::builder::command::CommandBuilder;

use crate::services::discord::slashcommands::respond_text;
use crate::services::discord::CommandContext;
use crate::services::playback::music::SkipOutcome;
use crate::services::playback::PlaybackRegistry;
use crate::Error;

/// Create a CommandBuilder for the "skip_music" slash command.
pub fn create_skip_music_command() -> CommandBuilder {
    CommandBuilder::new("skip_music", "⏭ Skip the current music track.", CommandType::ChatInput)
        .dm_permission(false)
}

/// Handle the "/skip_music" slash command.
pub async fn handle_skip_music(
    ctx: &CommandContext,
    interaction: &Interaction,
) -> Result<(), Error> {
    let guild_id = interaction.guild_id.map(|guild_id| guild_id.get());
    let text = skip_reply(&ctx.registry, guild_id).await;
    respond_text(ctx, interaction, text).await
}

/// A guild with no player at all reads as an empty queue; only an existing
/// session can report that nothing is playing.
async fn skip_reply(registry: &PlaybackRegistry, guild_id: Option<u64>) -> &'static str {
    let Some(handle) = guild_id.and_then(|guild_id| registry.music(guild_id)) else {
        return "❌ The queue is empty.";
    };
    match handle.skip().await {
        Some(SkipOutcome::Skipped) => "⏭ Track skipped.",
        Some(SkipOutcome::NothingPlaying) | None => "❌ No music is currently playing.",
    }
}
