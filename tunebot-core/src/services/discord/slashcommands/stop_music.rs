// File: tunebot-core/src/services/discord/slashcommands/stop_music.rs

use twilight_model::application::command::CommandType;
use twilight_model::application::interaction::Interaction;
use twilight_util::builder::command::CommandBuilder;

use crate::services::discord::slashcommands::respond_text;
use crate::services::discord::CommandContext;
use crate::Error;

/// Create a CommandBuilder for the "stop_music" slash command.
pub fn create_stop_music_command() -> CommandBuilder {
    CommandBuilder::new("stop_music", "🛑 Stop music playback.", CommandType::ChatInput)
        .dm_permission(false)
}

/// Handle the "/stop_music" slash command.
pub async fn handle_stop_music(
    ctx: &CommandContext,
    interaction: &Interaction,
) -> Result<(), Error> {
    let stopped = match interaction.guild_id {
        Some(guild_id) => ctx.registry.stop_music(guild_id.get()).await,
        None => false,
    };

    let text = if stopped {
        "🛑 Music playback stopped."
    } else {
        "❌ No music is currently playing."
    };

    respond_text(ctx, interaction, text).await
}
