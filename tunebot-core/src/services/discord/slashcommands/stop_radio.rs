// File: tunebot-core/src/services/discord/slashcommands/stop_radio.rs

use twilight_model::application::command::CommandType;
use twilight_model::application::interaction::Interaction;
use twilight_util::builder::command::CommandBuilder;

use crate::services::discord::slashcommands::respond_text;
use crate::services::discord::CommandContext;
use crate::Error;

/// Create a CommandBuilder for the "stop_radio" slash command.
pub fn create_stop_radio_command() -> CommandBuilder {
    CommandBuilder::new("stop_radio", "🛑 Stop the radio.", CommandType::ChatInput)
        .dm_permission(false)
}

/// Handle the "/stop_radio" slash command.
pub async fn handle_stop_radio(
    ctx: &CommandContext,
    interaction: &Interaction,
) -> Result<(), Error> {
    let stopped = match interaction.guild_id {
        Some(guild_id) => ctx.registry.stop_radio(guild_id.get()).await,
        None => false,
    };

    let text = if stopped {
        "🛑 Radio has been stopped."
    } else {
        "❌ No radio is currently playing."
    };

    respond_text(ctx, interaction, text).await
}
