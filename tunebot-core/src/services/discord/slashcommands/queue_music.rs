// File: tunebot-core/src/services/discord/slashcommands/queue_music.rs

use twilight_model::application::command::CommandType;
use twilight_model::application::interaction::Interaction;
use twilight_util::builder::command::CommandBuilder;

use crate::services::discord::slashcommands::respond_text;
use crate::services::discord::CommandContext;
use crate::Error;

/// Create a CommandBuilder for the "queue_music" slash command.
pub fn create_queue_music_command() -> CommandBuilder {
    CommandBuilder::new("queue_music", "🎶 Show the music queue.", CommandType::ChatInput)
        .dm_permission(false)
}

/// Handle the "/queue_music" slash command.
pub async fn handle_queue_music(
    ctx: &CommandContext,
    interaction: &Interaction,
) -> Result<(), Error> {
    let session = interaction
        .guild_id
        .and_then(|guild_id| ctx.registry.music(guild_id.get()));

    let text = match session {
        Some(handle) => match handle.queue().await {
            Some(snapshot) => format_queue_message(&snapshot.upcoming),
            None => "❌ No active music player.".to_string(),
        },
        None => "❌ No active music player.".to_string(),
    };

    respond_text(ctx, interaction, &text).await
}

/// The listing covers upcoming tracks only; the active track was already
/// announced when it started.
fn format_queue_message(upcoming: &[String]) -> String {
    if upcoming.is_empty() {
        return "❌ The queue is empty.".to_string();
    }

    let mut message = String::from("🎵 Music Queue:");
    for (index, url) in upcoming.iter().enumerate() {
        message.push_str(&format!("\n{}. {url}", index + 1));
    }
    message
}
