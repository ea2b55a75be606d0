use crate::services::error::MusicError;
use crate::{Context, Error};

/// Stop playback and clear the queue
#[poise::command(slash_command, prefix_command, guild_only, aliases("clear"))]
pub async fn stop(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;

    let outcome = ctx.data().music.stop(guild_id).await;
    tracing::debug!(%guild_id, ?outcome, "Stop command");

    ctx.say("Stopped playback and cleared the queue.").await?;
    Ok(())
}
