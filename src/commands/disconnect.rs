use crate::services::error::MusicError;
use crate::{Context, Error};

/// Stop playback, clear the queue, and leave the voice channel
#[poise::command(slash_command, prefix_command, guild_only, aliases("leave"))]
pub async fn disconnect(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;

    ctx.data().music.disconnect(guild_id).await?;

    ctx.say("Disconnected.").await?;
    Ok(())
}
