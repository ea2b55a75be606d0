use crate::services::error::MusicError;
use crate::{Context, Error};

/// Toggle repeat: finished songs go back to the end of the queue
#[poise::command(slash_command, prefix_command, guild_only, rename = "loop")]
pub async fn repeat(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;

    let enabled = ctx.data().music.toggle_repeat(guild_id).await;

    ctx.say(if enabled { "Loop enabled." } else { "Loop disabled." })
        .await?;
    Ok(())
}
