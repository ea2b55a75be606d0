use crate::services::error::MusicError;
use crate::{Context, Error};

/// Skip the current track
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn skip(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;

    if ctx.data().music.skip(guild_id).await {
        ctx.say("Skipped current track.").await?;
    } else if let poise::Context::Application(_) = ctx {
        // Slash commands must be answered; prefix commands stay silent.
        ctx.send(
            poise::CreateReply::default()
                .content("Nothing is playing.")
                .ephemeral(true),
        )
        .await?;
    }

    Ok(())
}
