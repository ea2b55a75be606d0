use crate::commands::author_voice_channel;
use crate::{Context, Error};

/// Queue a song from a URL or search query
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn play(
    ctx: Context<'_>,
    #[description = "Song URL or search query"]
    #[rest]
    query: String,
) -> Result<(), Error> {
    let (guild_id, author_channel) = author_voice_channel(ctx)?;

    ctx.defer().await?;

    ctx.data()
        .music
        .play(guild_id, author_channel, &query, ctx.channel_id())
        .await?;

    ctx.say("Song added to the queue.").await?;
    Ok(())
}
