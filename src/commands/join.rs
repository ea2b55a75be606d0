use poise::serenity_prelude as serenity;

use crate::commands::author_voice_channel;
use crate::{Context, Error};

/// Join a voice channel, or your current one if none is given
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn join(
    ctx: Context<'_>,
    #[description = "Voice channel to join"]
    #[channel_types("Voice")]
    channel: Option<serenity::GuildChannel>,
) -> Result<(), Error> {
    let (guild_id, author_channel) = author_voice_channel(ctx)?;

    let joined = ctx
        .data()
        .music
        .join(guild_id, author_channel, channel.map(|c| c.id))
        .await?;

    ctx.say(format!("Joined <#{joined}>.")).await?;
    Ok(())
}
