pub mod disconnect;
pub mod join;
pub mod play;
pub mod queue;
pub mod repeat;
pub mod skip;
pub mod stop;

use poise::serenity_prelude::{ChannelId, GuildId};

use crate::Context;
use crate::services::error::MusicError;

/// The invoking guild and the voice channel its author currently sits in.
pub fn author_voice_channel(ctx: Context<'_>) -> Result<(GuildId, Option<ChannelId>), MusicError> {
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;
    let channel = ctx.guild().and_then(|guild| {
        guild
            .voice_states
            .get(&ctx.author().id)
            .and_then(|vs| vs.channel_id)
    });
    Ok((guild_id, channel))
}
