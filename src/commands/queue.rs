use poise::serenity_prelude::{Colour, CreateEmbed, CreateEmbedFooter};

use crate::services::error::MusicError;
use crate::services::music_service::QueueSnapshot;
use crate::{Context, Error};

const QUEUE_COLOR: Colour = Colour::new(0x5865F2);
const MAX_DISPLAY: usize = 10;

fn up_next(snapshot: &QueueSnapshot) -> String {
    let mut desc = String::new();
    for (i, track) in snapshot.pending.iter().take(MAX_DISPLAY).enumerate() {
        desc.push_str(&format!("`{}.` {}\n", i + 1, track.reference));
    }
    desc
}

fn footer(snapshot: &QueueSnapshot) -> String {
    let count = snapshot.pending.len();
    let remaining = count.saturating_sub(MAX_DISPLAY);
    let mut text = if remaining > 0 {
        format!("{count} tracks in queue (+{remaining} more)")
    } else {
        format!("{count} tracks in queue")
    };
    if snapshot.repeat {
        text.push_str(" · loop on");
    }
    text
}

/// Show the current music queue
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn queue(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;

    let snapshot = ctx.data().music.snapshot(guild_id).await;
    if snapshot.now_playing.is_none() && snapshot.pending.is_empty() {
        return Err(MusicError::EmptyQueue.into());
    }

    let mut reply = poise::CreateReply::default();

    if let Some(current) = &snapshot.now_playing {
        reply = reply.embed(
            CreateEmbed::new()
                .title("Now playing")
                .description(current.reference.clone())
                .colour(QUEUE_COLOR),
        );
    }

    if !snapshot.pending.is_empty() {
        reply = reply.embed(
            CreateEmbed::new()
                .title("Up next")
                .description(up_next(&snapshot))
                .colour(QUEUE_COLOR)
                .footer(CreateEmbedFooter::new(footer(&snapshot))),
        );
    }

    ctx.send(reply).await?;
    Ok(())
}
