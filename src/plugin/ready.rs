use crate::{
    event::*, log_error, log_internal, logging::*, persistent_state::ChannelKind, plugin::*,
};
use anyhow::Result;
use std::time::Duration;

const HEARTBEAT: &str = "💓 Heartbeat: Bot is still alive!";

/// Runs the heartbeat once the connection to Discord is ready.
///
/// Serenity dispatches every event on its own task, so this plugin keeps the ready event's task
/// for the lifetime of the connection.
pub struct Ready;

#[serenity::async_trait]
impl Plugin for Ready {
    fn name(&self) -> &'static str {
        "ready"
    }

    async fn usage(&self, _ctx: &Context) -> Option<String> {
        None
    }

    async fn handle(&self, ctx: &Context, event: &Event) -> Result<EventHandled> {
        let Event::Ready(_) = event else {
            return Ok(EventHandled::No);
        };

        {
            // Reconnects deliver another ready event
            let mut vstate = ctx.vstate.write().await;
            if vstate.heartbeat_running {
                return Ok(EventHandled::Yes);
            }
            vstate.heartbeat_running = true;
        }

        log_internal!("Starting heartbeat");
        loop {
            beat(ctx).await;
            let interval = ctx.cfg.read().await.heartbeat.interval_seconds;
            tokio::time::sleep(Duration::from_secs(interval.max(1))).await;
        }
    }
}

async fn beat(ctx: &Context<'_>) {
    let channels: Vec<_> = {
        let pstate = ctx.pstate.read().await;
        ctx.cache
            .guilds()
            .into_iter()
            .filter_map(|guild_id| pstate.channel(guild_id, ChannelKind::Heartbeat))
            .collect()
    };

    for channel_id in channels {
        if let Err(e) = channel_id.say(ctx.http, HEARTBEAT).await {
            log_error!(
                "Could not post heartbeat in \"{}\": {}",
                channel_id.color(ctx.http).await,
                e
            );
        }
    }
}
