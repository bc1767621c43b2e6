use crate::{event::*, game::StageTable, helper::MessageHelper, log_internal, plugin::*};
use anyhow::Result;

/// Re-reads the configuration file and the stage table it points at.
pub struct Reload;

#[serenity::async_trait]
impl Plugin for Reload {
    fn name(&self) -> &'static str {
        "reload"
    }

    async fn usage(&self, ctx: &Context) -> Option<String> {
        let prefix = &ctx.cfg.read().await.general.command_prefix;
        Some(format!(
            "{}{} - reload config and stages (bot owner only)",
            prefix,
            self.name()
        ))
    }

    async fn handle(&self, ctx: &Context, event: &Event) -> Result<EventHandled> {
        let Some((msg, _)) = event.is_bot_cmd(ctx, self.name()).await else {
            return Ok(EventHandled::No);
        };

        if !msg.is_from_owner(ctx).await {
            msg.reply(ctx.cache_http, "❌ Only the bot owner can do that.")
                .await?;
            return Ok(EventHandled::Yes);
        }

        let response = match reload(ctx).await {
            Ok(count) => format!("Configuration reloaded successfully ({} stages)", count),
            Err(e) => format!("❌ Reload failed: {}", e),
        };

        msg.reply(ctx.cache_http, response).await?;
        Ok(EventHandled::Yes)
    }
}

/// Nothing is replaced unless both the configuration and the stage table load.
async fn reload(ctx: &Context<'_>) -> Result<usize> {
    let mut cfg = ctx.cfg.write().await;
    let new_cfg = crate::config::Config::load().await?;
    let stages = StageTable::load(&new_cfg.game.stages_path).await?;
    let count = stages.len();

    *cfg = new_cfg;
    *ctx.stages.write().await = stages;
    log_internal!("Reloaded configuration and {} stage(s)", count);
    Ok(count)
}
