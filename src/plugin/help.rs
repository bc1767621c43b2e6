use crate::{event::*, helper::palette, plugin::*};
use anyhow::Result;
use serenity::all::{CreateEmbed, CreateMessage};

pub struct Help;

#[serenity::async_trait]
impl Plugin for Help {
    fn name(&self) -> &'static str {
        "help"
    }

    async fn usage(&self, ctx: &Context) -> Option<String> {
        let prefix = &ctx.cfg.read().await.general.command_prefix;
        Some(format!(
            "{}{} [section] - show this help message, or one section of it",
            prefix,
            self.name()
        ))
    }

    async fn handle(&self, ctx: &Context, event: &Event) -> Result<EventHandled> {
        let Some((msg, args)) = event.is_bot_cmd(ctx, self.name()).await else {
            return Ok(EventHandled::No);
        };
        let section = args.first().map(|s| s.to_ascii_lowercase());

        let mut embed = CreateEmbed::new()
            .title("Bot Help Menu")
            .description("Here are the available commands:")
            .colour(palette::BLUE);
        let mut shown = 0;
        for plugin in crate::plugin::plugins() {
            if section.as_deref().is_some_and(|s| s != plugin.name()) {
                continue;
            }
            if let Some(usage) = plugin.usage(ctx).await {
                embed = embed.field(plugin.name(), format!("```\n{}\n```", usage), false);
                shown += 1;
            }
        }

        if shown == 0 {
            msg.reply(ctx.cache_http, "❌ No such help section.").await?;
        } else {
            msg.channel_id
                .send_message(ctx.cache_http, CreateMessage::new().embed(embed))
                .await?;
        }
        Ok(EventHandled::Yes)
    }
}
