use crate::{event::*, plugin::*};
use anyhow::Result;

/// Stops bot accounts, including this one, from reaching any command plugin.
pub struct IgnoreBots;

#[serenity::async_trait]
impl Plugin for IgnoreBots {
    fn name(&self) -> &'static str {
        "ignore_bots"
    }

    async fn usage(&self, _ctx: &Context) -> Option<String> {
        None
    }

    async fn handle(&self, _ctx: &Context, event: &Event) -> Result<EventHandled> {
        let from_bot = match event {
            Event::Message(msg) => msg.author.bot,
            Event::Component(interaction) => interaction.user.bot,
            // Member events still need greeting even when the member is a bot
            _ => false,
        };

        if from_bot {
            Ok(EventHandled::Yes)
        } else {
            Ok(EventHandled::No)
        }
    }
}
