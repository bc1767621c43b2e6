use crate::{
    context::Context,
    event::{Event, EventHandled},
};
use anyhow::Result;

mod debug;
mod game;
mod general;
mod giveaway;
mod help;
mod ignore_bots;
mod moderation;
mod onboarding;
mod ready;
mod reload;

#[serenity::async_trait]
pub trait Plugin: Sync + Send {
    /// Plugin name.  Used for debug and, for single-command plugins, as the command itself
    fn name(&self) -> &'static str;
    /// Help message lines.  None if no help message
    async fn usage(&self, ctx: &Context) -> Option<String>;
    /// Potentially handle event.  Returns:
    /// - Ok(EventHandled::Yes) if the event has been handled and no other plugin should attempt to
    ///   handle it
    /// - Ok(EventHandled::No) if another plugin should attempt to handle the event
    /// - Err if an error occurred
    async fn handle(&self, ctx: &Context, event: &Event) -> Result<EventHandled>;
}

/// Ordered list of available plugins
pub fn plugins() -> Vec<Box<dyn Plugin>> {
    vec![
        // Core bot operations
        Box::new(debug::Debug),
        Box::new(ready::Ready),
        Box::new(ignore_bots::IgnoreBots),
        Box::new(help::Help),
        Box::new(reload::Reload),
        // Server events
        Box::new(onboarding::Onboarding),
        // Commands
        Box::new(general::General),
        Box::new(moderation::Moderation),
        Box::new(giveaway::Giveaway),
        Box::new(game::Game),
    ]
}
