//! The Serenity crate we're using for the Discord API is designed around callbacks to handle
//! events.  However, this does not mesh well with our plugin framework here.  To resolve this,
//! the handler translates the callbacks into a distinct Event enum.

use crate::{context::Context, log_error};
use serenity::all::{ComponentInteraction, Guild, GuildId, Member, Message, Ready, User};

/// A Discord event
pub enum Event {
    Ready(Ready),
    Message(Message),
    /// Button press or select menu choice
    Component(ComponentInteraction),
    MemberAdd(Member),
    MemberRemove {
        guild_id: GuildId,
        user: User,
    },
    GuildCreate {
        guild: Guild,
        /// Only `Some(true)` when the bot was just added to the guild
        is_new: Option<bool>,
    },
}

pub enum EventHandled {
    Yes,
    No,
}

impl Event {
    // When an event occurs, iterate over all the plugins to see if any can/should handle it.
    pub async fn handle(self, ctx: Context<'_>) {
        for plugin in crate::plugin::plugins() {
            match plugin.handle(&ctx, &self).await {
                Ok(EventHandled::Yes) => return,
                Ok(EventHandled::No) => continue,
                Err(err) => log_error!("Error in plugin {}: {}", plugin.name(), err),
            }
        }
    }

    /// Check if a message should be interpreted as a special bot command.
    ///
    /// These are prefixed with the configured command prefix, e.g. `.cmd foo bar baz`.  Returns the
    /// message and the whitespace separated arguments following the command.
    pub async fn is_bot_cmd(&self, ctx: &Context<'_>, cmd: &str) -> Option<(&Message, Vec<&str>)> {
        let Event::Message(msg) = self else {
            return None;
        };

        let mut words = msg.content.split_ascii_whitespace();
        let first = words.next()?;
        let prefix = &ctx.cfg.read().await.general.command_prefix;
        if first.strip_prefix(prefix.as_str())? != cmd {
            return None;
        }

        Some((msg, words.collect()))
    }

    /// Check if this is a component interaction whose custom id lives in namespace `ns`, i.e.
    /// looks like `ns:...`.
    pub fn is_component(&self, ns: &str) -> Option<&ComponentInteraction> {
        match self {
            Event::Component(interaction)
                if interaction.data.custom_id.split(':').next() == Some(ns) =>
            {
                Some(interaction)
            }
            _ => None,
        }
    }
}
