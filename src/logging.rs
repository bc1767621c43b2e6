//! Colored terminal logging.  Events and internal notes go to stdout, errors to stderr.

use serenity::all::{ChannelId, CurrentUser, Guild, GuildId, Http, User};
use std::io::IsTerminal;
use std::sync::{Arc, LazyLock};

pub enum Color {
    Default,
    Event,
    Internal,
    Error,
    User,
    Channel,
    Guild,
    Glue,
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        // Fixed for the life of the process
        static COLORED: LazyLock<bool> =
            LazyLock::new(|| std::io::stdout().is_terminal() && std::io::stderr().is_terminal());

        if !*COLORED {
            return Ok(());
        }

        f.write_str(match self {
            Color::Default => "\x1b[0m",
            Color::Event => "\x1b[33m",
            Color::Internal => "\x1b[35m",
            Color::Error => "\x1b[31m",
            Color::User => "\x1b[32m",
            Color::Channel => "\x1b[36m",
            Color::Guild => "\x1b[38;5;33m",
            Color::Glue => "\x1b[90m",
        })
    }
}

/// Shared body of the `log_*` macros: a colored marker, then the message.
#[doc(hidden)]
#[macro_export]
macro_rules! log_with {
    ($print:ident, $color:ident, $marker:literal, $fmtstr:expr $(, $args:expr)* $(,)?) => {{
        $print!(
            concat!("{}", $marker, "{} ", $fmtstr),
            $crate::logging::Color::$color,
            $crate::logging::Color::Default
            $(, $args)*
        )
    }};
}

/// Something happened on Discord
#[macro_export]
macro_rules! log_event {
    ($($t:tt)*) => { $crate::log_with!(println, Event, "*", $($t)*) };
}

/// Something happened inside the bot
#[macro_export]
macro_rules! log_internal {
    ($($t:tt)*) => { $crate::log_with!(println, Internal, "+", $($t)*) };
}

/// Something failed but the bot carries on
#[macro_export]
macro_rules! log_error {
    ($($t:tt)*) => { $crate::log_with!(eprintln, Error, "!", $($t)*) };
}

fn paint(color: Color, name: &str) -> String {
    format!("{}{}{}", color, name, Color::Default)
}

pub trait PrintColor {
    fn color(&self) -> String;
}

/// For ids whose display name needs a lookup
#[serenity::async_trait]
pub trait AsyncPrintColor {
    async fn color(&self, http: &Arc<Http>) -> String;
}

/// Field separator
pub struct Glue;

impl PrintColor for Glue {
    fn color(&self) -> String {
        paint(Color::Glue, ":")
    }
}

impl PrintColor for CurrentUser {
    fn color(&self) -> String {
        paint(Color::User, &self.name)
    }
}

impl PrintColor for User {
    fn color(&self) -> String {
        paint(Color::User, &self.name)
    }
}

impl PrintColor for Guild {
    fn color(&self) -> String {
        paint(Color::Guild, &self.name)
    }
}

#[serenity::async_trait]
impl AsyncPrintColor for ChannelId {
    async fn color(&self, http: &Arc<Http>) -> String {
        match self.name(http).await {
            Ok(name) => paint(Color::Channel, &name),
            Err(_) => paint(Color::Channel, "<unknown-channel>"),
        }
    }
}

#[serenity::async_trait]
impl AsyncPrintColor for GuildId {
    async fn color(&self, http: &Arc<Http>) -> String {
        match self.to_partial_guild(http).await {
            Ok(guild) => paint(Color::Guild, &guild.name),
            Err(_) => paint(Color::Guild, "<unknown-guild>"),
        }
    }
}

/// Messages and clicks outside a guild come from direct messages
#[serenity::async_trait]
impl AsyncPrintColor for Option<GuildId> {
    async fn color(&self, http: &Arc<Http>) -> String {
        match self {
            Some(guild_id) => guild_id.color(http).await,
            None => paint(Color::Guild, "<direct-message>"),
        }
    }
}
