//! Miscellaneous convenience methods

use crate::context::Context;
use anyhow::Result;
use regex::Regex;
use serenity::all::{ChannelId, GuildId, Permissions, RoleId, UserId};
use std::{
    collections::HashMap,
    sync::LazyLock,
    time::Duration,
};

#[serenity::async_trait]
pub trait UserIdHelper {
    async fn nick_in_guild(&self, ctx: &Context, guild_id: Option<GuildId>) -> String;
}

#[serenity::async_trait]
impl UserIdHelper for serenity::all::UserId {
    async fn nick_in_guild(&self, ctx: &Context, guild_id: Option<GuildId>) -> String {
        let user = match self.to_user(ctx.cache_http).await {
            Ok(user) => user,
            Err(_) => return format!("<unknown-user-{}>", *self),
        };

        user.nick_in_guild(ctx, guild_id).await
    }
}

#[serenity::async_trait]
pub trait UserHelper {
    async fn nick_in_guild(&self, ctx: &Context, guild_id: Option<GuildId>) -> String;
}

#[serenity::async_trait]
impl UserHelper for serenity::all::User {
    async fn nick_in_guild(&self, ctx: &Context, guild_id: Option<GuildId>) -> String {
        let nick_in_guild = match guild_id {
            Some(guild_id) => self.nick_in(ctx.cache_http, guild_id).await,
            None => None,
        };

        // May not be in a guild, e.g. DM.  Fall back to global username.
        match nick_in_guild {
            Some(nick_in_guild) => nick_in_guild,
            None => self.name.clone(),
        }
    }
}

#[serenity::async_trait]
pub trait MessageHelper {
    async fn human_format_content(&self, ctx: &Context) -> Result<String>;
    async fn is_from_owner(&self, ctx: &Context) -> bool;
    /// Whether the author holds every permission in `required` in this guild.  Always false
    /// outside a guild.
    fn author_has(&self, ctx: &Context, required: Permissions) -> bool;
}

#[serenity::async_trait]
impl MessageHelper for serenity::all::Message {
    /// Convert discord-formatted message content, which may contain non-user-friendly markup, to a
    /// human-friendly format.
    ///
    /// Serenity provides a message.content_safe() method which uses global discord names rather
    /// than our preferred per-server names.  Thus, we're reimplementing the logic here with the
    /// preferred name.
    async fn human_format_content(&self, ctx: &Context) -> Result<String> {
        let mut content = self.content.clone();

        // Create a mapping from mention strings to their names
        let mut mention_map: HashMap<String, String> = HashMap::new();

        // Map user mentions (e.g. `<@!1234567890>`)
        for user in &self.mentions {
            let user_id = user.id;
            let mention_with_nickname = format!("<@!{}>", user_id);
            let mention_without_nickname = format!("<@{}>", user_id);

            let name = user.id.nick_in_guild(ctx, self.guild_id).await;

            mention_map.insert(mention_with_nickname, format!("@{}", name));
            mention_map.insert(mention_without_nickname, format!("@{}", name));
        }

        if let Some(guild) = self.guild(ctx.cache) {
            // Map role mentions (e.g. `<@&1234567890>`)
            for role_id in &self.mention_roles {
                let mention = format!("<@&{}>", role_id);

                match guild.roles.get(role_id) {
                    Some(role) => mention_map.insert(mention, format!("@{}", role.name)),
                    None => mention_map.insert(mention, "@UnknownRole".to_string()),
                };
            }

            // Map channel mentions (e.g. `<#1234567890>`).  Discord only fills in
            // `mention_channels` for cross-posts, so scan the content instead.
            for word in self.content.split_ascii_whitespace() {
                let Some(channel_id) = channel_arg(word) else {
                    continue;
                };
                let name = match guild.channels.get(&channel_id) {
                    Some(channel) => format!("#{}", channel.name),
                    None => "#UnknownChannel".to_string(),
                };
                mention_map.insert(word.to_owned(), name);
            }
        }

        // Replace all mentions with their human-facing names
        for (mention, name) in mention_map {
            content = content.replace(&mention, &name);
        }

        Ok(content)
    }

    async fn is_from_owner(&self, ctx: &Context) -> bool {
        let owners = &ctx.cfg.read().await.general.bot_owners;
        let author_global_name = &self.author.name;

        owners.contains(author_global_name)
    }

    fn author_has(&self, ctx: &Context, required: Permissions) -> bool {
        if self.guild_id.is_none() {
            return false;
        }
        self.author_permissions(ctx.cache)
            .is_some_and(|held| held.administrator() || held.contains(required))
    }
}

/// Embed colours used across the bot
pub mod palette {
    use serenity::all::Colour;

    pub const GREEN: Colour = Colour::new(0x2ecc71);
    pub const BLUE: Colour = Colour::new(0x3498db);
    pub const BLURPLE: Colour = Colour::new(0x5865f2);
    pub const PURPLE: Colour = Colour::new(0x9b59b6);
    pub const GOLD: Colour = Colour::new(0xf1c40f);
    pub const ORANGE: Colour = Colour::new(0xe67e22);
    pub const RED: Colour = Colour::new(0xe74c3c);
    pub const TEAL: Colour = Colour::new(0x1abc9c);
    pub const PINK: Colour = Colour::new(0xeb459f);
    pub const DARK_GOLD: Colour = Colour::new(0xc27c0e);
    pub const DARK_BLUE: Colour = Colour::new(0x206694);
    pub const DARK_TEAL: Colour = Colour::new(0x11806a);
}

/// A user given either as a mention (`<@123>`, `<@!123>`) or a bare id
pub fn user_arg(arg: &str) -> Option<UserId> {
    serenity::utils::parse_user_mention(arg).or_else(|| snowflake(arg).map(UserId::new))
}

/// A channel given either as a mention (`<#123>`) or a bare id
pub fn channel_arg(arg: &str) -> Option<ChannelId> {
    serenity::utils::parse_channel_mention(arg).or_else(|| snowflake(arg).map(ChannelId::new))
}

/// A role given either as a mention (`<@&123>`) or a bare id
pub fn role_arg(arg: &str) -> Option<RoleId> {
    serenity::utils::parse_role_mention(arg).or_else(|| snowflake(arg).map(RoleId::new))
}

fn snowflake(arg: &str) -> Option<u64> {
    arg.parse::<u64>().ok().filter(|&id| id != 0)
}

/// Everything after the first `skip` words of `content`, with its original spacing and line
/// breaks intact.
pub fn command_tail(content: &str, skip: usize) -> &str {
    let mut rest = content.trim_start();
    for _ in 0..skip {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = rest[end..].trim_start();
    }
    rest
}

/// Parse a duration such as `30m`, `1h30m` or `2mo`.  Units are m(inutes), h(ours), d(ays),
/// mo(nths of 30 days) and y(ears of 365 days), case-insensitive.  Returns None for anything
/// else, including a total of zero.
pub fn parse_duration(text: &str) -> Option<Duration> {
    static WHOLE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)^(?:\d+(?:mo|m|h|d|y))+$").expect("valid regex"));
    static PART: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)(\d+)(mo|m|h|d|y)").expect("valid regex"));

    if !WHOLE.is_match(text) {
        return None;
    }

    let mut total: u64 = 0;
    for part in PART.captures_iter(text) {
        let value: u64 = part[1].parse().ok()?;
        let unit: u64 = match part[2].to_ascii_lowercase().as_str() {
            "m" => 60,
            "h" => 60 * 60,
            "d" => 24 * 60 * 60,
            "mo" => 30 * 24 * 60 * 60,
            _ => 365 * 24 * 60 * 60,
        };
        total = total.checked_add(value.checked_mul(unit)?)?;
    }

    (total > 0).then(|| Duration::from_secs(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentions_and_bare_ids_parse() {
        assert_eq!(user_arg("<@42>"), Some(UserId::new(42)));
        assert_eq!(user_arg("<@!42>"), Some(UserId::new(42)));
        assert_eq!(user_arg("42"), Some(UserId::new(42)));
        assert_eq!(user_arg("0"), None);
        assert_eq!(user_arg("bob"), None);
        assert_eq!(channel_arg("<#7>"), Some(ChannelId::new(7)));
        assert_eq!(role_arg("<@&9>"), Some(RoleId::new(9)));
        assert_eq!(role_arg("<@9>"), None);
    }

    #[test]
    fn durations_add_up() {
        assert_eq!(parse_duration("30m"), Some(Duration::from_secs(1800)));
        assert_eq!(parse_duration("1h30m"), Some(Duration::from_secs(5400)));
        assert_eq!(parse_duration("2D"), Some(Duration::from_secs(172_800)));
        assert_eq!(parse_duration("1mo"), Some(Duration::from_secs(2_592_000)));
        assert_eq!(parse_duration("1y1m"), Some(Duration::from_secs(31_536_060)));
    }

    #[test]
    fn bad_durations_are_rejected() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("0m"), None);
        assert_eq!(parse_duration("10"), None);
        assert_eq!(parse_duration("10s"), None);
        assert_eq!(parse_duration("1h 30m"), None);
        assert_eq!(parse_duration("99999999999999999999y"), None);
    }

    #[test]
    fn command_tail_keeps_line_breaks() {
        let content = ".say  title: Hi\ndescription: there";
        assert_eq!(command_tail(content, 1), "title: Hi\ndescription: there");
        assert_eq!(command_tail(".kick <@1> being rude", 2), "being rude");
        assert_eq!(command_tail(".kick <@1>", 2), "");
        assert_eq!(command_tail(".kick", 3), "");
    }
}
