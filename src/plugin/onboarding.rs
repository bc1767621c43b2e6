use crate::{
    event::*,
    helper::*,
    log_error,
    logging::*,
    persistent_state::{ChannelConfig, ChannelKind},
    plugin::*,
};
use anyhow::Result;
use serenity::all::{
    ChannelId, ChannelType, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, CreateMessage,
    Guild, GuildId, Member, User,
};
use std::time::Duration;

/// Greets members as they arrive and leave, and introduces the bot to servers that add it.
pub struct Onboarding;

#[serenity::async_trait]
impl Plugin for Onboarding {
    fn name(&self) -> &'static str {
        "onboarding"
    }

    async fn usage(&self, _ctx: &Context) -> Option<String> {
        None
    }

    async fn handle(&self, ctx: &Context, event: &Event) -> Result<EventHandled> {
        match event {
            Event::MemberAdd(member) => member_joined(ctx, member).await?,
            Event::MemberRemove { guild_id, user } => member_left(ctx, *guild_id, user).await?,
            Event::GuildCreate {
                guild,
                is_new: Some(true),
            } => joined_guild(ctx, guild).await?,
            _ => return Ok(EventHandled::No),
        }
        Ok(EventHandled::Yes)
    }
}

/// Name and icon of a guild, from the cache when possible
async fn guild_banner(ctx: &Context<'_>, guild_id: GuildId) -> (String, Option<String>) {
    let cached = guild_id
        .to_guild_cached(ctx.cache)
        .map(|guild| (guild.name.clone(), guild.icon_url()));
    if let Some(banner) = cached {
        return banner;
    }
    match guild_id.to_partial_guild(ctx.cache_http).await {
        Ok(guild) => (guild.name.clone(), guild.icon_url()),
        Err(_) => ("this server".to_owned(), None),
    }
}

/// Body of the welcome message.  Unset channels get generic directions.
pub fn welcome_text(guild_name: &str, channels: &ChannelConfig, unix_ts: i64) -> String {
    let direct = |kind: ChannelKind, linked: &str, generic: &str| match channels.get(kind) {
        Some(channel_id) => format!("❗ {} <#{}>", linked, channel_id),
        None => format!("❗ {}", generic),
    };

    [
        "We're excited to see you here!".to_owned(),
        format!("`Welcome to {}`", guild_name),
        direct(
            ChannelKind::Rules,
            "Read the rules in",
            "Read the rules in the rules channel.",
        ),
        direct(
            ChannelKind::Role,
            "Get yourself a role on",
            "Get yourself a role in the roles channel.",
        ),
        direct(
            ChannelKind::Introduction,
            "Introduce yourself in",
            "Introduce yourself in the introduction channel.",
        ),
        "**Start having fun!** 🎉".to_owned(),
        format!(
            "Enjoy your stay! If you have any questions, feel free to ask. | Today at <t:{}:t>",
            unix_ts
        ),
    ]
    .join("\n\n")
}

/// The embed posted in the welcome channel, also used by `welcomepreview`.
pub async fn welcome_embed(
    ctx: &Context<'_>,
    guild_id: GuildId,
    user: &User,
    face: String,
) -> CreateEmbed {
    let (guild_name, guild_icon) = guild_banner(ctx, guild_id).await;
    let channels = ctx
        .pstate
        .read()
        .await
        .guild(guild_id)
        .map(|g| g.channels.clone())
        .unwrap_or_default();

    let mut author = CreateEmbedAuthor::new(&guild_name);
    if let Some(icon) = guild_icon {
        author = author.icon_url(icon);
    }

    CreateEmbed::new()
        .title(format!("👋 Welcome, {}!", user.name))
        .description(welcome_text(
            &guild_name,
            &channels,
            chrono::Utc::now().timestamp(),
        ))
        .colour(palette::GREEN)
        .author(author)
        .thumbnail(face)
}

async fn member_joined(ctx: &Context<'_>, member: &Member) -> Result<()> {
    let guild_id = member.guild_id;
    let (autoroles, welcome, rules) = {
        let pstate = ctx.pstate.read().await;
        (
            pstate
                .guild(guild_id)
                .map(|g| g.autoroles.clone())
                .unwrap_or_default(),
            pstate.channel(guild_id, ChannelKind::Welcome),
            pstate.channel(guild_id, ChannelKind::Rules),
        )
    };

    if !autoroles.is_empty() {
        if let Err(e) = member.add_roles(ctx.http, &autoroles).await {
            log_error!(
                "Could not assign autoroles to {}: {}",
                member.user.color(),
                e
            );
        }
    }

    if let Some(channel_id) = welcome {
        let embed = welcome_embed(ctx, guild_id, &member.user, member.face()).await;
        channel_id
            .send_message(ctx.cache_http, CreateMessage::new().embed(embed))
            .await?;
    }

    if let Some(channel_id) = rules {
        let ping = channel_id
            .say(
                ctx.http,
                format!("📜 <@{}>, please read the rules!", member.user.id),
            )
            .await?;
        tokio::time::sleep(Duration::from_secs(1)).await;
        ping.delete(ctx.cache_http).await?;
    }

    Ok(())
}

async fn member_left(ctx: &Context<'_>, guild_id: GuildId, user: &User) -> Result<()> {
    let Some(channel_id) = ctx
        .pstate
        .read()
        .await
        .channel(guild_id, ChannelKind::Goodbye)
    else {
        return Ok(());
    };
    let (guild_name, _) = guild_banner(ctx, guild_id).await;

    let embed = CreateEmbed::new()
        .title(format!("👋 Farewell, {}", user.name))
        .description(format!(
            "<@{}> has left **{}**.\n\nThanks for being part of our community.\nWish you the best wherever you go! ✨",
            user.id, guild_name
        ))
        .colour(palette::RED)
        .thumbnail(user.face());
    channel_id
        .send_message(ctx.cache_http, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

/// The system channel, else the topmost text channel
fn greeting_channel(guild: &Guild) -> Option<ChannelId> {
    guild.system_channel_id.or_else(|| {
        guild
            .channels
            .values()
            .filter(|c| c.kind == ChannelType::Text)
            .min_by_key(|c| (c.position, c.id))
            .map(|c| c.id)
    })
}

async fn joined_guild(ctx: &Context<'_>, guild: &Guild) -> Result<()> {
    let Some(channel_id) = greeting_channel(guild) else {
        return Ok(());
    };
    let prefix = ctx.cfg.read().await.general.command_prefix.clone();
    let face = ctx.cache.current_user().face();

    let embed = CreateEmbed::new()
        .description(format!(
            "**Thanks for adding me to your server! 🥰**\n\n\
             Yuuki is a multi-purpose bot that can assist you in moderation, in managing your server, and more!\n\n\
             Want to see all of my commands? Just use `{}help`!",
            prefix
        ))
        .colour(palette::PINK)
        .thumbnail(&face)
        .footer(CreateEmbedFooter::new("Thanks for choosing Yuuki!").icon_url(&face));

    if let Err(e) = channel_id
        .send_message(ctx.cache_http, CreateMessage::new().embed(embed))
        .await
    {
        log_error!("Could not greet \"{}\": {}", guild.color(), e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_links_configured_channels() {
        let mut channels = ChannelConfig::default();
        channels.toggle(ChannelKind::Rules, ChannelId::new(5));

        let text = welcome_text("Tavern", &channels, 1_700_000_000);
        assert!(text.starts_with("We're excited to see you here!\n\n`Welcome to Tavern`"));
        assert!(text.contains("❗ Read the rules in <#5>"));
        assert!(text.contains("❗ Get yourself a role in the roles channel."));
        assert!(text.contains("❗ Introduce yourself in the introduction channel."));
        assert!(text.ends_with("Today at <t:1700000000:t>"));
    }
}
