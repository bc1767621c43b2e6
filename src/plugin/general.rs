use crate::{event::*, helper::*, plugin::*};
use anyhow::Result;
use rand::Rng;
use serenity::all::{
    ChannelType, CreateEmbed, CreateEmbedFooter, CreateMessage, EditMessage, Message,
};
use std::time::Instant;

/// Small everyday commands: ping, roll, avatar and serverinfo.
pub struct General;

#[serenity::async_trait]
impl Plugin for General {
    fn name(&self) -> &'static str {
        "general"
    }

    async fn usage(&self, ctx: &Context) -> Option<String> {
        let p = &ctx.cfg.read().await.general.command_prefix;
        Some(
            [
                format!("{p}ping - check the bot's latency"),
                format!("{p}roll d<number> - roll a die"),
                format!("{p}avatar [@user] - show someone's avatar"),
                format!("{p}serverinfo - show information about this server"),
            ]
            .join("\n"),
        )
    }

    async fn handle(&self, ctx: &Context, event: &Event) -> Result<EventHandled> {
        if let Some((msg, _)) = event.is_bot_cmd(ctx, "ping").await {
            ping(ctx, msg).await?;
        } else if let Some((msg, args)) = event.is_bot_cmd(ctx, "roll").await {
            roll(ctx, msg, args.first().copied()).await?;
        } else if let Some((msg, args)) = event.is_bot_cmd(ctx, "avatar").await {
            avatar(ctx, msg, args.first().copied()).await?;
        } else if let Some((msg, _)) = event.is_bot_cmd(ctx, "serverinfo").await {
            serverinfo(ctx, msg).await?;
        } else {
            return Ok(EventHandled::No);
        }
        Ok(EventHandled::Yes)
    }
}

async fn ping(ctx: &Context<'_>, msg: &Message) -> Result<()> {
    let sent_at = Instant::now();
    let mut reply = msg.channel_id.say(ctx.http, "🏓 Pong!").await?;
    let latency = sent_at.elapsed().as_millis();
    reply
        .edit(
            ctx.cache_http,
            EditMessage::new().content(format!("🏓 Pong! Latency: `{}ms`", latency)),
        )
        .await?;
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Die {
    Sides(u64),
    Zero,
    Malformed,
}

/// `d6`, `d20`, ...
fn parse_die(arg: &str) -> Die {
    let Some(digits) = arg.strip_prefix('d') else {
        return Die::Malformed;
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Die::Malformed;
    }
    match digits.parse::<u64>() {
        Ok(0) => Die::Zero,
        Ok(sides) => Die::Sides(sides),
        Err(_) => Die::Malformed,
    }
}

async fn roll(ctx: &Context<'_>, msg: &Message, arg: Option<&str>) -> Result<()> {
    let reply = match parse_die(arg.unwrap_or_default()) {
        Die::Sides(sides) => {
            let result = rand::rng().random_range(1..=sides);
            format!("🎲 <@{}> You rolled **{}**!", msg.author.id, result)
        }
        Die::Zero => "❌ Please use a number greater than 0!".to_owned(),
        Die::Malformed => {
            let prefix = &ctx.cfg.read().await.general.command_prefix;
            format!("❌ Invalid format! Use `{}roll d<number>`", prefix)
        }
    };

    msg.channel_id.say(ctx.http, reply).await?;
    Ok(())
}

async fn avatar(ctx: &Context<'_>, msg: &Message, arg: Option<&str>) -> Result<()> {
    let user_id = arg.and_then(user_arg).unwrap_or(msg.author.id);

    let (name, url) = match msg.guild_id {
        Some(guild_id) => match guild_id.member(ctx.cache_http, user_id).await {
            Ok(member) => (member.display_name().to_owned(), member.face()),
            Err(_) => {
                let user = user_id.to_user(ctx.cache_http).await?;
                (user.display_name().to_owned(), user.face())
            }
        },
        None => {
            let user = user_id.to_user(ctx.cache_http).await?;
            (user.display_name().to_owned(), user.face())
        }
    };
    let requester = msg.author.nick_in_guild(ctx, msg.guild_id).await;

    let embed = CreateEmbed::new()
        .title(format!("🖼️ Avatar for {}", name))
        .colour(palette::BLURPLE)
        .image(url)
        .footer(CreateEmbedFooter::new(format!("Requested by {}", requester)));
    msg.channel_id
        .send_message(ctx.cache_http, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

async fn serverinfo(ctx: &Context<'_>, msg: &Message) -> Result<()> {
    // Cache references can't be held across an await
    let embed = {
        let Some(guild) = msg.guild(ctx.cache) else {
            return Ok(());
        };

        let count = |kind: ChannelType| guild.channels.values().filter(|c| c.kind == kind).count();
        let created = chrono::DateTime::from_timestamp(guild.id.created_at().unix_timestamp(), 0)
            .map(|at| at.format("%B %d, %Y").to_string())
            .unwrap_or_default();

        let mut embed = CreateEmbed::new()
            .title(format!("📌 Server Info - {}", guild.name))
            .colour(palette::GREEN)
            .field("Owner", format!("<@{}>", guild.owner_id), false)
            .field("Created On", created, false)
            .field("Members", guild.member_count.to_string(), false)
            .field("Roles", guild.roles.len().to_string(), false)
            .field("Text Channels", count(ChannelType::Text).to_string(), true)
            .field("Voice Channels", count(ChannelType::Voice).to_string(), true);
        if let Some(icon) = guild.icon_url() {
            embed = embed.thumbnail(icon);
        }
        embed
    };

    msg.channel_id
        .send_message(ctx.cache_http, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dice_notation() {
        assert_eq!(parse_die("d20"), Die::Sides(20));
        assert_eq!(parse_die("d1"), Die::Sides(1));
        assert_eq!(parse_die("d0"), Die::Zero);
        assert_eq!(parse_die("d"), Die::Malformed);
        assert_eq!(parse_die("20"), Die::Malformed);
        assert_eq!(parse_die("d+5"), Die::Malformed);
        assert_eq!(parse_die("d6x"), Die::Malformed);
        assert_eq!(parse_die(""), Die::Malformed);
    }
}
