//! Server moderation: channel configuration, punishments and their infraction records, autoroles,
//! purge and embed posting.

use crate::{
    event::*,
    helper::*,
    log_error,
    logging::*,
    persistent_state::{ChannelKind, Infraction, InfractionAction, Toggled},
    plugin::{onboarding::welcome_embed, *},
};
use anyhow::Result;
use chrono::Utc;
use serenity::all::{
    ButtonStyle, ComponentInteraction, CreateActionRow, CreateButton, CreateEmbed,
    CreateEmbedFooter, CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage,
    EditMember, GetMessages, GuildId, Message, MessageId, Permissions, Timestamp, UserId,
};
use std::time::Duration;

/// Custom id namespace of the infraction pager
const PAGER: &str = "infractions";
const PAGE_SIZE: usize = 5;
/// Longest timeout Discord accepts
const MAX_MUTE: Duration = Duration::from_secs(28 * 24 * 60 * 60);
const NO_REASON: &str = "No reason provided";

pub struct Moderation;

#[serenity::async_trait]
impl Plugin for Moderation {
    fn name(&self) -> &'static str {
        "moderation"
    }

    async fn usage(&self, ctx: &Context) -> Option<String> {
        let p = &ctx.cfg.read().await.general.command_prefix;
        Some(
            [
                format!("{p}setchannel <type> <#channel> - assign or unassign a channel; types: welcome, rules, heartbeat, role, introduction, log, list, goodbye"),
                format!("{p}warn <@user> [reason]"),
                format!("{p}kick <@user> [reason]"),
                format!("{p}ban <@user> [reason]"),
                format!("{p}mute <@user> <duration> [reason] - e.g. 30m, 1h30m, 2d"),
                format!("{p}unmute <@user>"),
                format!("{p}infractions <@user> - list a member's infractions"),
                format!("{p}clearinfractions <@user>"),
                format!("{p}autorole <add|remove|list> [@role]"),
                format!("{p}purge [@user] <amount>"),
                format!("{p}say title: ... description: ... footer: ..."),
                format!("{p}welcomepreview - show the welcome message"),
            ]
            .join("\n"),
        )
    }

    async fn handle(&self, ctx: &Context, event: &Event) -> Result<EventHandled> {
        if let Some(interaction) = event.is_component(PAGER) {
            turn_page(ctx, interaction).await?;
            return Ok(EventHandled::Yes);
        }

        let Event::Message(msg) = event else {
            return Ok(EventHandled::No);
        };
        let Some(guild_id) = msg.guild_id else {
            return Ok(EventHandled::No);
        };

        if let Some((_, args)) = event.is_bot_cmd(ctx, "setchannel").await {
            set_channel(ctx, msg, guild_id, &args).await?;
        } else if let Some((_, args)) = event.is_bot_cmd(ctx, "warn").await {
            punish(ctx, msg, guild_id, InfractionAction::Warned, &args).await?;
        } else if let Some((_, args)) = event.is_bot_cmd(ctx, "kick").await {
            punish(ctx, msg, guild_id, InfractionAction::Kicked, &args).await?;
        } else if let Some((_, args)) = event.is_bot_cmd(ctx, "ban").await {
            punish(ctx, msg, guild_id, InfractionAction::Banned, &args).await?;
        } else if let Some((_, args)) = event.is_bot_cmd(ctx, "mute").await {
            punish(ctx, msg, guild_id, InfractionAction::Muted, &args).await?;
        } else if let Some((_, args)) = event.is_bot_cmd(ctx, "unmute").await {
            unmute(ctx, msg, guild_id, &args).await?;
        } else if let Some((_, args)) = event.is_bot_cmd(ctx, "infractions").await {
            infractions(ctx, msg, guild_id, &args).await?;
        } else if let Some((_, args)) = event.is_bot_cmd(ctx, "clearinfractions").await {
            clear_infractions(ctx, msg, guild_id, &args).await?;
        } else if let Some((_, args)) = event.is_bot_cmd(ctx, "autorole").await {
            autorole(ctx, msg, guild_id, &args).await?;
        } else if let Some((_, args)) = event.is_bot_cmd(ctx, "purge").await {
            purge(ctx, msg, guild_id, &args).await?;
        } else if event.is_bot_cmd(ctx, "say").await.is_some() {
            say(ctx, msg).await?;
        } else if event.is_bot_cmd(ctx, "welcomepreview").await.is_some() {
            welcome_preview(ctx, msg, guild_id).await?;
        } else {
            return Ok(EventHandled::No);
        }
        Ok(EventHandled::Yes)
    }
}

/// Reply with a permission rejection unless the author holds `required`.
async fn require(ctx: &Context<'_>, msg: &Message, required: Permissions, label: &str) -> Result<bool> {
    if msg.author_has(ctx, required) {
        return Ok(true);
    }
    msg.reply(
        ctx.cache_http,
        format!("❌ You need the `{}` permission to use this command.", label),
    )
    .await?;
    Ok(false)
}

async fn usage(ctx: &Context<'_>, msg: &Message, synopsis: &str) -> Result<()> {
    let prefix = ctx.cfg.read().await.general.command_prefix.clone();
    msg.reply(ctx.cache_http, format!("❌ Usage: `{}{}`", prefix, synopsis))
        .await?;
    Ok(())
}

async fn set_channel(ctx: &Context<'_>, msg: &Message, guild_id: GuildId, args: &[&str]) -> Result<()> {
    if !require(ctx, msg, Permissions::MANAGE_GUILD, "Manage Server").await? {
        return Ok(());
    }

    let kind = args.first().and_then(|k| k.parse::<ChannelKind>().ok());
    let channel_id = args.get(1).and_then(|c| channel_arg(c));
    let (Some(kind), Some(channel_id)) = (kind, channel_id) else {
        return usage(ctx, msg, "setchannel <welcome|rules|heartbeat|role|introduction|log|list|goodbye> <#channel>").await;
    };

    let toggled = ctx
        .pstate
        .write()
        .await
        .update(|p| p.guild_mut(guild_id).channels.toggle(kind, channel_id))
        .await?;

    let reply = match toggled {
        Toggled::Set => format!("✅ {} channel set to <#{}>!", kind, channel_id),
        Toggled::Cleared => format!("✅ {} has been removed from <#{}>.", kind, channel_id),
    };
    msg.channel_id.say(ctx.http, reply).await?;
    Ok(())
}

/// Permission needed for each punishment, and how it reads in a rejection
fn punishment_permission(action: InfractionAction) -> (Permissions, &'static str) {
    match action {
        InfractionAction::Warned | InfractionAction::Kicked => {
            (Permissions::KICK_MEMBERS, "Kick Members")
        }
        InfractionAction::Banned => (Permissions::BAN_MEMBERS, "Ban Members"),
        InfractionAction::Muted => (Permissions::MODERATE_MEMBERS, "Timeout Members"),
    }
}

async fn punish(
    ctx: &Context<'_>,
    msg: &Message,
    guild_id: GuildId,
    action: InfractionAction,
    args: &[&str],
) -> Result<()> {
    let (permission, label) = punishment_permission(action);
    if !require(ctx, msg, permission, label).await? {
        return Ok(());
    }

    let synopsis = match action {
        InfractionAction::Warned => "warn <@user> [reason]",
        InfractionAction::Kicked => "kick <@user> [reason]",
        InfractionAction::Banned => "ban <@user> [reason]",
        InfractionAction::Muted => "mute <@user> <duration> [reason]",
    };
    let Some(user_id) = args.first().and_then(|u| user_arg(u)) else {
        return usage(ctx, msg, synopsis).await;
    };

    // Words before the free-form reason: command, user and, for mutes, the duration
    let (duration, skip) = match action {
        InfractionAction::Muted => {
            let Some(duration) = args.get(1).and_then(|d| parse_duration(d)) else {
                return usage(ctx, msg, synopsis).await;
            };
            if duration > MAX_MUTE {
                msg.reply(ctx.cache_http, "❌ A mute can last at most 28 days.")
                    .await?;
                return Ok(());
            }
            (Some((args[1].to_owned(), duration)), 3)
        }
        _ => (None, 2),
    };
    let reason = match command_tail(&msg.content, skip) {
        "" => NO_REASON,
        reason => reason,
    };

    let Ok(user) = user_id.to_user(ctx.cache_http).await else {
        msg.reply(ctx.cache_http, "❌ User not found.").await?;
        return Ok(());
    };

    let applied = match action {
        InfractionAction::Warned => Ok(()),
        InfractionAction::Kicked => guild_id.kick_with_reason(ctx.http, user_id, reason).await,
        InfractionAction::Banned => {
            guild_id
                .ban_with_reason(ctx.http, user_id, 0, reason)
                .await
        }
        InfractionAction::Muted => {
            let secs = duration.as_ref().map(|(_, d)| d.as_secs()).unwrap_or(0);
            let until = Timestamp::from_unix_timestamp(Utc::now().timestamp() + secs as i64)?;
            guild_id
                .edit_member(
                    ctx.cache_http,
                    user_id,
                    EditMember::new()
                        .disable_communication_until_datetime(until)
                        .audit_log_reason(reason),
                )
                .await
                .map(|_| ())
        }
    };
    if let Err(e) = applied {
        msg.reply(ctx.cache_http, format!("❌ Could not do that: {}", e))
            .await?;
        return Ok(());
    }

    let announcement = match action {
        InfractionAction::Warned => format!("⚠️ <@{}> has been warned. Reason: {}", user_id, reason),
        InfractionAction::Kicked => format!("👢 <@{}> has been kicked. Reason: {}", user_id, reason),
        InfractionAction::Banned => format!("⛔ <@{}> has been banned. Reason: {}", user_id, reason),
        InfractionAction::Muted => format!(
            "🔇 <@{}> has been muted for {}. Reason: {}",
            user_id,
            duration.as_ref().map(|(text, _)| text.as_str()).unwrap_or_default(),
            reason
        ),
    };
    msg.channel_id.say(ctx.http, announcement).await?;

    let infraction = Infraction {
        user_id,
        moderator_id: msg.author.id,
        action,
        reason: reason.to_owned(),
        timestamp: Utc::now(),
        duration: duration.map(|(text, _)| text),
    };
    record(ctx, guild_id, &user.name, &msg.author.name, infraction).await
}

/// Plain line for the moderation log channel
fn log_line(action: InfractionAction, user: &str, moderator: &str, reason: &str) -> String {
    format!("{} | {} | by {} | Reason: {}", action, user, moderator, reason)
}

/// Store the infraction and mirror it to the log and list channels.
async fn record(
    ctx: &Context<'_>,
    guild_id: GuildId,
    user_name: &str,
    moderator_name: &str,
    infraction: Infraction,
) -> Result<()> {
    let (log, list) = {
        let mut pstate = ctx.pstate.write().await;
        pstate
            .update(|p| p.guild_mut(guild_id).infractions.push(infraction.clone()))
            .await?;
        (
            pstate.channel(guild_id, ChannelKind::Log),
            pstate.channel(guild_id, ChannelKind::List),
        )
    };

    if let Some(channel_id) = log {
        let line = log_line(infraction.action, user_name, moderator_name, &infraction.reason);
        if let Err(e) = channel_id.say(ctx.http, line).await {
            log_error!("Could not write to \"{}\": {}", channel_id.color(ctx.http).await, e);
        }
    }

    if let Some(channel_id) = list {
        let colour = match infraction.action {
            InfractionAction::Banned | InfractionAction::Muted => palette::RED,
            _ => palette::ORANGE,
        };
        let mut when = format!("<t:{}:F>", infraction.timestamp.timestamp());
        if let Some(duration) = &infraction.duration {
            when.push_str(&format!(" | Expires: {}", duration));
        }
        let embed = CreateEmbed::new()
            .title(format!("Infraction: {} User", infraction.action))
            .colour(colour)
            .field("User", format!("{} | <@{}>", user_name, infraction.user_id), false)
            .field("Mod", format!("{} | <@{}>", moderator_name, infraction.moderator_id), false)
            .field("Time/Duration", when, false)
            .field("Reason", &infraction.reason, false);
        if let Err(e) = channel_id
            .send_message(ctx.cache_http, CreateMessage::new().embed(embed))
            .await
        {
            log_error!("Could not write to \"{}\": {}", channel_id.color(ctx.http).await, e);
        }
    }

    Ok(())
}

async fn unmute(ctx: &Context<'_>, msg: &Message, guild_id: GuildId, args: &[&str]) -> Result<()> {
    if !require(ctx, msg, Permissions::MODERATE_MEMBERS, "Timeout Members").await? {
        return Ok(());
    }
    let Some(user_id) = args.first().and_then(|u| user_arg(u)) else {
        return usage(ctx, msg, "unmute <@user>").await;
    };

    let Ok(member) = guild_id.member(ctx.cache_http, user_id).await else {
        msg.reply(ctx.cache_http, "❌ Member not found.").await?;
        return Ok(());
    };
    let muted = member
        .communication_disabled_until
        .is_some_and(|until| until.unix_timestamp() > Utc::now().timestamp());
    if !muted {
        msg.channel_id
            .say(ctx.http, format!("<@{}> is not muted.", user_id))
            .await?;
        return Ok(());
    }

    guild_id
        .edit_member(ctx.cache_http, user_id, EditMember::new().enable_communication())
        .await?;
    msg.channel_id
        .say(ctx.http, format!("🔊 <@{}> has been unmuted.", user_id))
        .await?;
    Ok(())
}

/// One page of `items`, clamped to the last page, with the page index used and the page count
fn paginate<T>(items: &[T], page: usize) -> (&[T], usize, usize) {
    let pages = items.len().div_ceil(PAGE_SIZE).max(1);
    let page = page.min(pages - 1);
    let start = page * PAGE_SIZE;
    let end = (start + PAGE_SIZE).min(items.len());
    (&items[start..end], page, pages)
}

/// Infraction page plus its pager buttons.  None when the user has no infractions.
async fn infraction_page(
    ctx: &Context<'_>,
    guild_id: GuildId,
    user_id: UserId,
    page: usize,
) -> Option<(CreateEmbed, CreateActionRow)> {
    let records: Vec<Infraction> = {
        let pstate = ctx.pstate.read().await;
        let guild = pstate.guild(guild_id)?;
        guild.infractions_for(user_id).into_iter().cloned().collect()
    };
    if records.is_empty() {
        return None;
    }

    let name = match user_id.to_user(ctx.cache_http).await {
        Ok(user) => user.name,
        Err(_) => format!("<@{}>", user_id),
    };

    let (shown, page, pages) = paginate(&records, page);
    let mut embed = CreateEmbed::new()
        .title(format!("Infractions for {} (Page {}/{})", name, page + 1, pages))
        .colour(palette::BLURPLE);
    for (i, infraction) in shown.iter().enumerate() {
        embed = embed.field(
            format!("{}. {}", page * PAGE_SIZE + i + 1, infraction.action),
            format!(
                "Reason: {} | Mod: <@{}> | Date: <t:{}:F>",
                infraction.reason,
                infraction.moderator_id,
                infraction.timestamp.timestamp()
            ),
            false,
        );
    }

    let buttons = CreateActionRow::Buttons(vec![
        CreateButton::new(format!("{}:{}:{}", PAGER, user_id, page.saturating_sub(1)))
            .label("⬅️")
            .style(ButtonStyle::Secondary)
            .disabled(page == 0),
        CreateButton::new(format!("{}:{}:{}", PAGER, user_id, page + 1))
            .label("➡️")
            .style(ButtonStyle::Secondary)
            .disabled(page + 1 >= pages),
    ]);
    Some((embed, buttons))
}

async fn infractions(ctx: &Context<'_>, msg: &Message, guild_id: GuildId, args: &[&str]) -> Result<()> {
    if !require(ctx, msg, Permissions::MODERATE_MEMBERS, "Timeout Members").await? {
        return Ok(());
    }
    let Some(user_id) = args.first().and_then(|u| user_arg(u)) else {
        return usage(ctx, msg, "infractions <@user>").await;
    };

    let message = match infraction_page(ctx, guild_id, user_id, 0).await {
        Some((embed, buttons)) => CreateMessage::new().embed(embed).components(vec![buttons]),
        None => CreateMessage::new().content(format!("No infractions found for <@{}>.", user_id)),
    };
    msg.channel_id.send_message(ctx.cache_http, message).await?;
    Ok(())
}

/// `infractions:<user>:<page>`
fn parse_pager(custom_id: &str) -> Option<(UserId, usize)> {
    let mut parts = custom_id.split(':');
    if parts.next() != Some(PAGER) {
        return None;
    }
    let user_id = user_arg(parts.next()?)?;
    let page = parts.next()?.parse().ok()?;
    match parts.next() {
        Some(_) => None,
        None => Some((user_id, page)),
    }
}

async fn turn_page(ctx: &Context<'_>, interaction: &ComponentInteraction) -> Result<()> {
    let allowed = interaction
        .member
        .as_ref()
        .and_then(|m| m.permissions)
        .is_some_and(|p| p.administrator() || p.moderate_members());

    let page = match (allowed, parse_pager(&interaction.data.custom_id), interaction.guild_id) {
        (true, Some((user_id, page)), Some(guild_id)) => {
            infraction_page(ctx, guild_id, user_id, page).await
        }
        _ => None,
    };

    let response = match page {
        Some((embed, buttons)) => CreateInteractionResponse::UpdateMessage(
            CreateInteractionResponseMessage::new()
                .embed(embed)
                .components(vec![buttons]),
        ),
        None if !allowed => CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content("❌ You need the `Timeout Members` permission to do that.")
                .ephemeral(true),
        ),
        None => CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content("These infractions are no longer available.")
                .ephemeral(true),
        ),
    };
    interaction.create_response(ctx.http, response).await?;
    Ok(())
}

async fn clear_infractions(
    ctx: &Context<'_>,
    msg: &Message,
    guild_id: GuildId,
    args: &[&str],
) -> Result<()> {
    if !require(ctx, msg, Permissions::MANAGE_GUILD, "Manage Server").await? {
        return Ok(());
    }
    let Some(user_id) = args.first().and_then(|u| user_arg(u)) else {
        return usage(ctx, msg, "clearinfractions <@user>").await;
    };

    let cleared = ctx
        .pstate
        .write()
        .await
        .update(|p| p.guild_mut(guild_id).clear_infractions(user_id))
        .await?;
    msg.channel_id
        .say(
            ctx.http,
            format!("✅ Cleared {} infraction(s) for <@{}>.", cleared, user_id),
        )
        .await?;
    Ok(())
}

async fn autorole(ctx: &Context<'_>, msg: &Message, guild_id: GuildId, args: &[&str]) -> Result<()> {
    let synopsis = "autorole <add|remove|list> [@role]";
    match args.first().copied() {
        Some("list") => {
            let roles = ctx
                .pstate
                .read()
                .await
                .guild(guild_id)
                .map(|g| g.autoroles.clone())
                .unwrap_or_default();
            let reply = if roles.is_empty() {
                "ℹ️ No autoroles set.".to_owned()
            } else {
                let mentions: Vec<String> = roles.iter().map(|r| format!("<@&{}>", r)).collect();
                format!("🔧 Current autoroles:\n{}", mentions.join("\n"))
            };
            msg.channel_id.say(ctx.http, reply).await?;
        }
        Some(op @ ("add" | "remove")) => {
            if !require(ctx, msg, Permissions::MANAGE_ROLES, "Manage Roles").await? {
                return Ok(());
            }
            let Some(role_id) = args.get(1).and_then(|r| role_arg(r)) else {
                return usage(ctx, msg, synopsis).await;
            };

            let changed = ctx
                .pstate
                .write()
                .await
                .update(|p| {
                    let guild = p.guild_mut(guild_id);
                    match op {
                        "add" => guild.add_autorole(role_id),
                        _ => guild.remove_autorole(role_id),
                    }
                })
                .await?;

            let reply = match (op, changed) {
                ("add", true) => format!("✅ Added <@&{}> to autorole list.", role_id),
                ("add", false) => format!("ℹ️ <@&{}> is already an autorole.", role_id),
                (_, true) => format!("❌ Removed <@&{}> from autorole list.", role_id),
                (_, false) => format!("ℹ️ <@&{}> is not an autorole.", role_id),
            };
            msg.channel_id.say(ctx.http, reply).await?;
        }
        _ => usage(ctx, msg, synopsis).await?,
    }
    Ok(())
}

async fn purge(ctx: &Context<'_>, msg: &Message, guild_id: GuildId, args: &[&str]) -> Result<()> {
    if !require(ctx, msg, Permissions::MANAGE_MESSAGES, "Manage Messages").await? {
        return Ok(());
    }

    let synopsis = "purge [@user] <amount>";
    let (author, amount) = match args {
        [amount] => (None, amount.parse::<u8>().ok()),
        [user, amount] => match user_arg(user) {
            Some(user_id) => (Some(user_id), amount.parse::<u8>().ok()),
            None => return usage(ctx, msg, synopsis).await,
        },
        _ => return usage(ctx, msg, synopsis).await,
    };
    let limit = ctx.cfg.read().await.moderation.purge_limit;
    let amount = match amount {
        Some(n) if n > 0 && n <= limit => n,
        Some(_) | None => {
            msg.reply(
                ctx.cache_http,
                format!("❌ Please provide a number of messages between 1 and {}.", limit),
            )
            .await?;
            return Ok(());
        }
    };

    // Scan the most recent messages before the command, like a manual scroll back
    let recent = msg
        .channel_id
        .messages(ctx.cache_http, GetMessages::new().before(msg.id).limit(amount))
        .await?;
    let mut doomed: Vec<MessageId> = recent
        .iter()
        .filter(|m| author.is_none_or(|a| m.author.id == a))
        .map(|m| m.id)
        .collect();
    let deleted = doomed.len();
    doomed.push(msg.id);

    // Bulk deletion takes at most 100 ids per request
    for batch in doomed.chunks(100) {
        msg.channel_id.delete_messages(ctx.http, batch).await?;
    }

    let confirmation = match author {
        Some(user_id) => format!("✅ Deleted {} messages from <@{}>.", deleted, user_id),
        None => format!("✅ Deleted {} messages.", deleted),
    };
    let notice = msg.channel_id.say(ctx.http, confirmation).await?;
    tokio::time::sleep(Duration::from_secs(5)).await;
    if let Err(e) = notice.delete(ctx.cache_http).await {
        log_error!(
            "Could not remove purge notice in \"{}\": {}",
            guild_id.color(ctx.http).await,
            e
        );
    }
    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
struct SayContent {
    title: String,
    description: String,
    footer: String,
}

/// Split `title:` / `description:` / `footer:` lines into embed parts.  Lines without a key
/// continue the previous part; lines before the first key are dropped.
fn parse_say(text: &str) -> SayContent {
    let mut content = SayContent::default();
    let mut current = None;

    for line in text.lines() {
        let keyed = line
            .split_once(':')
            .and_then(|(key, value)| match key.trim().to_ascii_lowercase().as_str() {
                "title" => Some((0, value)),
                "description" => Some((1, value)),
                "footer" => Some((2, value)),
                _ => None,
            });
        let (part, value) = match (keyed, current) {
            (Some((part, value)), _) => {
                current = Some(part);
                (part, value.trim())
            }
            (None, Some(part)) => (part, line.trim()),
            (None, None) => continue,
        };

        let field = match part {
            0 => &mut content.title,
            1 => &mut content.description,
            _ => &mut content.footer,
        };
        if keyed.is_none() {
            field.push('\n');
        }
        field.push_str(value);
    }

    content.title = content.title.trim().to_owned();
    content.description = content.description.trim().to_owned();
    content.footer = content.footer.trim().to_owned();
    content
}

async fn say(ctx: &Context<'_>, msg: &Message) -> Result<()> {
    if !require(ctx, msg, Permissions::MANAGE_MESSAGES, "Manage Messages").await? {
        return Ok(());
    }

    let content = parse_say(command_tail(&msg.content, 1));
    if content == SayContent::default() {
        return usage(ctx, msg, "say title: ... description: ... footer: ...").await;
    }

    let mut embed = CreateEmbed::new().colour(palette::BLUE);
    if !content.title.is_empty() {
        embed = embed.title(content.title);
    }
    if !content.description.is_empty() {
        embed = embed.description(content.description);
    }
    if !content.footer.is_empty() {
        embed = embed.footer(CreateEmbedFooter::new(content.footer));
    }
    msg.channel_id
        .send_message(ctx.cache_http, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

async fn welcome_preview(ctx: &Context<'_>, msg: &Message, guild_id: GuildId) -> Result<()> {
    if !require(ctx, msg, Permissions::MANAGE_GUILD, "Manage Server").await? {
        return Ok(());
    }

    let face = match guild_id.member(ctx.cache_http, msg.author.id).await {
        Ok(member) => member.face(),
        Err(_) => msg.author.face(),
    };
    let embed = welcome_embed(ctx, guild_id, &msg.author, face).await;
    msg.channel_id
        .send_message(ctx.cache_http, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_clamp_to_the_last() {
        let items: Vec<u32> = (1..=12).collect();
        assert_eq!(paginate(&items, 0), (&items[0..5], 0, 3));
        assert_eq!(paginate(&items, 2), (&items[10..12], 2, 3));
        assert_eq!(paginate(&items, 9), (&items[10..12], 2, 3));

        let empty: Vec<u32> = Vec::new();
        assert_eq!(paginate(&empty, 4), (&empty[..], 0, 1));
    }

    #[test]
    fn pager_ids() {
        assert_eq!(parse_pager("infractions:42:3"), Some((UserId::new(42), 3)));
        assert_eq!(parse_pager("infractions:42"), None);
        assert_eq!(parse_pager("infractions:42:3:1"), None);
        assert_eq!(parse_pager("giveaway:42:3"), None);
        assert_eq!(parse_pager("infractions:x:3"), None);
    }

    #[test]
    fn say_sections() {
        let parsed = parse_say(
            "ignored\nTitle: Server rules\ndescription: Be kind.\nNo spam.\nfooter:  The mods ",
        );
        assert_eq!(
            parsed,
            SayContent {
                title: "Server rules".to_owned(),
                description: "Be kind.\nNo spam.".to_owned(),
                footer: "The mods".to_owned(),
            }
        );
        assert_eq!(parse_say("just text"), SayContent::default());
        assert_eq!(parse_say("description: a: b").description, "a: b");
    }

    #[test]
    fn log_lines() {
        assert_eq!(
            log_line(InfractionAction::Kicked, "mallory", "alice", "spam"),
            "Kicked | mallory | by alice | Reason: spam"
        );
    }

    #[test]
    fn punishments_need_matching_permissions() {
        assert_eq!(
            punishment_permission(InfractionAction::Banned).0,
            Permissions::BAN_MEMBERS
        );
        assert_eq!(
            punishment_permission(InfractionAction::Warned).0,
            Permissions::KICK_MEMBERS
        );
    }
}
