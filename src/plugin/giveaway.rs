use crate::{
    event::*,
    helper::*,
    log_error,
    logging::*,
    plugin::*,
    volatile_state::Entry,
};
use anyhow::Result;
use rand::seq::IteratorRandom;
use serenity::all::{
    ButtonStyle, ChannelId, ComponentInteraction, CreateActionRow, CreateButton, CreateEmbed,
    CreateEmbedFooter, CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage,
    EditMessage, Message, Permissions, UserId,
};
use std::{collections::HashSet, time::Duration};

const JOIN: &str = "giveaway:join";

/// Timed giveaways entered with a button press.
pub struct Giveaway;

#[serenity::async_trait]
impl Plugin for Giveaway {
    fn name(&self) -> &'static str {
        "giveaway"
    }

    async fn usage(&self, ctx: &Context) -> Option<String> {
        let prefix = &ctx.cfg.read().await.general.command_prefix;
        Some(format!(
            "{}giveaway <#channel> <winners> <duration> <prize> - e.g. {}giveaway #events 1 1h Nitro",
            prefix, prefix
        ))
    }

    async fn handle(&self, ctx: &Context, event: &Event) -> Result<EventHandled> {
        if let Some(interaction) = event.is_component("giveaway") {
            if interaction.data.custom_id != JOIN {
                return Ok(EventHandled::No);
            }
            join(ctx, interaction).await?;
            return Ok(EventHandled::Yes);
        }

        let Some((msg, args)) = event.is_bot_cmd(ctx, self.name()).await else {
            return Ok(EventHandled::No);
        };
        start(ctx, msg, &args).await?;
        Ok(EventHandled::Yes)
    }
}

struct Plan<'a> {
    channel_id: ChannelId,
    winners: usize,
    duration: Duration,
    prize: &'a str,
}

/// Why a giveaway command was turned down
#[derive(Debug, PartialEq, Eq)]
enum Invalid {
    Usage,
    Winners,
    TooShort(u64),
}

fn plan<'a>(content: &'a str, args: &[&str], min_seconds: u64) -> Result<Plan<'a>, Invalid> {
    let [channel, winners, duration, _, ..] = args else {
        return Err(Invalid::Usage);
    };
    let channel_id = channel_arg(channel).ok_or(Invalid::Usage)?;
    let winners = match winners.parse::<usize>() {
        Ok(0) | Err(_) => return Err(Invalid::Winners),
        Ok(n) => n,
    };
    let duration = parse_duration(duration).ok_or(Invalid::Usage)?;
    if duration.as_secs() < min_seconds {
        return Err(Invalid::TooShort(min_seconds));
    }

    Ok(Plan {
        channel_id,
        winners,
        duration,
        prize: command_tail(content, 4),
    })
}

/// Pick up to `count` distinct winners
fn draw(entrants: HashSet<UserId>, count: usize) -> Vec<UserId> {
    entrants
        .into_iter()
        .choose_multiple(&mut rand::rng(), count)
}

async fn start(ctx: &Context<'_>, msg: &Message, args: &[&str]) -> Result<()> {
    if !msg.author_has(ctx, Permissions::MANAGE_MESSAGES) {
        msg.reply(
            ctx.cache_http,
            "❌ You need the `Manage Messages` permission to start a giveaway.",
        )
        .await?;
        return Ok(());
    }

    let (prefix, min_seconds) = {
        let cfg = ctx.cfg.read().await;
        (
            cfg.general.command_prefix.clone(),
            cfg.giveaway.min_duration_seconds,
        )
    };
    let plan = match plan(&msg.content, args, min_seconds) {
        Ok(plan) => plan,
        Err(invalid) => {
            let reply = match invalid {
                Invalid::Usage => format!(
                    "❌ Usage: `{}giveaway <#channel> <winners> <duration> <prize>`",
                    prefix
                ),
                Invalid::Winners => "❌ The number of winners must be at least 1.".to_owned(),
                Invalid::TooShort(min) => {
                    format!("❌ A giveaway must last at least {} seconds.", min)
                }
            };
            msg.reply(ctx.cache_http, reply).await?;
            return Ok(());
        }
    };

    let ends_at = chrono::Utc::now().timestamp() + plan.duration.as_secs() as i64;
    let embed = CreateEmbed::new()
        .title("🎉 New Giveaway!")
        .description(format!(
            "**Prize:** {}\n**Winners:** {}\n**Hosted by:** <@{}>\n\nEnds <t:{}:R> (<t:{}:t>)",
            plan.prize, plan.winners, msg.author.id, ends_at, ends_at
        ))
        .colour(palette::GOLD)
        .footer(CreateEmbedFooter::new("Press the button below to enter!"));
    let button = CreateButton::new(JOIN)
        .label("🎉 Join Giveaway")
        .style(ButtonStyle::Success);

    let mut posted = plan
        .channel_id
        .send_message(
            ctx.cache_http,
            CreateMessage::new()
                .embed(embed)
                .components(vec![CreateActionRow::Buttons(vec![button])]),
        )
        .await?;
    ctx.vstate.write().await.giveaways.open(posted.id);

    msg.channel_id
        .say(
            ctx.http,
            format!(
                "✅ Giveaway started in <#{}> for **{}**!",
                plan.channel_id, plan.prize
            ),
        )
        .await?;

    tokio::time::sleep(plan.duration).await;

    let entrants = ctx.vstate.write().await.giveaways.close(posted.id);
    let winners = draw(entrants, plan.winners);

    // Retire the button so late clicks don't look accepted
    if let Err(e) = posted
        .edit(ctx.cache_http, EditMessage::new().components(vec![]))
        .await
    {
        log_error!(
            "Could not close giveaway in \"{}\": {}",
            plan.channel_id.color(ctx.http).await,
            e
        );
    }

    let announcement = if winners.is_empty() {
        "No one joined the giveaway 😢.".to_owned()
    } else {
        let mentions: Vec<String> = winners.iter().map(|w| format!("<@{}>", w)).collect();
        format!(
            "🎉 Congratulations {}! You won **{}**!",
            mentions.join(", "),
            plan.prize
        )
    };
    plan.channel_id.say(ctx.http, announcement).await?;
    Ok(())
}

async fn join(ctx: &Context<'_>, interaction: &ComponentInteraction) -> Result<()> {
    let entry = ctx
        .vstate
        .write()
        .await
        .giveaways
        .enter(interaction.message.id, interaction.user.id);

    let reply = match entry {
        Entry::Joined => "✅ You've joined the giveaway!",
        Entry::AlreadyJoined => "⚠️ You already joined!",
        Entry::Closed => "This giveaway has ended.",
    };
    interaction
        .create_response(
            ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(reply)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(content: &str) -> Vec<&str> {
        content.split_ascii_whitespace().skip(1).collect()
    }

    #[test]
    fn plans_a_giveaway() {
        let content = ".giveaway <#77> 2 1h30m Steam gift card";
        let plan = plan(content, &words(content), 30).unwrap();
        assert_eq!(plan.channel_id, ChannelId::new(77));
        assert_eq!(plan.winners, 2);
        assert_eq!(plan.duration, Duration::from_secs(90 * 60));
        assert_eq!(plan.prize, "Steam gift card");
    }

    #[test]
    fn rejects_bad_giveaways() {
        let check = |content: &str| plan(content, &words(content), 60).err();
        assert_eq!(check(".giveaway <#77> 1 1h"), Some(Invalid::Usage));
        assert_eq!(check(".giveaway general 1 1h Nitro"), Some(Invalid::Usage));
        assert_eq!(check(".giveaway <#77> 0 1h Nitro"), Some(Invalid::Winners));
        assert_eq!(check(".giveaway <#77> many 1h Nitro"), Some(Invalid::Winners));
        assert_eq!(check(".giveaway <#77> 1 soon Nitro"), Some(Invalid::Usage));
        assert_eq!(check(".giveaway <#77> 1 30s Nitro"), Some(Invalid::Usage));
        assert_eq!(check(".giveaway <#77> 1 0m Nitro"), Some(Invalid::Usage));
    }

    #[test]
    fn short_giveaways_are_refused() {
        let content = ".giveaway <#77> 1 1m Nitro";
        assert!(plan(content, &words(content), 120).is_err_and(|e| e == Invalid::TooShort(120)));
    }

    #[test]
    fn draws_distinct_winners() {
        let entrants: HashSet<UserId> = (1..=10).map(UserId::new).collect();
        let winners = draw(entrants.clone(), 3);
        assert_eq!(winners.len(), 3);
        assert_eq!(winners.iter().collect::<HashSet<_>>().len(), 3);
        assert!(winners.iter().all(|w| entrants.contains(w)));

        assert_eq!(draw(entrants, 50).len(), 10);
        assert!(draw(HashSet::new(), 1).is_empty());
    }
}
