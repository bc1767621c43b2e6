//! Discord side of the tower game: text commands, menu clicks, and turning game views into
//! embeds and components.

use crate::{
    event::*,
    game::{
        menu::{main_menu, NAMESPACE},
        press,
        render::{self, ButtonTone, Card, Control, Tone, View},
        resume,
        session::Session,
        Action, Caller, GameError, Menu, Notice, Visibility,
    },
    helper::*,
    log_error,
    logging::*,
    plugin::*,
};
use anyhow::Result;
use serenity::all::{
    ButtonStyle, ChannelId, Colour, ComponentInteraction, ComponentInteractionDataKind,
    CreateActionRow, CreateButton, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateMessage, CreateSelectMenu, CreateSelectMenuKind,
    CreateSelectMenuOption, GuildId, Message, Permissions,
};

const COMMANDS: [&str; 11] = [
    "game", "join", "leave", "start", "menu", "endgame", "addgold", "addstats", "setclass", "gold",
    "continue",
];

pub struct Game;

#[serenity::async_trait]
impl Plugin for Game {
    fn name(&self) -> &'static str {
        "game"
    }

    async fn usage(&self, ctx: &Context) -> Option<String> {
        let p = &ctx.cfg.read().await.general.command_prefix;
        Some(
            [
                format!("{p}game <public|private> - open a game session"),
                format!("{p}join - join the open game"),
                format!("{p}leave - leave the game before it starts"),
                format!("{p}start - start the game (host only)"),
                format!("{p}menu - open the game menu (host only)"),
                format!("{p}continue - show the current stage again"),
                format!("{p}gold - check your gold"),
                format!("{p}addgold <@user> <amount> - give a player gold"),
                format!("{p}addstats <@user> <str|int|def|dex> <amount> - spend stat points"),
                format!("{p}setclass <@user> <warrior|archer|mage|priest> - set a class"),
                format!("{p}endgame - end the game (host only)"),
            ]
            .join("\n"),
        )
    }

    async fn handle(&self, ctx: &Context, event: &Event) -> Result<EventHandled> {
        if let Some(interaction) = event.is_component(NAMESPACE) {
            self.on_click(ctx, interaction).await?;
            return Ok(EventHandled::Yes);
        }

        for name in COMMANDS {
            if let Some((msg, args)) = event.is_bot_cmd(ctx, name).await {
                self.on_command(ctx, msg, name, &args).await?;
                return Ok(EventHandled::Yes);
            }
        }

        Ok(EventHandled::No)
    }
}

impl Game {
    async fn on_command(
        &self,
        ctx: &Context<'_>,
        msg: &Message,
        name: &str,
        args: &[&str],
    ) -> Result<()> {
        let Some(guild_id) = msg.guild_id else {
            msg.reply(ctx.cache_http, "❌ The game can only be played in a server.")
                .await?;
            return Ok(());
        };

        let caller = Caller::new(
            msg.author.id,
            msg.author.nick_in_guild(ctx, Some(guild_id)).await,
            msg.author_has(ctx, Permissions::ADMINISTRATOR),
        );

        let views = match self.run(ctx, guild_id, &caller, name, args).await {
            Ok(views) => views,
            Err(Rejection::Game(e)) => vec![View::text(e.to_string())],
            Err(Rejection::Usage(usage)) => {
                let prefix = ctx.cfg.read().await.general.command_prefix.clone();
                vec![View::text(format!("⚠️ Usage: `{}{}`", prefix, usage))]
            }
        };

        send_views(ctx, msg.channel_id, &views).await;
        Ok(())
    }

    /// Run one command, returning the messages to post.  The session lock is released before
    /// anything is sent.
    async fn run(
        &self,
        ctx: &Context<'_>,
        guild_id: GuildId,
        caller: &Caller,
        name: &str,
        args: &[&str],
    ) -> Result<Vec<View>, Rejection> {
        if name == "endgame" {
            ctx.vstate
                .write()
                .await
                .games
                .end(guild_id, caller.id)
                .await?;
            return Ok(vec![render::session_ended()]);
        }

        // Resolve everything that needs Discord before taking the session lock
        let target = match name {
            "addgold" | "addstats" | "setclass" => {
                let usage = match name {
                    "addgold" => "addgold <@user> <amount>",
                    "addstats" => "addstats <@user> <stat> <amount>",
                    _ => "setclass <@user> <class>",
                };
                let target = args
                    .first()
                    .and_then(|arg| user_arg(arg))
                    .ok_or(Rejection::Usage(usage))?;
                Some((target, target.nick_in_guild(ctx, Some(guild_id)).await))
            }
            _ => None,
        };
        let prefix = ctx.cfg.read().await.general.command_prefix.clone();

        let session = ctx.vstate.write().await.games.get_or_create(guild_id);
        let stages = ctx.stages.read().await;
        let mut session = session.lock().await;

        let view = match (name, target) {
            ("game", _) => {
                open_game(&mut session, caller, args.first().copied())?;
                render::session_opened(&session, &prefix)
            }
            ("join", _) => {
                session.join(caller)?;
                render::player_joined(&session, caller.id)
            }
            ("leave", _) => {
                let name = session.name_of(caller.id);
                session.leave(caller.id)?;
                render::player_left(&session, &name)
            }
            ("start", _) => {
                session.start(caller.id)?;
                render::render(&Menu::Main, &session, &stages)
            }
            ("menu", _) => {
                let menus = main_menu(&session, caller.id)?;
                return Ok(menus
                    .iter()
                    .map(|menu| render::render(menu, &session, &stages))
                    .collect());
            }
            ("continue", _) => {
                let menus = resume(&session, &stages)?;
                return Ok(menus
                    .iter()
                    .map(|menu| render::render(menu, &session, &stages))
                    .collect());
            }
            ("gold", _) => View::text(format!(
                "💰 {}, you have **{} gold**.",
                caller.name,
                session.gold_of(caller.id)
            )),
            ("addgold", Some((target, target_name))) => {
                let amount: u64 = args
                    .get(1)
                    .and_then(|a| a.parse().ok())
                    .ok_or(Rejection::Usage("addgold <@user> <amount>"))?;
                let balance = session.add_gold(caller, target, amount)?;
                render::gold_added(&caller.name, &target_name, amount, balance)
            }
            ("addstats", Some((target, target_name))) => {
                let (Some(stat), Some(amount)) =
                    (args.get(1), args.get(2).and_then(|a| a.parse::<u32>().ok()))
                else {
                    return Err(Rejection::Usage("addstats <@user> <stat> <amount>"));
                };
                let (stat, _) = session.add_stats(caller, target, stat, amount)?;
                View::text(format!("✅ Added {} {} to {}.", amount, stat, target_name))
            }
            ("setclass", Some((target, target_name))) => {
                let class = args
                    .get(1)
                    .ok_or(Rejection::Usage("setclass <@user> <class>"))?;
                let class = session.set_class(caller, target, class)?;
                View::text(format!("✅ {} is now a **{}**!", target_name, class))
            }
            _ => return Ok(Vec::new()),
        };

        Ok(vec![view])
    }

    async fn on_click(&self, ctx: &Context<'_>, interaction: &ComponentInteraction) -> Result<()> {
        let values = match &interaction.data.kind {
            ComponentInteractionDataKind::StringSelect { values } => values.clone(),
            _ => Vec::new(),
        };

        let (Some((generation, action)), Some(guild_id)) = (
            Action::parse(&interaction.data.custom_id, &values),
            interaction.guild_id,
        ) else {
            return reply_ephemeral(ctx, interaction, "This menu is no longer available.").await;
        };

        let session = ctx.vstate.write().await.games.get_or_create(guild_id);
        let result = {
            let stages = ctx.stages.read().await;
            let mut session = session.lock().await;
            press(&mut session, &stages, interaction.user.id, generation, action).map(|outcome| {
                let views: Vec<View> = outcome
                    .open
                    .iter()
                    .map(|menu| render::render(menu, &session, &stages))
                    .collect();
                (outcome, views)
            })
        };

        let (outcome, views) = match result {
            Ok(done) => done,
            // Rejections leave the menu open for whoever may use it
            Err(e) => return reply_ephemeral(ctx, interaction, &e.to_string()).await,
        };

        let response = match outcome.notice {
            Some(Notice::Public(text)) => {
                CreateInteractionResponse::Message(CreateInteractionResponseMessage::new().content(text))
            }
            None => CreateInteractionResponse::Acknowledge,
        };
        if let Err(e) = interaction.create_response(ctx.http, response).await {
            log_error!("Could not answer menu click: {}", e);
        }

        if outcome.close_source {
            if let Err(e) = interaction.message.delete(ctx.cache_http).await {
                log_error!(
                    "Could not delete menu in \"{}\": {}",
                    interaction.channel_id.color(ctx.http).await,
                    e
                );
            }
        }

        send_views(ctx, interaction.channel_id, &views).await;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Rejection {
    Game(GameError),
    /// Malformed arguments; holds the command synopsis without prefix
    Usage(&'static str),
}

impl From<GameError> for Rejection {
    fn from(e: GameError) -> Self {
        Rejection::Game(e)
    }
}

/// Open a game from the `game` command's argument.  A running game is reported before a bad or
/// missing argument.
fn open_game(session: &mut Session, caller: &Caller, arg: Option<&str>) -> Result<(), Rejection> {
    if session.active {
        return Err(GameError::AlreadyActive.into());
    }
    let visibility: Visibility = arg
        .and_then(|v| v.parse().ok())
        .ok_or(Rejection::Usage("game <public|private>"))?;
    session.open(caller, visibility)?;
    Ok(())
}

async fn reply_ephemeral(
    ctx: &Context<'_>,
    interaction: &ComponentInteraction,
    text: &str,
) -> Result<()> {
    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(text)
            .ephemeral(true),
    );
    interaction.create_response(ctx.http, response).await?;
    Ok(())
}

/// Post views in order.  Failures are logged and the rest still go out.
async fn send_views(ctx: &Context<'_>, channel_id: ChannelId, views: &[View]) {
    for view in views {
        if let Err(e) = channel_id
            .send_message(ctx.cache_http, to_message(view))
            .await
        {
            log_error!(
                "Could not post game message in \"{}\": {}",
                channel_id.color(ctx.http).await,
                e
            );
        }
    }
}

fn to_message(view: &View) -> CreateMessage {
    let mut message = CreateMessage::new();
    if let Some(content) = &view.content {
        message = message.content(content);
    }
    if let Some(card) = &view.card {
        message = message.embed(to_embed(card));
    }
    let rows = to_rows(&view.controls, view.generation);
    if !rows.is_empty() {
        message = message.components(rows);
    }
    message
}

fn to_embed(card: &Card) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&card.title)
        .colour(colour(card.tone));
    if let Some(description) = &card.description {
        embed = embed.description(description);
    }
    for field in &card.fields {
        embed = embed.field(&field.name, &field.value, field.inline);
    }
    embed
}

fn colour(tone: Tone) -> Colour {
    match tone {
        Tone::Gold => palette::GOLD,
        Tone::Blue => palette::BLUE,
        Tone::Purple => palette::PURPLE,
        Tone::Green => palette::GREEN,
        Tone::Red => palette::RED,
        Tone::Orange => palette::ORANGE,
        Tone::Teal => palette::TEAL,
        Tone::DarkGold => palette::DARK_GOLD,
        Tone::DarkBlue => palette::DARK_BLUE,
        Tone::DarkTeal => palette::DARK_TEAL,
    }
}

/// Discord allows five buttons per row; a select menu fills a row on its own.
fn to_rows(controls: &[Control], generation: u64) -> Vec<CreateActionRow> {
    let mut rows = Vec::new();
    let mut buttons = Vec::new();

    for control in controls {
        match control {
            Control::Button { action, label, tone } => {
                if buttons.len() == 5 {
                    rows.push(CreateActionRow::Buttons(std::mem::take(&mut buttons)));
                }
                let style = match tone {
                    ButtonTone::Primary => ButtonStyle::Primary,
                    ButtonTone::Secondary => ButtonStyle::Secondary,
                    ButtonTone::Success => ButtonStyle::Success,
                    ButtonTone::Danger => ButtonStyle::Danger,
                };
                buttons.push(
                    CreateButton::new(action.custom_id(generation))
                        .label(label)
                        .style(style),
                );
            }
            Control::Select {
                owner,
                placeholder,
                choices,
            } => {
                if !buttons.is_empty() {
                    rows.push(CreateActionRow::Buttons(std::mem::take(&mut buttons)));
                }
                let options = choices
                    .iter()
                    .map(|c| CreateSelectMenuOption::new(c.label, c.value).description(c.description))
                    .collect();
                rows.push(CreateActionRow::SelectMenu(
                    CreateSelectMenu::new(
                        Action::sheet_custom_id(generation, *owner),
                        CreateSelectMenuKind::String { options },
                    )
                        .placeholder(*placeholder),
                ));
            }
        }
    }
    if !buttons.is_empty() {
        rows.push(CreateActionRow::Buttons(buttons));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::all::UserId;

    fn host() -> Caller {
        Caller::new(UserId::new(1), "alice", false)
    }

    #[test]
    fn running_game_is_reported_before_a_bad_argument() {
        let mut session = Session::default();
        assert_eq!(
            open_game(&mut session, &host(), None),
            Err(Rejection::Usage("game <public|private>"))
        );
        assert_eq!(
            open_game(&mut session, &host(), Some("secret")),
            Err(Rejection::Usage("game <public|private>"))
        );
        assert!(!session.active);

        open_game(&mut session, &host(), Some("Private")).unwrap();
        assert_eq!(session.visibility, Some(Visibility::Private));

        let other = Caller::new(UserId::new(2), "bob", false);
        for arg in [None, Some("public")] {
            assert_eq!(
                open_game(&mut session, &other, arg),
                Err(Rejection::Game(GameError::AlreadyActive))
            );
        }
        assert!(session.is_host(host().id));
    }
}
