//! Menu navigation as a state machine.
//!
//! A [`Menu`] is a message the bot posts; an [`Action`] is a click on one of its controls.
//! [`transition`] applies an action to the session and says which messages to post next.  Every
//! navigation posts fresh messages and retires the one that was clicked.  Component ids carry the
//! session generation, and [`press`] turns away controls left over from an earlier game.

use super::{
    error::GameError,
    session::{PlayerId, Session},
    shop::{Item, Slot},
    stage::StageTable,
};
use serenity::all::UserId;

/// Namespace of every component id the game owns
pub const NAMESPACE: &str = "game";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    Main,
    Inventory,
    ShopCategories,
    Shop(Slot),
    /// One player's sheet, as posted from the character list
    CharacterSheet(PlayerId),
    /// Navigation footer posted after all character sheets
    CharacterList,
    /// Entrance to the tower, before the first stage is shown
    Gate,
    Stage,
    PlayerAction(PlayerId),
    Bag(PlayerId),
    CharacterDetail(PlayerId),
    Classes,
    Stats(PlayerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetPage {
    Classes,
    Stats,
}

impl SheetPage {
    pub fn key(self) -> &'static str {
        match self {
            SheetPage::Classes => "classes",
            SheetPage::Stats => "stats",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "classes" => Some(SheetPage::Classes),
            "stats" => Some(SheetPage::Stats),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartAdventure,
    OpenShop,
    OpenInventory,
    OpenCharacters,
    BackToMain,
    OpenCategory(Slot),
    BackToCategories,
    Buy(Item),
    NextLevel,
    Attack(PlayerId),
    Skills(PlayerId),
    Defend(PlayerId),
    Bag(PlayerId),
    Character(PlayerId),
    Sheet(PlayerId, SheetPage),
}

impl Action {
    /// Player the control belongs to, for controls that only their owner may use
    pub fn owner(self) -> Option<PlayerId> {
        match self {
            Action::Attack(p)
            | Action::Skills(p)
            | Action::Defend(p)
            | Action::Bag(p)
            | Action::Character(p)
            | Action::Sheet(p, _) => Some(p),
            _ => None,
        }
    }

    /// Host-only navigation through the pre-game menus
    fn is_host_navigation(self) -> bool {
        matches!(
            self,
            Action::StartAdventure
                | Action::OpenShop
                | Action::OpenInventory
                | Action::OpenCharacters
                | Action::BackToMain
                | Action::OpenCategory(_)
                | Action::BackToCategories
                | Action::NextLevel
        )
    }

    /// Turns and purchases only make sense once the host has started the game
    fn needs_started_game(self) -> bool {
        matches!(
            self,
            Action::Attack(_) | Action::Skills(_) | Action::Defend(_) | Action::Buy(_)
        )
    }

    pub fn custom_id(self, generation: u64) -> String {
        let tail = match self {
            Action::StartAdventure => "start".to_owned(),
            Action::OpenShop => "shop".to_owned(),
            Action::OpenInventory => "inventory".to_owned(),
            Action::OpenCharacters => "characters".to_owned(),
            Action::BackToMain => "main".to_owned(),
            Action::OpenCategory(slot) => format!("category:{}", slot.key()),
            Action::BackToCategories => "categories".to_owned(),
            Action::Buy(item) => format!("buy:{}", item.key()),
            Action::NextLevel => "next".to_owned(),
            Action::Attack(p) => format!("attack:{}", p),
            Action::Skills(p) => format!("skills:{}", p),
            Action::Defend(p) => format!("defend:{}", p),
            Action::Bag(p) => format!("bag:{}", p),
            Action::Character(p) => format!("character:{}", p),
            Action::Sheet(p, page) => format!("sheet:{}:{}", p, page.key()),
        };
        format!("{}:{}:{}", NAMESPACE, generation, tail)
    }

    /// Select menus carry the page in the chosen value rather than the id
    pub fn sheet_custom_id(generation: u64, player: PlayerId) -> String {
        format!("{}:{}:sheet:{}", NAMESPACE, generation, player)
    }

    /// Decode a component id, plus the chosen value for select menus, into the generation of the
    /// session that posted it and the action
    pub fn parse(custom_id: &str, values: &[String]) -> Option<(u64, Self)> {
        let mut parts = custom_id.split(':');
        if parts.next() != Some(NAMESPACE) {
            return None;
        }
        let generation: u64 = parts.next()?.parse().ok()?;

        let player = |s: Option<&str>| -> Option<PlayerId> {
            s?.parse::<u64>().ok().filter(|&id| id != 0).map(UserId::new)
        };

        let action = match parts.next()? {
            "start" => Action::StartAdventure,
            "shop" => Action::OpenShop,
            "inventory" => Action::OpenInventory,
            "characters" => Action::OpenCharacters,
            "main" => Action::BackToMain,
            "category" => Action::OpenCategory(Slot::from_key(parts.next()?)?),
            "categories" => Action::BackToCategories,
            "buy" => Action::Buy(Item::from_key(parts.next()?)?),
            "next" => Action::NextLevel,
            "attack" => Action::Attack(player(parts.next())?),
            "skills" => Action::Skills(player(parts.next())?),
            "defend" => Action::Defend(player(parts.next())?),
            "bag" => Action::Bag(player(parts.next())?),
            "character" => Action::Character(player(parts.next())?),
            "sheet" => {
                let owner = player(parts.next())?;
                let page = match parts.next() {
                    Some(page) => page,
                    None => values.first()?.as_str(),
                };
                Action::Sheet(owner, SheetPage::from_key(page)?)
            }
            _ => return None,
        };

        match parts.next() {
            Some(_) => None,
            None => Some((generation, action)),
        }
    }
}

/// Interaction response accompanying a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Visible to the whole channel
    Public(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outcome {
    /// Delete the message whose control was used
    pub close_source: bool,
    pub notice: Option<Notice>,
    /// Menus to post, in order
    pub open: Vec<Menu>,
}

impl Outcome {
    fn navigate(open: Vec<Menu>) -> Self {
        Self {
            close_source: true,
            notice: None,
            open,
        }
    }

    fn panel(menu: Menu) -> Self {
        Self {
            close_source: false,
            notice: None,
            open: vec![menu],
        }
    }
}

/// The stage view, followed by the acting player's menu while there is a stage to fight.
pub fn stage_menus(session: &Session, stages: &StageTable) -> Vec<Menu> {
    let mut menus = vec![Menu::Stage];
    if stages.get(session.current_stage).is_some() {
        if let Some(player) = session.current_player() {
            menus.push(Menu::PlayerAction(player));
        }
    }
    menus
}

/// The main menu, which only the host may open.
pub fn main_menu(session: &Session, caller: PlayerId) -> Result<Vec<Menu>, GameError> {
    session.authorize_host(caller)?;
    Ok(vec![Menu::Main])
}

/// Re-post the stage view and the acting player's menu of a started game.
pub fn resume(session: &Session, stages: &StageTable) -> Result<Vec<Menu>, GameError> {
    if !session.active {
        return Err(GameError::NoActiveSession);
    }
    if !session.has_started {
        return Err(GameError::NotStarted);
    }
    Ok(stage_menus(session, stages))
}

/// Apply a click on a control posted by session `generation`.  Controls from any other game
/// are rejected without looking at the action.
pub fn press(
    session: &mut Session,
    stages: &StageTable,
    actor: PlayerId,
    generation: u64,
    action: Action,
) -> Result<Outcome, GameError> {
    if generation != session.generation {
        return Err(GameError::StaleMenu);
    }
    transition(session, stages, actor, action)
}

/// Apply `action`, performed by `actor`, to the session.
///
/// A rejection leaves the session untouched and the clicked message open.
pub fn transition(
    session: &mut Session,
    stages: &StageTable,
    actor: PlayerId,
    action: Action,
) -> Result<Outcome, GameError> {
    if !session.active {
        return Err(GameError::NoActiveSession);
    }
    if action.is_host_navigation() {
        session.authorize_host(actor)?;
    }
    if let Some(owner) = action.owner() {
        if owner != actor {
            return Err(GameError::NotYourMenu);
        }
    }
    if action.needs_started_game() && !session.has_started {
        return Err(GameError::NotStarted);
    }

    let outcome = match action {
        Action::StartAdventure => {
            session.begin_adventure();
            Outcome::navigate(vec![Menu::Gate])
        }
        Action::OpenShop | Action::BackToCategories => {
            Outcome::navigate(vec![Menu::ShopCategories])
        }
        Action::OpenInventory => Outcome::navigate(vec![Menu::Inventory]),
        Action::OpenCharacters => {
            let mut open: Vec<Menu> = session
                .team
                .iter()
                .map(|&p| Menu::CharacterSheet(p))
                .collect();
            open.push(Menu::CharacterList);
            Outcome::navigate(open)
        }
        Action::BackToMain => Outcome::navigate(vec![Menu::Main]),
        Action::OpenCategory(slot) => Outcome::navigate(vec![Menu::Shop(slot)]),
        Action::Buy(item) => {
            session.buy(actor, item)?;
            Outcome {
                close_source: false,
                notice: Some(Notice::Public(format!(
                    "✅ {} bought **{}** for {} gold!",
                    session.name_of(actor),
                    item.name(),
                    item.price()
                ))),
                open: Vec::new(),
            }
        }
        Action::NextLevel => Outcome::navigate(stage_menus(session, stages)),
        Action::Attack(player) | Action::Skills(player) | Action::Defend(player) => {
            if session.current_player() != Some(player) {
                return Err(GameError::NotYourTurn);
            }
            // Combat is not resolved yet; acting just passes the turn.
            session.advance_turn();
            Outcome::navigate(stage_menus(session, stages))
        }
        Action::Bag(player) => Outcome::panel(Menu::Bag(player)),
        Action::Character(player) => Outcome::panel(Menu::CharacterDetail(player)),
        Action::Sheet(_, SheetPage::Classes) => Outcome::panel(Menu::Classes),
        Action::Sheet(player, SheetPage::Stats) => {
            if !session.team_data.contains_key(&player) {
                return Err(GameError::PlayerNotFound);
            }
            Outcome::panel(Menu::Stats(player))
        }
    };

    Ok(outcome)
}
