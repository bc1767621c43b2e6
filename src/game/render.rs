//! Platform-neutral description of what a game message looks like.  The game plugin turns these
//! into Discord embeds and components.

use super::{
    menu::{Action, Menu, SheetPage},
    session::{Class, PlayerId, Session},
    shop::Slot,
    stage::StageTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Gold,
    Blue,
    Purple,
    Green,
    Red,
    Orange,
    Teal,
    DarkGold,
    DarkBlue,
    DarkTeal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub description: Option<String>,
    pub tone: Tone,
    pub fields: Vec<Field>,
}

impl Card {
    fn new(title: impl Into<String>, tone: Tone) -> Self {
        Self {
            title: title.into(),
            description: None,
            tone,
            fields: Vec::new(),
        }
    }

    fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn field(mut self, name: impl Into<String>, value: impl ToString, inline: bool) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.to_string(),
            inline,
        });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonTone {
    Primary,
    Secondary,
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: &'static str,
    pub value: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Button {
        action: Action,
        label: String,
        tone: ButtonTone,
    },
    /// Character sheet select owned by `owner`.  Each choice's value completes the sheet id
    /// into an [`Action::Sheet`].
    Select {
        owner: PlayerId,
        placeholder: &'static str,
        choices: Vec<Choice>,
    },
}

impl Control {
    fn button(action: Action, label: impl Into<String>, tone: ButtonTone) -> Self {
        Control::Button {
            action,
            label: label.into(),
            tone,
        }
    }
}

/// One message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    pub content: Option<String>,
    pub card: Option<Card>,
    pub controls: Vec<Control>,
    /// Session generation stamped into the controls' component ids
    pub generation: u64,
}

impl View {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    fn card(card: Card) -> Self {
        Self {
            card: Some(card),
            ..Self::default()
        }
    }

    fn with_controls(mut self, controls: Vec<Control>) -> Self {
        self.controls = controls;
        self
    }
}

pub fn render(menu: &Menu, session: &Session, stages: &StageTable) -> View {
    View {
        generation: session.generation,
        ..menu_view(menu, session, stages)
    }
}

fn menu_view(menu: &Menu, session: &Session, stages: &StageTable) -> View {
    match *menu {
        Menu::Main => {
            View::card(Card::new("Game Menu", Tone::Blue).description("Choose an option:"))
                .with_controls(main_controls())
        }
        Menu::Inventory => View::card(inventory_card(session)).with_controls(main_controls()),
        Menu::ShopCategories => {
            let mut controls: Vec<Control> = Slot::ALL
                .into_iter()
                .map(|slot| {
                    Control::button(
                        Action::OpenCategory(slot),
                        slot.button_label(),
                        ButtonTone::Primary,
                    )
                })
                .collect();
            controls.push(Control::button(
                Action::BackToMain,
                "Back",
                ButtonTone::Danger,
            ));
            View::card(Card::new("Shop Menu", Tone::Purple).description("Choose a category:"))
                .with_controls(controls)
        }
        Menu::Shop(slot) => {
            let tone = match slot {
                Slot::Weapon => Tone::DarkGold,
                Slot::Armor => Tone::DarkBlue,
                Slot::Potion => Tone::DarkTeal,
            };
            let mut card = Card::new(slot.shop_title(), tone).description("Choose an item to buy:");
            let mut controls = Vec::new();
            for item in slot.stock() {
                card = card.field(item.name(), format!("💰 {} gold", item.price()), false);
                controls.push(Control::button(
                    Action::Buy(item),
                    format!("Buy {} ({}g)", item.name(), item.price()),
                    ButtonTone::Success,
                ));
            }
            controls.push(Control::button(
                Action::BackToCategories,
                "Back",
                ButtonTone::Danger,
            ));
            View::card(card).with_controls(controls)
        }
        Menu::CharacterSheet(player) => {
            View::card(character_card(session, player)).with_controls(vec![sheet_select(player)])
        }
        Menu::CharacterList => View::text("🧙 **Character sheets are up.**").with_controls(vec![
            Control::button(Action::BackToMain, "Back", ButtonTone::Danger),
        ]),
        Menu::Gate => View::text("🧭 **The tower awaits...**").with_controls(vec![
            Control::button(Action::NextLevel, "Next Level", ButtonTone::Danger),
        ]),
        Menu::Stage => stage_view(session, stages),
        Menu::PlayerAction(player) => {
            View::text(format!("🎮 **{}'s Menu**", session.name_of(player))).with_controls(vec![
                Control::button(Action::Attack(player), "🗡️ Attack", ButtonTone::Danger),
                Control::button(Action::Skills(player), "✨ Skills", ButtonTone::Primary),
                Control::button(Action::Defend(player), "🛡️ Defend", ButtonTone::Secondary),
                Control::button(Action::Bag(player), "🎒 Bag", ButtonTone::Success),
                Control::button(Action::Character(player), "🧙 Character", ButtonTone::Primary),
            ])
        }
        Menu::Bag(player) => View::text(format!("{} opens their Bag!", session.name_of(player))),
        Menu::CharacterDetail(player) => {
            View::text(format!("🧙 **{}'s Character**", session.name_of(player)))
                .with_controls(vec![sheet_select(player)])
        }
        Menu::Classes => {
            let mut card = Card::new("Available Classes", Tone::Orange);
            for class in Class::ALL {
                card = card.field(class.to_string(), class.blurb(), false);
            }
            View::card(card)
        }
        Menu::Stats(player) => View::card(stats_card(session, player)),
    }
}

fn main_controls() -> Vec<Control> {
    vec![
        Control::button(
            Action::StartAdventure,
            "Start Adventure",
            ButtonTone::Success,
        ),
        Control::button(Action::OpenShop, "🛒 Shop", ButtonTone::Primary),
        Control::button(Action::OpenInventory, "📦 Inventory", ButtonTone::Secondary),
        Control::button(Action::OpenCharacters, "🧙 Character", ButtonTone::Primary),
    ]
}

fn sheet_select(player: PlayerId) -> Control {
    Control::Select {
        owner: player,
        placeholder: "Choose an option",
        choices: vec![
            Choice {
                label: "Classes",
                value: SheetPage::Classes.key(),
                description: "View available classes.",
            },
            Choice {
                label: "Stats",
                value: SheetPage::Stats.key(),
                description: "View your character's stats.",
            },
        ],
    }
}

fn item_name(item: Option<super::shop::Item>) -> &'static str {
    item.map(|i| i.name()).unwrap_or("None")
}

fn inventory_card(session: &Session) -> Card {
    let mut card = Card::new("Inventory List", Tone::Blue);
    for &player in &session.team {
        let Some(inventory) = session.inventory.get(&player) else {
            continue;
        };
        card = card.field(
            format!(
                "{} (💰 {} gold)",
                session.name_of(player),
                session.gold_of(player)
            ),
            format!(
                "**Weapon:** {}\n**Armor:** {}\n**Potion:** {}",
                item_name(inventory.get(Slot::Weapon)),
                item_name(inventory.get(Slot::Armor)),
                item_name(inventory.get(Slot::Potion)),
            ),
            false,
        );
    }
    card
}

fn class_name(session: &Session, player: PlayerId) -> String {
    session
        .team_data
        .get(&player)
        .and_then(|data| data.class)
        .map(|class| class.to_string())
        .unwrap_or_else(|| "None".to_owned())
}

fn character_card(session: &Session, player: PlayerId) -> Card {
    let stats = session
        .team_data
        .get(&player)
        .map(|data| data.stats.clone())
        .unwrap_or_default();

    Card::new("Character Sheet", Tone::Gold)
        .field("Name", format!("<@{}>", player), false)
        .field("Class", class_name(session, player), false)
        .field("HP", stats.hp, true)
        .field("MP", stats.mp, true)
        .field("Str", stats.strength, true)
        .field("Int", stats.intelligence, true)
        .field("Def", stats.defense, true)
        .field("Dex", stats.dexterity, true)
        .field("Stats Available", stats.stat_points, false)
}

fn stats_card(session: &Session, player: PlayerId) -> Card {
    let stats = session
        .team_data
        .get(&player)
        .map(|data| data.stats.clone())
        .unwrap_or_default();

    Card::new(format!("{}'s Stats", session.name_of(player)), Tone::Teal)
        .field("HP", stats.hp, false)
        .field("MP", stats.mp, false)
        .field("Str", format!("{} (+Physical DMG)", stats.strength), false)
        .field("Int", format!("{} (+Magic DMG)", stats.intelligence), true)
        .field("Def", format!("{} (Reduces Damage)", stats.defense), false)
        .field("Dex", format!("{} (+Accuracy, +Dodge)", stats.dexterity), true)
        .field("Stat Points Available", stats.stat_points, false)
        .field("EXP", format!("{}%", stats.exp), false)
}

fn stage_view(session: &Session, stages: &StageTable) -> View {
    let number = session.current_stage;
    let Some(stage) = stages.get(number) else {
        return View::text("No more stages!");
    };

    let hp = stage.total_hp();
    let turn = match session.current_player() {
        Some(player) => session.name_of(player),
        None => "Nobody".to_owned(),
    };

    View::card(
        Card::new("⚔️ Tower Progress Resumed!", Tone::Gold)
            .field("🏰 Stage", format!("{} ({})", number, stage.name), false)
            .field("❤️ Health", format!("{}/{}", hp, hp), false)
            .field("🎯 Current Turn", format!("{} (Player Turn)", turn), false),
    )
}

//
// Command responses
//

pub fn session_opened(session: &Session, prefix: &str) -> View {
    let visibility = session
        .visibility
        .map(|v| v.to_string())
        .unwrap_or_default();

    View::card(
        Card::new("Game Started! 🎮", Tone::Gold)
            .description(format!(
                "A new **{}** game session has begun. Use `{}join` to participate!",
                visibility, prefix
            ))
            .field("Current Team Members", session.team_names().join("\n"), false),
    )
}

pub fn player_joined(session: &Session, player: PlayerId) -> View {
    View::card(
        Card::new("New Player Joined! 🎉", Tone::Green)
            .description(format!(
                "{} has joined the adventure!",
                session.name_of(player)
            ))
            .field("Current Team Members", session.team_names().join("\n"), false),
    )
}

pub fn player_left(session: &Session, name: &str) -> View {
    let members = session.team_names().join("\n");
    View::card(
        Card::new("Player Left 👋", Tone::Orange)
            .description(format!("{} has left the adventure.", name))
            .field("Current Team Members", members, false),
    )
}

pub fn gold_added(caller: &str, target: &str, amount: u64, balance: u64) -> View {
    View::card(
        Card::new("💰 Gold Added", Tone::Green)
            .description(format!("{} gave **{} gold** to {}.", caller, amount, target))
            .field(
                "New Balance",
                format!("{} now has **{} gold**.", target, balance),
                false,
            ),
    )
}

pub fn session_ended() -> View {
    View::card(
        Card::new("Game Ended", Tone::Red).description("The game session has been concluded."),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{
        session::{
            tests::{admin, alice, bob, open_with},
            Visibility,
        },
        shop::Item,
        stage::tests::SAMPLE,
    };

    fn buttons(view: &View) -> Vec<Action> {
        view.controls
            .iter()
            .filter_map(|c| match c {
                Control::Button { action, .. } => Some(*action),
                Control::Select { .. } => None,
            })
            .collect()
    }

    #[test]
    fn menus_carry_the_session_generation() {
        let session = open_with(Visibility::Private, &[alice()]);
        let view = render(&Menu::Main, &session, &StageTable::default());
        assert_eq!(view.generation, session.generation);
        assert_ne!(view.generation, 0);
    }

    #[test]
    fn inventory_lists_team_in_join_order() {
        let mut session = open_with(Visibility::Public, &[alice(), bob()]);
        session.add_gold(&admin(), bob().id, 150).unwrap();
        session.buy(bob().id, Item::Sword).unwrap();

        let view = render(&Menu::Inventory, &session, &StageTable::default());
        let card = view.card.unwrap();
        assert_eq!(card.fields.len(), 2);
        assert_eq!(card.fields[0].name, "alice (💰 0 gold)");
        assert_eq!(card.fields[1].name, "bob (💰 50 gold)");
        assert_eq!(
            card.fields[1].value,
            "**Weapon:** Sword\n**Armor:** None\n**Potion:** None"
        );
    }

    #[test]
    fn shop_offers_its_stock_and_a_way_back() {
        let session = open_with(Visibility::Public, &[alice()]);
        let view = render(&Menu::Shop(Slot::Armor), &session, &StageTable::default());

        assert_eq!(
            buttons(&view),
            vec![
                Action::Buy(Item::LeatherArmor),
                Action::Buy(Item::Chainmail),
                Action::Buy(Item::PlateArmor),
                Action::BackToCategories,
            ]
        );
        let Control::Button { label, .. } = &view.controls[2] else {
            panic!("expected a button");
        };
        assert_eq!(label, "Buy Plate Armor (250g)");
    }

    #[test]
    fn stage_shows_total_hp_and_whose_turn() {
        let mut session = open_with(Visibility::Public, &[alice(), bob()]);
        session.begin_adventure();
        session.advance_turn();
        let stages = StageTable::parse(SAMPLE).unwrap();

        let card = render(&Menu::Stage, &session, &stages).card.unwrap();
        assert_eq!(card.fields[0].value, "1 (Slime Cellar)");
        assert_eq!(card.fields[1].value, "75/75");
        assert_eq!(card.fields[2].value, "bob (Player Turn)");
    }

    #[test]
    fn missing_stage_is_terminal() {
        let mut session = open_with(Visibility::Public, &[alice()]);
        session.current_stage = 9;
        let stages = StageTable::parse(SAMPLE).unwrap();

        let view = render(&Menu::Stage, &session, &stages);
        assert_eq!(view, View::text("No more stages!"));
    }

    #[test]
    fn player_menu_is_bound_to_its_owner() {
        let session = open_with(Visibility::Public, &[alice(), bob()]);
        let view = render(
            &Menu::PlayerAction(bob().id),
            &session,
            &StageTable::default(),
        );

        assert_eq!(view.content.as_deref(), Some("🎮 **bob's Menu**"));
        assert!(buttons(&view).iter().all(|a| a.owner() == Some(bob().id)));
    }
}
