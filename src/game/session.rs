//! One server's game: roster, economy, character sheets and turn order.
//!
//! Every operation validates all of its preconditions before touching any field, so a rejected
//! call leaves the session exactly as it was.

use super::{
    error::GameError,
    shop::{Item, Slot},
};
use serenity::all::UserId;
use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
};

/// Source of session generations.  Zero is left for sessions that were never opened.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Players are identified by their Discord user id everywhere in the session.
pub type PlayerId = UserId;

/// Who may run the privileged gold/stat/class commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Server administrators only
    Public,
    /// The host only
    Private,
}

impl FromStr for Visibility {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Visibility::Public => "Public",
            Visibility::Private => "Private",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Warrior,
    Archer,
    Mage,
    Priest,
}

impl Class {
    pub const ALL: [Class; 4] = [Class::Warrior, Class::Archer, Class::Mage, Class::Priest];

    pub fn blurb(self) -> &'static str {
        match self {
            Class::Warrior => "Strong physical attacker.",
            Class::Archer => "High accuracy ranged attacker.",
            Class::Mage => "High magic damage.",
            Class::Priest => "Healer and support.",
        }
    }
}

impl FromStr for Class {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "warrior" => Ok(Class::Warrior),
            "archer" => Ok(Class::Archer),
            "mage" => Ok(Class::Mage),
            "priest" => Ok(Class::Priest),
            _ => Err(GameError::InvalidClass),
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Class::Warrior => "Warrior",
            Class::Archer => "Archer",
            Class::Mage => "Mage",
            Class::Priest => "Priest",
        })
    }
}

/// Stats that can be raised with stat points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Str,
    Int,
    Def,
    Dex,
}

impl FromStr for Stat {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "str" => Ok(Stat::Str),
            "int" => Ok(Stat::Int),
            "def" => Ok(Stat::Def),
            "dex" => Ok(Stat::Dex),
            _ => Err(GameError::InvalidStat),
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Stat::Str => "Str",
            Stat::Int => "Int",
            Stat::Def => "Def",
            Stat::Dex => "Dex",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub hp: u32,
    pub mp: u32,
    pub strength: u32,
    pub intelligence: u32,
    pub defense: u32,
    pub dexterity: u32,
    pub stat_points: u32,
    /// Percent progress towards the next level
    pub exp: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            hp: 100,
            mp: 50,
            strength: 1,
            intelligence: 1,
            defense: 1,
            dexterity: 1,
            stat_points: 1,
            exp: 0,
        }
    }
}

impl Stats {
    fn get_mut(&mut self, stat: Stat) -> &mut u32 {
        match stat {
            Stat::Str => &mut self.strength,
            Stat::Int => &mut self.intelligence,
            Stat::Def => &mut self.defense,
            Stat::Dex => &mut self.dexterity,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerData {
    pub class: Option<Class>,
    pub stats: Stats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    pub weapon: Option<Item>,
    pub armor: Option<Item>,
    pub potion: Option<Item>,
}

impl Inventory {
    pub fn get(&self, slot: Slot) -> Option<Item> {
        match slot {
            Slot::Weapon => self.weapon,
            Slot::Armor => self.armor,
            Slot::Potion => self.potion,
        }
    }

    /// Replaces whatever the slot held
    fn equip(&mut self, item: Item) {
        let slot = match item.slot() {
            Slot::Weapon => &mut self.weapon,
            Slot::Armor => &mut self.armor,
            Slot::Potion => &mut self.potion,
        };
        *slot = Some(item);
    }
}

/// The user running a command, as far as game authorization is concerned.
#[derive(Debug, Clone)]
pub struct Caller {
    pub id: PlayerId,
    pub name: String,
    /// Holds the server's administrator permission
    pub is_admin: bool,
}

impl Caller {
    pub fn new(id: PlayerId, name: impl Into<String>, is_admin: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Distinct for every opened game in the process, and stamped into its menu controls so
    /// controls from an earlier game can be told apart
    pub generation: u64,
    pub active: bool,
    pub has_started: bool,
    /// Fixed when the session is opened
    pub visibility: Option<Visibility>,
    pub host: Option<PlayerId>,
    /// Join order, which is also turn order
    pub team: Vec<PlayerId>,
    /// Display names captured when players joined
    pub names: HashMap<PlayerId, String>,
    pub inventory: HashMap<PlayerId, Inventory>,
    pub gold: HashMap<PlayerId, u64>,
    pub team_data: HashMap<PlayerId, PlayerData>,
    pub current_stage: u32,
    /// Taken modulo the team size whenever it is read
    pub current_turn_index: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            generation: 0,
            active: false,
            has_started: false,
            visibility: None,
            host: None,
            team: Vec::new(),
            names: HashMap::new(),
            inventory: HashMap::new(),
            gold: HashMap::new(),
            team_data: HashMap::new(),
            current_stage: 1,
            current_turn_index: 0,
        }
    }
}

impl Session {
    pub fn is_host(&self, id: PlayerId) -> bool {
        self.host == Some(id)
    }

    pub fn is_member(&self, id: PlayerId) -> bool {
        self.team.contains(&id)
    }

    /// Name to show for a player, falling back to a mention
    pub fn name_of(&self, id: PlayerId) -> String {
        match self.names.get(&id) {
            Some(name) => name.clone(),
            None => format!("<@{}>", id),
        }
    }

    pub fn gold_of(&self, id: PlayerId) -> u64 {
        self.gold.get(&id).copied().unwrap_or(0)
    }

    pub fn team_names(&self) -> Vec<String> {
        self.team.iter().map(|&p| self.name_of(p)).collect()
    }

    fn seed_player(&mut self, caller: &Caller) {
        self.team.push(caller.id);
        self.names.insert(caller.id, caller.name.clone());
        self.inventory.insert(caller.id, Inventory::default());
        self.gold.entry(caller.id).or_insert(0);
        self.team_data.insert(caller.id, PlayerData::default());
    }

    fn require_active(&self) -> Result<(), GameError> {
        if self.active {
            Ok(())
        } else {
            Err(GameError::NoActiveSession)
        }
    }

    /// Active session and caller is its host
    pub fn authorize_host(&self, caller: PlayerId) -> Result<(), GameError> {
        self.require_active()?;
        if !self.is_host(caller) {
            return Err(GameError::NotHost);
        }
        Ok(())
    }

    /// Gate for gold/stat/class administration, which depends on the session's visibility.
    pub fn authorize_admin(&self, caller: &Caller) -> Result<(), GameError> {
        self.require_active()?;
        let allowed = match self.visibility {
            Some(Visibility::Public) => caller.is_admin,
            Some(Visibility::Private) => self.is_host(caller.id),
            None => false,
        };
        if !allowed {
            return Err(GameError::UnauthorizedVisibilityAction);
        }
        Ok(())
    }

    pub fn open(&mut self, caller: &Caller, visibility: Visibility) -> Result<(), GameError> {
        if self.active {
            return Err(GameError::AlreadyActive);
        }

        *self = Session {
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            active: true,
            visibility: Some(visibility),
            host: Some(caller.id),
            ..Session::default()
        };
        self.seed_player(caller);
        Ok(())
    }

    pub fn join(&mut self, caller: &Caller) -> Result<(), GameError> {
        self.require_active()?;
        if self.has_started {
            return Err(GameError::AlreadyStarted);
        }
        if self.is_member(caller.id) {
            return Err(GameError::AlreadyJoined);
        }

        self.seed_player(caller);
        Ok(())
    }

    pub fn leave(&mut self, caller: PlayerId) -> Result<(), GameError> {
        self.require_active()?;
        if self.has_started {
            return Err(GameError::AlreadyStarted);
        }
        if !self.is_member(caller) {
            return Err(GameError::PlayerNotFound);
        }
        if self.is_host(caller) {
            return Err(GameError::HostCannotLeave);
        }

        self.team.retain(|&p| p != caller);
        self.names.remove(&caller);
        self.inventory.remove(&caller);
        self.gold.remove(&caller);
        self.team_data.remove(&caller);
        Ok(())
    }

    pub fn start(&mut self, caller: PlayerId) -> Result<(), GameError> {
        self.authorize_host(caller)?;
        if self.has_started {
            return Err(GameError::AlreadyStarted);
        }

        self.has_started = true;
        Ok(())
    }

    /// Credit gold, returning the target's new balance.  Targets outside the team get a balance
    /// too, which they keep if they join later.
    pub fn add_gold(
        &mut self,
        caller: &Caller,
        target: PlayerId,
        amount: u64,
    ) -> Result<u64, GameError> {
        self.authorize_admin(caller)?;

        let balance = self.gold.entry(target).or_insert(0);
        *balance = balance.saturating_add(amount);
        Ok(*balance)
    }

    /// Spend `amount` of the target's stat points on `stat`, returning the stat's new value.
    pub fn add_stats(
        &mut self,
        caller: &Caller,
        target: PlayerId,
        stat: &str,
        amount: u32,
    ) -> Result<(Stat, u32), GameError> {
        self.authorize_admin(caller)?;

        let data = self
            .team_data
            .get_mut(&target)
            .ok_or(GameError::PlayerNotFound)?;
        if amount > data.stats.stat_points {
            return Err(GameError::InsufficientStatPoints);
        }
        let stat: Stat = stat.parse()?;

        data.stats.stat_points -= amount;
        let value = data.stats.get_mut(stat);
        *value = value.saturating_add(amount);
        Ok((stat, *value))
    }

    pub fn set_class(
        &mut self,
        caller: &Caller,
        target: PlayerId,
        class: &str,
    ) -> Result<Class, GameError> {
        self.authorize_admin(caller)?;

        let class: Class = class.parse()?;
        let data = self
            .team_data
            .get_mut(&target)
            .ok_or(GameError::PlayerNotFound)?;
        data.class = Some(class);
        Ok(class)
    }

    /// Buy `item` at its catalog price, returning the buyer's remaining gold.
    pub fn buy(&mut self, buyer: PlayerId, item: Item) -> Result<u64, GameError> {
        self.require_active()?;
        if !self.inventory.contains_key(&buyer) {
            return Err(GameError::PlayerNotFound);
        }

        let have = self.gold_of(buyer);
        let remaining = have
            .checked_sub(item.price())
            .ok_or(GameError::InsufficientGold { have })?;

        self.gold.insert(buyer, remaining);
        if let Some(inventory) = self.inventory.get_mut(&buyer) {
            inventory.equip(item);
        }
        Ok(remaining)
    }

    /// Enter the tower from its first stage with the first player to act
    pub fn begin_adventure(&mut self) {
        self.current_stage = 1;
        self.current_turn_index = 0;
    }

    pub fn current_player(&self) -> Option<PlayerId> {
        if self.team.is_empty() {
            return None;
        }
        self.team.get(self.current_turn_index % self.team.len()).copied()
    }

    /// Hand the turn to the next player in join order
    pub fn advance_turn(&mut self) -> Option<PlayerId> {
        if self.team.is_empty() {
            return None;
        }
        self.current_turn_index = (self.current_turn_index % self.team.len() + 1) % self.team.len();
        self.current_player()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn alice() -> Caller {
        Caller::new(UserId::new(1), "alice", false)
    }

    pub(crate) fn bob() -> Caller {
        Caller::new(UserId::new(2), "bob", false)
    }

    pub(crate) fn carol() -> Caller {
        Caller::new(UserId::new(3), "carol", false)
    }

    pub(crate) fn admin() -> Caller {
        Caller::new(UserId::new(99), "mod", true)
    }

    pub(crate) fn open_with(visibility: Visibility, players: &[Caller]) -> Session {
        let mut session = Session::default();
        let (host, rest) = players.split_first().unwrap();
        session.open(host, visibility).unwrap();
        for player in rest {
            session.join(player).unwrap();
        }
        session
    }

    #[test]
    fn open_seeds_host() {
        let session = open_with(Visibility::Private, &[alice()]);

        assert!(session.active);
        assert!(!session.has_started);
        assert_eq!(session.host, Some(alice().id));
        assert_eq!(session.team, vec![alice().id]);
        assert_eq!(session.gold_of(alice().id), 0);
        assert_eq!(session.inventory[&alice().id], Inventory::default());
        assert_eq!(session.team_data[&alice().id].stats, Stats::default());
        assert_eq!(session.team_data[&alice().id].class, None);
    }

    #[test]
    fn every_opened_game_gets_its_own_generation() {
        let first = open_with(Visibility::Public, &[alice()]);
        let second = open_with(Visibility::Public, &[alice()]);

        assert_ne!(first.generation, 0);
        assert_ne!(second.generation, 0);
        assert_ne!(first.generation, second.generation);
        assert_eq!(Session::default().generation, 0);
    }

    #[test]
    fn opening_twice_leaves_session_untouched() {
        let mut session = open_with(Visibility::Public, &[alice(), bob()]);
        let before = session.clone();

        assert_eq!(
            session.open(&carol(), Visibility::Private),
            Err(GameError::AlreadyActive)
        );
        assert_eq!(session, before);
    }

    #[test]
    fn join_preserves_order_and_rejects_duplicates() {
        let mut session = open_with(Visibility::Public, &[alice()]);

        session.join(&carol()).unwrap();
        session.join(&bob()).unwrap();
        assert_eq!(session.join(&carol()), Err(GameError::AlreadyJoined));
        assert_eq!(session.join(&alice()), Err(GameError::AlreadyJoined));

        assert_eq!(session.team, vec![alice().id, carol().id, bob().id]);
    }

    #[test]
    fn join_requires_open_unstarted_session() {
        let mut session = Session::default();
        assert_eq!(session.join(&bob()), Err(GameError::NoActiveSession));

        let mut session = open_with(Visibility::Public, &[alice()]);
        session.start(alice().id).unwrap();
        assert_eq!(session.join(&bob()), Err(GameError::AlreadyStarted));
    }

    #[test]
    fn start_is_host_only_and_once() {
        let mut session = Session::default();
        assert_eq!(session.start(alice().id), Err(GameError::NoActiveSession));

        let mut session = open_with(Visibility::Public, &[alice(), bob()]);
        assert_eq!(session.start(bob().id), Err(GameError::NotHost));
        assert!(!session.has_started);

        session.start(alice().id).unwrap();
        assert!(session.has_started);
        assert_eq!(session.start(alice().id), Err(GameError::AlreadyStarted));
    }

    #[test]
    fn leave_removes_every_trace_of_player() {
        let mut session = open_with(Visibility::Public, &[alice(), bob(), carol()]);

        session.leave(bob().id).unwrap();

        assert_eq!(session.team, vec![alice().id, carol().id]);
        assert!(!session.inventory.contains_key(&bob().id));
        assert!(!session.gold.contains_key(&bob().id));
        assert!(!session.team_data.contains_key(&bob().id));
        assert_eq!(session.leave(bob().id), Err(GameError::PlayerNotFound));
        assert_eq!(session.leave(alice().id), Err(GameError::HostCannotLeave));
    }

    #[test]
    fn gold_admin_follows_visibility() {
        let mut public = open_with(Visibility::Public, &[alice(), bob()]);
        assert_eq!(
            public.add_gold(&alice(), bob().id, 10),
            Err(GameError::UnauthorizedVisibilityAction)
        );
        assert_eq!(public.add_gold(&admin(), bob().id, 10), Ok(10));

        let mut private = open_with(Visibility::Private, &[alice(), bob()]);
        assert_eq!(
            private.add_gold(&admin(), bob().id, 10),
            Err(GameError::UnauthorizedVisibilityAction)
        );
        assert_eq!(private.add_gold(&alice(), bob().id, 10), Ok(10));
        assert_eq!(private.add_gold(&alice(), bob().id, 5), Ok(15));
    }

    #[test]
    fn gold_can_be_granted_before_joining() {
        let mut session = open_with(Visibility::Private, &[alice()]);

        session.add_gold(&alice(), bob().id, 40).unwrap();
        session.join(&bob()).unwrap();

        assert_eq!(session.gold_of(bob().id), 40);
    }

    #[test]
    fn add_gold_needs_active_session() {
        let mut session = Session::default();
        assert_eq!(
            session.add_gold(&admin(), bob().id, 10),
            Err(GameError::NoActiveSession)
        );
    }

    #[test]
    fn failed_purchase_changes_nothing() {
        let mut session = open_with(Visibility::Public, &[alice(), bob()]);
        let before = session.clone();

        assert_eq!(
            session.buy(bob().id, Item::Sword),
            Err(GameError::InsufficientGold { have: 0 })
        );
        assert_eq!(session, before);
    }

    #[test]
    fn purchase_overwrites_slot() {
        let mut session = open_with(Visibility::Public, &[alice()]);
        session.add_gold(&admin(), alice().id, 300).unwrap();

        assert_eq!(session.buy(alice().id, Item::Sword), Ok(200));
        assert_eq!(session.buy(alice().id, Item::Bow), Ok(50));
        assert_eq!(session.buy(alice().id, Item::HealthPotion), Ok(0));

        let inventory = &session.inventory[&alice().id];
        assert_eq!(inventory.weapon, Some(Item::Bow));
        assert_eq!(inventory.armor, None);
        assert_eq!(inventory.potion, Some(Item::HealthPotion));
    }

    #[test]
    fn outsiders_cannot_buy() {
        let mut session = open_with(Visibility::Public, &[alice()]);
        session.add_gold(&admin(), bob().id, 500).unwrap();

        assert_eq!(
            session.buy(bob().id, Item::Sword),
            Err(GameError::PlayerNotFound)
        );
        assert_eq!(session.gold_of(bob().id), 500);
    }

    #[test]
    fn stat_allocation_is_all_or_nothing() {
        let mut session = open_with(Visibility::Public, &[alice(), bob()]);
        let before = session.clone();

        assert_eq!(
            session.add_stats(&admin(), bob().id, "Str", 5),
            Err(GameError::InsufficientStatPoints)
        );
        assert_eq!(session, before);

        assert_eq!(
            session.add_stats(&admin(), bob().id, "str", 1),
            Ok((Stat::Str, 2))
        );
        let stats = &session.team_data[&bob().id].stats;
        assert_eq!(stats.strength, 2);
        assert_eq!(stats.stat_points, 0);

        assert_eq!(
            session.add_stats(&admin(), bob().id, "Str", 1),
            Err(GameError::InsufficientStatPoints)
        );
    }

    #[test]
    fn stat_allocation_rejections() {
        let mut session = open_with(Visibility::Private, &[alice(), bob()]);

        assert_eq!(
            session.add_stats(&bob(), bob().id, "Str", 1),
            Err(GameError::UnauthorizedVisibilityAction)
        );
        assert_eq!(
            session.add_stats(&alice(), carol().id, "Str", 1),
            Err(GameError::PlayerNotFound)
        );
        assert_eq!(
            session.add_stats(&alice(), bob().id, "HP", 1),
            Err(GameError::InvalidStat)
        );
        assert_eq!(session.team_data[&bob().id].stats, Stats::default());
    }

    #[test]
    fn set_class_validates_class_then_player() {
        let mut session = open_with(Visibility::Private, &[alice(), bob()]);

        assert_eq!(
            session.set_class(&alice(), carol().id, "rogue"),
            Err(GameError::InvalidClass)
        );
        assert_eq!(
            session.set_class(&alice(), carol().id, "mage"),
            Err(GameError::PlayerNotFound)
        );
        assert_eq!(session.set_class(&alice(), bob().id, "MAGE"), Ok(Class::Mage));
        assert_eq!(session.team_data[&bob().id].class, Some(Class::Mage));
    }

    #[test]
    fn turn_index_wraps_over_team() {
        let mut session = open_with(Visibility::Public, &[alice(), bob(), carol()]);
        session.begin_adventure();

        let order: Vec<PlayerId> = (0..7).filter_map(|_| session.advance_turn()).collect();
        let ids = [alice().id, bob().id, carol().id];
        let expected: Vec<PlayerId> = (1..8).map(|i| ids[i % 3]).collect();
        assert_eq!(order, expected);
        assert!(session.current_turn_index < session.team.len());
    }

    #[test]
    fn turn_index_survives_shrinking_team() {
        let mut session = open_with(Visibility::Public, &[alice(), bob(), carol()]);
        session.current_turn_index = 2;
        session.leave(carol().id).unwrap();

        // Index 2 over a team of 2 resolves to the host
        assert_eq!(session.current_player(), Some(alice().id));
        assert_eq!(session.advance_turn(), Some(bob().id));
        assert_eq!(session.advance_turn(), Some(alice().id));
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!("PUBLIC".parse::<Visibility>(), Ok(Visibility::Public));
        assert_eq!("private".parse::<Visibility>(), Ok(Visibility::Private));
        assert!("secret".parse::<Visibility>().is_err());
        assert_eq!("dEx".parse::<Stat>(), Ok(Stat::Dex));
        assert_eq!("Priest".parse::<Class>(), Ok(Class::Priest));
    }
}
