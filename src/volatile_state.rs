use crate::game::SessionStore;
use serenity::all::{MessageId, UserId};
use std::collections::{HashMap, HashSet};

/// State which is lost across sessions
pub struct VolatileState {
    pub games: SessionStore,
    pub giveaways: Giveaways,
    /// Set once the heartbeat loop is running, so reconnects don't start a second one
    pub heartbeat_running: bool,
}

/// Entrants of running giveaways, keyed by the giveaway message
pub struct Giveaways(HashMap<MessageId, HashSet<UserId>>);

#[derive(Debug, PartialEq, Eq)]
pub enum Entry {
    Joined,
    AlreadyJoined,
    /// The giveaway is over or never existed
    Closed,
}

impl VolatileState {
    pub async fn new() -> Self {
        Self {
            games: SessionStore::new(),
            giveaways: Giveaways::new(),
            heartbeat_running: false,
        }
    }
}

impl Giveaways {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn open(&mut self, message_id: MessageId) {
        self.0.entry(message_id).or_default();
    }

    pub fn enter(&mut self, message_id: MessageId, user_id: UserId) -> Entry {
        match self.0.get_mut(&message_id) {
            None => Entry::Closed,
            Some(entrants) => {
                if entrants.insert(user_id) {
                    Entry::Joined
                } else {
                    Entry::AlreadyJoined
                }
            }
        }
    }

    /// Stop accepting entries, returning everyone who got in
    pub fn close(&mut self, message_id: MessageId) -> HashSet<UserId> {
        self.0.remove(&message_id).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entering_a_giveaway() {
        let mut giveaways = Giveaways::new();
        let msg = MessageId::new(1);
        let user = UserId::new(2);

        assert_eq!(giveaways.enter(msg, user), Entry::Closed);

        giveaways.open(msg);
        assert_eq!(giveaways.enter(msg, user), Entry::Joined);
        assert_eq!(giveaways.enter(msg, user), Entry::AlreadyJoined);
        assert_eq!(giveaways.enter(msg, UserId::new(3)), Entry::Joined);

        let entrants = giveaways.close(msg);
        assert_eq!(entrants.len(), 2);
        assert_eq!(giveaways.enter(msg, user), Entry::Closed);
        assert!(giveaways.close(msg).is_empty());
    }
}
