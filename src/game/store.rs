use super::{
    error::GameError,
    session::{PlayerId, Session},
};
use serenity::all::GuildId;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

/// Per-server game sessions.
///
/// Each session sits behind its own lock so handlers for different servers never wait on each
/// other.  Lock order is store first, then session; nothing may touch the store while holding a
/// session lock.
#[derive(Default)]
pub struct SessionStore(HashMap<GuildId, Arc<Mutex<Session>>>);

impl SessionStore {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// The server's session, creating an inactive one on first access
    pub fn get_or_create(&mut self, guild_id: GuildId) -> Arc<Mutex<Session>> {
        self.0.entry(guild_id).or_default().clone()
    }

    /// Host-only teardown.  All state for the server is discarded.
    pub async fn end(&mut self, guild_id: GuildId, caller: PlayerId) -> Result<(), GameError> {
        let Some(session) = self.0.get(&guild_id) else {
            return Err(GameError::NoActiveSession);
        };
        session.lock().await.authorize_host(caller)?;

        self.0.remove(&guild_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::session::{
        tests::{alice, bob},
        Visibility,
    };

    fn guild() -> GuildId {
        GuildId::new(7)
    }

    #[tokio::test]
    async fn first_access_creates_inactive_session() {
        let mut store = SessionStore::new();
        let session = store.get_or_create(guild());

        assert_eq!(*session.lock().await, Session::default());
        assert!(Arc::ptr_eq(&session, &store.get_or_create(guild())));
        assert_eq!(store.0.len(), 1);
    }

    #[tokio::test]
    async fn end_is_host_only_and_resets_server() {
        let mut store = SessionStore::new();
        {
            let session = store.get_or_create(guild());
            let mut session = session.lock().await;
            session.open(&alice(), Visibility::Public).unwrap();
            session.join(&bob()).unwrap();
        }

        assert_eq!(store.end(guild(), bob().id).await, Err(GameError::NotHost));
        assert!(store.get_or_create(guild()).lock().await.active);

        store.end(guild(), alice().id).await.unwrap();
        assert_eq!(store.0.len(), 0);
        assert_eq!(*store.get_or_create(guild()).lock().await, Session::default());
    }

    #[tokio::test]
    async fn ending_without_session_is_rejected() {
        let mut store = SessionStore::new();
        assert_eq!(
            store.end(guild(), alice().id).await,
            Err(GameError::NoActiveSession)
        );

        store.get_or_create(guild());
        assert_eq!(
            store.end(guild(), alice().id).await,
            Err(GameError::NoActiveSession)
        );
    }
}
