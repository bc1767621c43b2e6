use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serenity::all::{ChannelId, GuildId, RoleId, UserId};
use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};
use tokio::io::AsyncReadExt;

const PSTATE_PATH_REL_HOME: &str = ".config/yuukibot/state.toml";

/// State which persists across sessions
#[derive(Default, Clone, serde::Serialize, serde::Deserialize)]
pub struct PersistentState {
    /// Keyed by guild id.  TOML tables need string keys.
    #[serde(default)]
    pub guilds: HashMap<String, GuildState>,
}

#[derive(Default, Clone, serde::Serialize, serde::Deserialize)]
pub struct GuildState {
    #[serde(default)]
    pub channels: ChannelConfig,
    #[serde(default)]
    pub autoroles: Vec<RoleId>,
    /// Append-only, oldest first
    #[serde(default)]
    pub infractions: Vec<Infraction>,
}

/// Channels a guild has assigned to bot features
#[derive(Default, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChannelConfig {
    pub welcome: Option<ChannelId>,
    pub rules: Option<ChannelId>,
    pub heartbeat: Option<ChannelId>,
    pub role: Option<ChannelId>,
    pub introduction: Option<ChannelId>,
    pub log: Option<ChannelId>,
    pub list: Option<ChannelId>,
    pub goodbye: Option<ChannelId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Welcome,
    Rules,
    Heartbeat,
    Role,
    Introduction,
    /// Plain-text moderation log
    Log,
    /// Infraction embeds
    List,
    Goodbye,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Set,
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum InfractionAction {
    Warned,
    Kicked,
    Banned,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Infraction {
    pub user_id: UserId,
    pub moderator_id: UserId,
    pub action: InfractionAction,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub duration: Option<String>,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 8] = [
        ChannelKind::Welcome,
        ChannelKind::Rules,
        ChannelKind::Heartbeat,
        ChannelKind::Role,
        ChannelKind::Introduction,
        ChannelKind::Log,
        ChannelKind::List,
        ChannelKind::Goodbye,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ChannelKind::Welcome => "welcome",
            ChannelKind::Rules => "rules",
            ChannelKind::Heartbeat => "heartbeat",
            ChannelKind::Role => "role",
            ChannelKind::Introduction => "introduction",
            ChannelKind::Log => "log",
            ChannelKind::List => "list",
            ChannelKind::Goodbye => "goodbye",
        }
    }
}

impl FromStr for ChannelKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_ascii_lowercase();
        Self::ALL.into_iter().find(|k| k.key() == s).ok_or(())
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let key = self.key();
        write!(f, "{}{}", key[..1].to_ascii_uppercase(), &key[1..])
    }
}

impl fmt::Display for InfractionAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            InfractionAction::Warned => "Warned",
            InfractionAction::Kicked => "Kicked",
            InfractionAction::Banned => "Banned",
            InfractionAction::Muted => "Muted",
        })
    }
}

impl ChannelConfig {
    pub fn get(&self, kind: ChannelKind) -> Option<ChannelId> {
        *self.slot(kind)
    }

    fn slot(&self, kind: ChannelKind) -> &Option<ChannelId> {
        match kind {
            ChannelKind::Welcome => &self.welcome,
            ChannelKind::Rules => &self.rules,
            ChannelKind::Heartbeat => &self.heartbeat,
            ChannelKind::Role => &self.role,
            ChannelKind::Introduction => &self.introduction,
            ChannelKind::Log => &self.log,
            ChannelKind::List => &self.list,
            ChannelKind::Goodbye => &self.goodbye,
        }
    }

    fn slot_mut(&mut self, kind: ChannelKind) -> &mut Option<ChannelId> {
        match kind {
            ChannelKind::Welcome => &mut self.welcome,
            ChannelKind::Rules => &mut self.rules,
            ChannelKind::Heartbeat => &mut self.heartbeat,
            ChannelKind::Role => &mut self.role,
            ChannelKind::Introduction => &mut self.introduction,
            ChannelKind::Log => &mut self.log,
            ChannelKind::List => &mut self.list,
            ChannelKind::Goodbye => &mut self.goodbye,
        }
    }

    /// Assign `channel` to `kind`, or clear the assignment if it is already that channel.
    pub fn toggle(&mut self, kind: ChannelKind, channel: ChannelId) -> Toggled {
        let slot = self.slot_mut(kind);
        if *slot == Some(channel) {
            *slot = None;
            Toggled::Cleared
        } else {
            *slot = Some(channel);
            Toggled::Set
        }
    }
}

impl GuildState {
    /// Newest first
    pub fn infractions_for(&self, user_id: UserId) -> Vec<&Infraction> {
        let mut records: Vec<&Infraction> = self
            .infractions
            .iter()
            .filter(|i| i.user_id == user_id)
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }

    /// Returns how many records were removed
    pub fn clear_infractions(&mut self, user_id: UserId) -> usize {
        let before = self.infractions.len();
        self.infractions.retain(|i| i.user_id != user_id);
        before - self.infractions.len()
    }

    /// Returns false if the role was already listed
    pub fn add_autorole(&mut self, role_id: RoleId) -> bool {
        if self.autoroles.contains(&role_id) {
            return false;
        }
        self.autoroles.push(role_id);
        true
    }

    /// Returns false if the role was not listed
    pub fn remove_autorole(&mut self, role_id: RoleId) -> bool {
        let before = self.autoroles.len();
        self.autoroles.retain(|&r| r != role_id);
        before != self.autoroles.len()
    }
}

impl PersistentState {
    fn config_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|p| p.join(PSTATE_PATH_REL_HOME))
            .ok_or(anyhow!("Could not find home directory"))
    }

    pub fn guild(&self, guild_id: GuildId) -> Option<&GuildState> {
        self.guilds.get(&guild_id.to_string())
    }

    pub fn guild_mut(&mut self, guild_id: GuildId) -> &mut GuildState {
        self.guilds.entry(guild_id.to_string()).or_default()
    }

    pub fn channel(&self, guild_id: GuildId, kind: ChannelKind) -> Option<ChannelId> {
        self.guild(guild_id).and_then(|g| g.channels.get(kind))
    }

    /// Load state from disk.  A missing file is a fresh install, not an error.
    pub async fn load() -> Result<Self> {
        let path = Self::config_path()?;

        let mut file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(anyhow!(
                    "Could not open state at `{}`: {}",
                    path.to_string_lossy(),
                    e
                ))
            }
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents).await.map_err(|e| {
            anyhow!(
                "Could not read state at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        let pstate: PersistentState = toml::from_str(&contents).map_err(|e| {
            anyhow!(
                "Could not parse state at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        Ok(pstate)
    }

    /// Apply `change` and write the result to disk.  The change only takes effect in memory once
    /// the write succeeded.
    pub async fn update<T>(&mut self, change: impl FnOnce(&mut Self) -> T) -> Result<T> {
        let path = Self::config_path()?;
        self.update_at(&path, change).await
    }

    async fn update_at<T>(
        &mut self,
        path: &Path,
        change: impl FnOnce(&mut Self) -> T,
    ) -> Result<T> {
        let mut next = self.clone();
        let result = change(&mut next);
        next.save_to(path).await?;
        *self = next;
        Ok(result)
    }

    async fn save_to(&self, path: &Path) -> Result<()> {
        let pstate_str = toml::to_string_pretty(&self)
            .map_err(|e| anyhow!("Could not serialize state: {}", e))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                anyhow!(
                    "Could not create directory `{}`: {}",
                    parent.to_string_lossy(),
                    e
                )
            })?;
        }

        // Write next to the target, then rename over it, so a crash never leaves half a file.
        let tmp_path = path.with_extension("toml.new");

        tokio::fs::write(&tmp_path, pstate_str).await.map_err(|e| {
            anyhow!(
                "Could not write state to temporary file `{}`: {}",
                tmp_path.to_string_lossy(),
                e
            )
        })?;

        tokio::fs::rename(&tmp_path, path).await.map_err(|e| {
            anyhow!(
                "Could not rename temporary file `{}` to `{}`: {}",
                tmp_path.to_string_lossy(),
                path.to_string_lossy(),
                e
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn infraction(user: u64, action: InfractionAction, at: i64) -> Infraction {
        Infraction {
            user_id: UserId::new(user),
            moderator_id: UserId::new(900),
            action,
            reason: "No reason provided".to_owned(),
            timestamp: Utc.timestamp_opt(at, 0).unwrap(),
            duration: None,
        }
    }

    #[test]
    fn setting_the_same_channel_twice_clears_it() {
        let mut channels = ChannelConfig::default();
        let general = ChannelId::new(10);
        let other = ChannelId::new(11);

        assert_eq!(channels.toggle(ChannelKind::Welcome, general), Toggled::Set);
        assert_eq!(channels.get(ChannelKind::Welcome), Some(general));
        assert_eq!(channels.toggle(ChannelKind::Welcome, other), Toggled::Set);
        assert_eq!(channels.get(ChannelKind::Welcome), Some(other));
        assert_eq!(
            channels.toggle(ChannelKind::Welcome, other),
            Toggled::Cleared
        );
        assert_eq!(channels.get(ChannelKind::Welcome), None);
        assert_eq!(channels, ChannelConfig::default());
    }

    #[test]
    fn channel_kinds_parse_from_command_words() {
        assert_eq!("Goodbye".parse(), Ok(ChannelKind::Goodbye));
        assert_eq!("list".parse(), Ok(ChannelKind::List));
        assert_eq!("lobby".parse::<ChannelKind>(), Err(()));
        assert_eq!(ChannelKind::Introduction.to_string(), "Introduction");
    }

    #[test]
    fn infractions_are_per_user_newest_first() {
        let mut guild = GuildState::default();
        guild.infractions.push(infraction(1, InfractionAction::Warned, 100));
        guild.infractions.push(infraction(2, InfractionAction::Kicked, 150));
        guild.infractions.push(infraction(1, InfractionAction::Muted, 200));

        let actions: Vec<InfractionAction> = guild
            .infractions_for(UserId::new(1))
            .iter()
            .map(|i| i.action)
            .collect();
        assert_eq!(
            actions,
            vec![InfractionAction::Muted, InfractionAction::Warned]
        );

        assert_eq!(guild.clear_infractions(UserId::new(1)), 2);
        assert_eq!(guild.infractions.len(), 1);
        assert!(guild.infractions_for(UserId::new(1)).is_empty());
    }

    #[test]
    fn autoroles_are_a_set() {
        let mut guild = GuildState::default();
        assert!(guild.add_autorole(RoleId::new(5)));
        assert!(!guild.add_autorole(RoleId::new(5)));
        assert_eq!(guild.autoroles, vec![RoleId::new(5)]);
        assert!(guild.remove_autorole(RoleId::new(5)));
        assert!(!guild.remove_autorole(RoleId::new(5)));
    }

    #[test]
    fn state_survives_toml() {
        let mut state = PersistentState::default();
        let guild = state.guild_mut(GuildId::new(42));
        guild.channels.toggle(ChannelKind::Log, ChannelId::new(7));
        guild.add_autorole(RoleId::new(8));
        guild
            .infractions
            .push(infraction(3, InfractionAction::Banned, 1_700_000_000));

        let text = toml::to_string_pretty(&state).unwrap();
        let back: PersistentState = toml::from_str(&text).unwrap();

        assert_eq!(
            back.channel(GuildId::new(42), ChannelKind::Log),
            Some(ChannelId::new(7))
        );
        let guild = back.guild(GuildId::new(42)).unwrap();
        assert_eq!(guild.autoroles, vec![RoleId::new(8)]);
        assert_eq!(guild.infractions, state.guilds["42"].infractions);
    }

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("yuukibot-{}-{}", name, std::process::id()))
    }

    #[tokio::test]
    async fn failed_write_leaves_state_untouched() {
        // A file where the state directory should be makes the write fail
        let blocker = scratch_dir("blocked");
        tokio::fs::write(&blocker, "").await.unwrap();
        let path = blocker.join("state.toml");

        let mut state = PersistentState::default();
        let result = state
            .update_at(&path, |s| {
                s.guild_mut(GuildId::new(1))
                    .channels
                    .toggle(ChannelKind::Rules, ChannelId::new(2))
            })
            .await;

        assert!(result.is_err());
        assert!(state.guild(GuildId::new(1)).is_none());
        tokio::fs::remove_file(&blocker).await.unwrap();
    }

    #[tokio::test]
    async fn successful_write_commits_and_persists() {
        let dir = scratch_dir("commit");
        let path = dir.join("state.toml");

        let mut state = PersistentState::default();
        let toggled = state
            .update_at(&path, |s| {
                s.guild_mut(GuildId::new(1))
                    .channels
                    .toggle(ChannelKind::Rules, ChannelId::new(2))
            })
            .await
            .unwrap();

        assert_eq!(toggled, Toggled::Set);
        assert_eq!(
            state.channel(GuildId::new(1), ChannelKind::Rules),
            Some(ChannelId::new(2))
        );
        let on_disk: PersistentState =
            toml::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
        assert_eq!(
            on_disk.channel(GuildId::new(1), ChannelKind::Rules),
            Some(ChannelId::new(2))
        );
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
