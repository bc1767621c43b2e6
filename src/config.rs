use anyhow::{anyhow, Result};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

const CONFIG_PATH_REL_HOME: &str = ".config/yuukibot/config.toml";

/// Bot configuration
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Config {
    pub general: General,
    pub game: Game,
    #[serde(default)]
    pub heartbeat: Heartbeat,
    #[serde(default)]
    pub giveaway: Giveaway,
    #[serde(default)]
    pub moderation: Moderation,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct General {
    pub discord_token: String,
    pub bot_owners: Vec<String>,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct Game {
    /// JSON stage table.  Relative paths are resolved against the configuration directory.
    pub stages_path: PathBuf,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct Heartbeat {
    pub interval_seconds: u64,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct Giveaway {
    pub min_duration_seconds: u64,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct Moderation {
    /// Most messages a single purge may delete
    pub purge_limit: u8,
}

fn default_command_prefix() -> String {
    ".".to_owned()
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self {
            interval_seconds: 900,
        }
    }
}

impl Default for Giveaway {
    fn default() -> Self {
        Self {
            min_duration_seconds: 30,
        }
    }
}

impl Default for Moderation {
    fn default() -> Self {
        Self { purge_limit: 100 }
    }
}

impl Config {
    fn config_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|p| p.join(CONFIG_PATH_REL_HOME))
            .ok_or(anyhow!("Could not find home directory"))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| anyhow!("{}", e))
    }

    pub async fn load() -> Result<Self> {
        let path = Self::config_path()?;

        let mut file = tokio::fs::File::open(&path).await.map_err(|e| {
            anyhow!(
                "Could not open configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).await.map_err(|e| {
            anyhow!(
                "Could not read configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        let mut config = Self::parse(&contents).map_err(|e| {
            anyhow!(
                "Could not parse configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        if config.game.stages_path.is_relative() {
            if let Some(dir) = path.parent() {
                config.game.stages_path = dir.join(&config.game.stages_path);
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let config = Config::parse(
            r#"
            [general]
            discord_token = "token"
            bot_owners = ["owner"]

            [game]
            stages_path = "stages.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.general.command_prefix, ".");
        assert_eq!(config.heartbeat.interval_seconds, 900);
        assert_eq!(config.giveaway.min_duration_seconds, 30);
        assert_eq!(config.moderation.purge_limit, 100);
    }

    #[test]
    fn missing_game_section_is_an_error() {
        let parsed = Config::parse(
            r#"
            [general]
            discord_token = "token"
            bot_owners = []
            "#,
        );
        assert!(parsed.is_err());
    }
}
