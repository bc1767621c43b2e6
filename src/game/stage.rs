//! Static tower stages, loaded once from a JSON table keyed by stage number.

use anyhow::{anyhow, Result};
use std::{collections::BTreeMap, path::Path};

/// Only hit points matter to the stage view; other keys such as `name` are ignored.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Monster {
    pub hp: u64,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Stage {
    pub name: String,
    pub monsters: Vec<Monster>,
}

impl Stage {
    /// Combined hit points of every monster in the stage
    pub fn total_hp(&self) -> u64 {
        self.monsters.iter().map(|m| m.hp).sum()
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(transparent)]
pub struct StageTable(BTreeMap<u32, Stage>);

impl StageTable {
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| anyhow!("Could not parse stage table: {}", e))
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            anyhow!(
                "Could not read stage table at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        Self::parse(&contents).map_err(|e| anyhow!("{} (`{}`)", e, path.to_string_lossy()))
    }

    pub fn get(&self, number: u32) -> Option<&Stage> {
        self.0.get(&number)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE: &str = r#"{
        "1": { "name": "Slime Cellar", "monsters": [ { "name": "Slime", "hp": 30 }, { "hp": 45 } ] },
        "2": { "name": "Goblin Hall", "monsters": [ { "name": "Goblin", "hp": 80 } ] }
    }"#;

    #[test]
    fn parses_numeric_keys_and_sums_hp() {
        let table = StageTable::parse(SAMPLE).unwrap();
        assert_eq!(table.len(), 2);

        let first = table.get(1).unwrap();
        assert_eq!(first.name, "Slime Cellar");
        assert_eq!(first.total_hp(), 75);
        assert_eq!(first.monsters.len(), 2);

        assert!(table.get(3).is_none());
    }

    #[test]
    fn rejects_malformed_table() {
        assert!(StageTable::parse(r#"{ "one": { "name": "x", "monsters": [] } }"#).is_err());
        assert!(StageTable::parse(r#"{ "1": { "name": "x" } }"#).is_err());
    }
}
