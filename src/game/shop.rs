//! Fixed-price item catalog.

use std::fmt;

/// Inventory slot.  Each player holds at most one item per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Weapon,
    Armor,
    Potion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Item {
    Sword,
    Bow,
    Hammer,
    LeatherArmor,
    Chainmail,
    PlateArmor,
    HealthPotion,
    ManaPotion,
    StaminaPotion,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Weapon, Slot::Armor, Slot::Potion];

    pub fn key(self) -> &'static str {
        match self {
            Slot::Weapon => "weapon",
            Slot::Armor => "armor",
            Slot::Potion => "potion",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.key() == key)
    }

    /// Items sold in this slot's shop, in display order.
    pub fn stock(self) -> [Item; 3] {
        match self {
            Slot::Weapon => [Item::Sword, Item::Bow, Item::Hammer],
            Slot::Armor => [Item::LeatherArmor, Item::Chainmail, Item::PlateArmor],
            Slot::Potion => [Item::HealthPotion, Item::ManaPotion, Item::StaminaPotion],
        }
    }

    pub fn shop_title(self) -> &'static str {
        match self {
            Slot::Weapon => "Weapons Shop ⚔️",
            Slot::Armor => "Armor Shop 🛡️",
            Slot::Potion => "Potion Shop 🧪",
        }
    }

    pub fn button_label(self) -> &'static str {
        match self {
            Slot::Weapon => "Weapons",
            Slot::Armor => "Armor",
            Slot::Potion => "Potions",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Slot::Weapon => "Weapon",
            Slot::Armor => "Armor",
            Slot::Potion => "Potion",
        })
    }
}

impl Item {
    pub const ALL: [Item; 9] = [
        Item::Sword,
        Item::Bow,
        Item::Hammer,
        Item::LeatherArmor,
        Item::Chainmail,
        Item::PlateArmor,
        Item::HealthPotion,
        Item::ManaPotion,
        Item::StaminaPotion,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Item::Sword => "Sword",
            Item::Bow => "Bow",
            Item::Hammer => "Hammer",
            Item::LeatherArmor => "Leather Armor",
            Item::Chainmail => "Chainmail",
            Item::PlateArmor => "Plate Armor",
            Item::HealthPotion => "Health Potion",
            Item::ManaPotion => "Mana Potion",
            Item::StaminaPotion => "Stamina Potion",
        }
    }

    /// Price in gold
    pub fn price(self) -> u64 {
        match self {
            Item::Sword => 100,
            Item::Bow => 150,
            Item::Hammer => 200,
            Item::LeatherArmor => 80,
            Item::Chainmail => 120,
            Item::PlateArmor => 250,
            Item::HealthPotion => 50,
            Item::ManaPotion => 60,
            Item::StaminaPotion => 70,
        }
    }

    pub fn slot(self) -> Slot {
        match self {
            Item::Sword | Item::Bow | Item::Hammer => Slot::Weapon,
            Item::LeatherArmor | Item::Chainmail | Item::PlateArmor => Slot::Armor,
            Item::HealthPotion | Item::ManaPotion | Item::StaminaPotion => Slot::Potion,
        }
    }

    /// Stable identifier used inside component ids
    pub fn key(self) -> &'static str {
        match self {
            Item::Sword => "sword",
            Item::Bow => "bow",
            Item::Hammer => "hammer",
            Item::LeatherArmor => "leather",
            Item::Chainmail => "chainmail",
            Item::PlateArmor => "plate",
            Item::HealthPotion => "health",
            Item::ManaPotion => "mana",
            Item::StaminaPotion => "stamina",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.key() == key)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_item_is_stocked_in_its_own_slot() {
        for slot in Slot::ALL {
            for item in slot.stock() {
                assert_eq!(item.slot(), slot, "{item} stocked in {slot} shop");
            }
        }
    }

    #[test]
    fn prices_match_catalog() {
        let prices: Vec<(&str, u64)> = Item::ALL.iter().map(|i| (i.name(), i.price())).collect();
        assert_eq!(
            prices,
            vec![
                ("Sword", 100),
                ("Bow", 150),
                ("Hammer", 200),
                ("Leather Armor", 80),
                ("Chainmail", 120),
                ("Plate Armor", 250),
                ("Health Potion", 50),
                ("Mana Potion", 60),
                ("Stamina Potion", 70),
            ]
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert_eq!(Item::from_key("plate"), Some(Item::PlateArmor));
        assert_eq!(Item::from_key("Plate Armor"), None);
        assert_eq!(Slot::from_key("shield"), None);
    }
}
