use serde::{Deserialize, Serialize};

/// Item categories as the engine encodes them (one bit per category).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Food = 1 << 0,
    Weapon = 1 << 1,
    Armor = 1 << 2,
    Potion = 1 << 3,
    Scroll = 1 << 4,
    Staff = 1 << 5,
    Wand = 1 << 6,
    Ring = 1 << 7,
    Charm = 1 << 8,
    Gold = 1 << 9,
    Amulet = 1 << 10,
    Gem = 1 << 11,
    Key = 1 << 12,
}

impl ItemCategory {
    pub fn all() -> [ItemCategory; 13] {
        [
            ItemCategory::Food,
            ItemCategory::Weapon,
            ItemCategory::Armor,
            ItemCategory::Potion,
            ItemCategory::Scroll,
            ItemCategory::Staff,
            ItemCategory::Wand,
            ItemCategory::Ring,
            ItemCategory::Charm,
            ItemCategory::Gold,
            ItemCategory::Amulet,
            ItemCategory::Gem,
            ItemCategory::Key,
        ]
    }

    /// Decode the engine's category bit. Zero (an empty slot) and
    /// combined bits decode to `None`.
    pub fn from_code(code: u16) -> Option<ItemCategory> {
        Self::all().into_iter().find(|c| *c as u16 == code)
    }

    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Returns the display name for this category.
    pub fn name(&self) -> &'static str {
        match self {
            ItemCategory::Food => "Food",
            ItemCategory::Weapon => "Weapon",
            ItemCategory::Armor => "Armor",
            ItemCategory::Potion => "Potion",
            ItemCategory::Scroll => "Scroll",
            ItemCategory::Staff => "Staff",
            ItemCategory::Wand => "Wand",
            ItemCategory::Ring => "Ring",
            ItemCategory::Charm => "Charm",
            ItemCategory::Gold => "Gold",
            ItemCategory::Amulet => "Amulet",
            ItemCategory::Gem => "Gem",
            ItemCategory::Key => "Key",
        }
    }

    /// Categories with one kind only report the category name as the kind.
    pub fn is_single_kind(&self) -> bool {
        matches!(
            self,
            ItemCategory::Food
                | ItemCategory::Gold
                | ItemCategory::Amulet
                | ItemCategory::Gem
                | ItemCategory::Key
        )
    }
}
