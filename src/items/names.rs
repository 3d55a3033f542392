//! Display names for item kinds, indexed by the engine's kind number.

use super::types::ItemCategory;

pub const UNKNOWN: &str = "Unknown";
pub const NO_DESCRIPTION: &str = "No description available";

const WEAPON_KINDS: &[&str] = &[
    "Dagger",
    "Sword",
    "Broadsword",
    "Whip",
    "Rapier",
    "Flail",
    "Mace",
    "Hammer",
    "Spear",
    "Pike",
    "Axe",
    "War Axe",
    "Dart",
    "Incendiary Dart",
    "Javelin",
];

const ARMOR_KINDS: &[&str] = &[
    "Leather Armor",
    "Scale Mail",
    "Chain Mail",
    "Banded Mail",
    "Splint Mail",
    "Plate Mail",
];

const RING_KINDS: &[&str] = &[
    "Clairvoyance",
    "Stealth",
    "Regeneration",
    "Transference",
    "Light",
    "Awareness",
    "Wisdom",
    "Reaping",
];

const POTION_KINDS: &[&str] = &[
    "Life",
    "Strength",
    "Telepathy",
    "Levitation",
    "Detect Magic",
    "Haste Self",
    "Fire Immunity",
    "Invisibility",
    "Poison",
    "Paralysis",
    "Hallucination",
    "Confusion",
    "Incineration",
    "Darkness",
    "Descent",
    "Lichen",
];

const SCROLL_KINDS: &[&str] = &[
    "Enchanting",
    "Identify",
    "Teleport",
    "Remove Curse",
    "Recharging",
    "Protect Armor",
    "Protect Weapon",
    "Sanctuary",
    "Magic Mapping",
    "Negation",
    "Shattering",
    "Discord",
    "Aggravate Monster",
    "Summon Monster",
];

const STAFF_KINDS: &[&str] = &[
    "Lightning",
    "Fire",
    "Poison",
    "Tunneling",
    "Blinking",
    "Entrancement",
    "Obstruction",
    "Discord",
    "Conjuration",
    "Healing",
    "Haste",
    "Protection",
];

const WAND_KINDS: &[&str] = &[
    "Teleport",
    "Slow",
    "Polymorph",
    "Negation",
    "Domination",
    "Beckoning",
    "Plenty",
    "Invisibility",
    "Empowerment",
];

const CHARM_KINDS: &[&str] = &[
    "Health",
    "Protection",
    "Haste",
    "Fire Immunity",
    "Invisibility",
    "Telepathy",
    "Levitation",
    "Shattering",
    "Guardian",
    "Teleportation",
    "Recharging",
    "Negation",
];

const WEAPON_RUNICS: &[&str] = &[
    "Speed",
    "Quietus",
    "Paralysis",
    "Multiplicity",
    "Slowing",
    "Confusion",
    "Force",
    "Slaying",
    "Mercy",
    "Plenty",
];

const ARMOR_RUNICS: &[&str] = &[
    "Multiplicity",
    "Mutuality",
    "Absorption",
    "Reprisal",
    "Immunity",
    "Reflection",
    "Respiration",
    "Dampening",
    "Burden",
    "Vulnerability",
    "Immolation",
];

fn lookup(table: &'static [&'static str], kind: i16) -> &'static str {
    usize::try_from(kind)
        .ok()
        .and_then(|i| table.get(i).copied())
        .unwrap_or(UNKNOWN)
}

/// Name of an item kind within its category.
///
/// Single-kind categories (food, gold, amulet, gem, key) report the category
/// name. Out-of-range kinds and unknown categories report `"Unknown"`.
pub fn kind_name(category: Option<ItemCategory>, kind: i16) -> &'static str {
    let Some(category) = category else {
        return UNKNOWN;
    };
    match category {
        ItemCategory::Weapon => lookup(WEAPON_KINDS, kind),
        ItemCategory::Armor => lookup(ARMOR_KINDS, kind),
        ItemCategory::Ring => lookup(RING_KINDS, kind),
        ItemCategory::Potion => lookup(POTION_KINDS, kind),
        ItemCategory::Scroll => lookup(SCROLL_KINDS, kind),
        ItemCategory::Staff => lookup(STAFF_KINDS, kind),
        ItemCategory::Wand => lookup(WAND_KINDS, kind),
        ItemCategory::Charm => lookup(CHARM_KINDS, kind),
        single => single.name(),
    }
}

pub fn category_name(category: Option<ItemCategory>) -> &'static str {
    category.map(|c| c.name()).unwrap_or(UNKNOWN)
}

pub fn weapon_runic_name(enchant: i16) -> &'static str {
    lookup(WEAPON_RUNICS, enchant)
}

pub fn armor_runic_name(enchant: i16) -> &'static str {
    lookup(ARMOR_RUNICS, enchant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weapon_kinds() {
        assert_eq!(kind_name(Some(ItemCategory::Weapon), 0), "Dagger");
        assert_eq!(kind_name(Some(ItemCategory::Weapon), 11), "War Axe");
        assert_eq!(kind_name(Some(ItemCategory::Weapon), 14), "Javelin");
    }

    #[test]
    fn test_out_of_range_kind_is_unknown() {
        assert_eq!(kind_name(Some(ItemCategory::Armor), 6), UNKNOWN);
        assert_eq!(kind_name(Some(ItemCategory::Ring), -1), UNKNOWN);
    }

    #[test]
    fn test_single_kind_category_uses_category_name() {
        assert_eq!(kind_name(Some(ItemCategory::Gold), 0), "Gold");
        assert_eq!(kind_name(Some(ItemCategory::Food), 1), "Food");
    }

    #[test]
    fn test_missing_category_is_unknown() {
        assert_eq!(kind_name(None, 0), UNKNOWN);
        assert_eq!(category_name(None), UNKNOWN);
    }

    #[test]
    fn test_runic_names() {
        assert_eq!(weapon_runic_name(7), "Slaying");
        assert_eq!(armor_runic_name(10), "Immolation");
        assert_eq!(armor_runic_name(11), UNKNOWN);
    }
}
