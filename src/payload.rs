//! JSON bodies posted to the portal.
//!
//! Each struct mirrors what one collector endpoint parses. Field names are
//! the wire names; conversions from snapshots live next to the struct.

use crate::items::{self, names, ItemCategory};
use crate::snapshot::{
    DamageRange, EquippedItems, GameSnapshot, GameStateSnapshot, GameStats, ItemSnapshot,
    MonsterSnapshot, PlayerSnapshot, Position, RingBonuses,
};
use serde::Serialize;

/// Body of `/player/update` and `/player/death`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerPayload {
    pub gold: i32,
    pub depth_level: i32,
    pub deepest_level: i32,
    pub current_hp: i32,
    pub max_hp: i32,
    pub strength: i32,
    pub player_turn_number: i64,
    pub xpxp_this_turn: i32,
    pub stealth_range: i32,
    /// Sent as 0/1
    pub disturbed: u8,
    pub regen_per_turn: i32,
    pub weakness_amount: i32,
    pub poison_amount: i32,
    #[serde(flatten)]
    pub rings: RingBonuses,
}

impl From<&PlayerSnapshot> for PlayerPayload {
    fn from(p: &PlayerSnapshot) -> Self {
        Self {
            gold: p.gold,
            depth_level: p.depth_level,
            deepest_level: p.deepest_level,
            current_hp: p.current_hp,
            max_hp: p.max_hp,
            strength: p.strength,
            player_turn_number: p.player_turn_number,
            xpxp_this_turn: p.xpxp_this_turn,
            stealth_range: p.stealth_range,
            disturbed: u8::from(p.disturbed),
            regen_per_turn: p.regen_per_turn,
            weakness_amount: p.weakness_amount,
            poison_amount: p.poison_amount,
            rings: p.rings,
        }
    }
}

/// One entry of the `/monsters/update` array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterPayload {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub monster_type: String,
    pub hp: i32,
    #[serde(rename = "maxHP")]
    pub max_hp: i32,
    pub depth: i32,
    pub position: Position,
    pub attack_speed: i32,
    pub movement_speed: i32,
    pub accuracy: i32,
    pub defense: i32,
    pub damage_min: i32,
    pub damage_max: i32,
    pub turns_between_regen: i64,
    pub is_dead: bool,
}

impl From<&MonsterSnapshot> for MonsterPayload {
    fn from(m: &MonsterSnapshot) -> Self {
        Self {
            id: m.id,
            name: m.portal_name.clone(),
            monster_type: m.type_name.clone(),
            hp: m.hp,
            max_hp: m.max_hp,
            depth: m.spawn_depth,
            position: m.position,
            attack_speed: m.attack_speed,
            movement_speed: m.movement_speed,
            accuracy: m.accuracy,
            defense: m.defense,
            damage_min: m.damage.min,
            damage_max: m.damage.max,
            turns_between_regen: m.turns_between_regen,
            is_dead: m.is_dead || m.has_died,
        }
    }
}

/// Body of `/monsters/death`. The id travels as a string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonsterDeathPayload {
    pub id: String,
}

impl MonsterDeathPayload {
    pub fn new(id: i32) -> Self {
        Self { id: id.to_string() }
    }
}

/// An item as the collector's item model reads it, used both for equipped
/// slots and pack entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    pub category: &'static str,
    pub kind: &'static str,
    /// Same as `kind`; the pack endpoint validates on `name`
    pub name: &'static str,
    pub quantity: i16,
    pub inscription: String,
    pub damage: DamageRange,
    pub armor: i16,
    pub charges: i16,
    pub times_enchanted: i16,
    pub strength_required: i16,
    pub inventory_letter: String,
    pub origin_depth: i16,
    pub enchant1: String,
    pub enchant2: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runic: Option<&'static str>,
    pub description: String,
}

impl ItemPayload {
    /// An empty equipment slot serializes as a zeroed item.
    pub fn empty() -> Self {
        Self::from(&ItemSnapshot::default())
    }
}

impl From<&ItemSnapshot> for ItemPayload {
    fn from(item: &ItemSnapshot) -> Self {
        let category = ItemCategory::from_code(item.category);
        let kind = items::kind_name(category, item.kind);
        let runic = item.runic.and_then(|r| match category {
            Some(ItemCategory::Weapon) => Some(names::weapon_runic_name(r)),
            Some(ItemCategory::Armor) => Some(names::armor_runic_name(r)),
            _ => None,
        });
        Self {
            category: items::category_name(category),
            kind,
            name: kind,
            quantity: item.quantity,
            inscription: item.inscription.clone(),
            damage: item.damage,
            armor: item.armor,
            charges: item.charges,
            times_enchanted: item.times_enchanted,
            strength_required: item.strength_required,
            inventory_letter: item.inventory_letter.map(String::from).unwrap_or_default(),
            origin_depth: item.origin_depth,
            enchant1: item.enchant1.to_string(),
            enchant2: item.enchant2.to_string(),
            runic,
            description: item
                .description
                .clone()
                .unwrap_or_else(|| items::NO_DESCRIPTION.to_string()),
        }
    }
}

/// Body of `/items/update`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquippedItemsPayload {
    pub weapon: ItemPayload,
    pub armor: ItemPayload,
    pub left_ring: ItemPayload,
    pub right_ring: ItemPayload,
}

impl From<&EquippedItems> for EquippedItemsPayload {
    fn from(e: &EquippedItems) -> Self {
        let slot = |item: &Option<ItemSnapshot>| {
            item.as_ref()
                .map(ItemPayload::from)
                .unwrap_or_else(ItemPayload::empty)
        };
        Self {
            weapon: slot(&e.weapon),
            armor: slot(&e.armor),
            left_ring: slot(&e.left_ring),
            right_ring: slot(&e.right_ring),
        }
    }
}

/// Body of `/pack/update`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackPayload {
    pub pack: Vec<ItemPayload>,
}

impl PackPayload {
    /// Items without an inventory letter are not in the pack proper
    /// (e.g. gold being picked up) and are left out.
    pub fn from_items(items: &[ItemSnapshot]) -> Self {
        Self {
            pack: items
                .iter()
                .filter(|item| item.inventory_letter.is_some())
                .map(ItemPayload::from)
                .collect(),
        }
    }
}

/// Body of `/gamestate/update`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatePayload {
    pub wizard: bool,
    pub reward_rooms_generated: i32,
    pub gold_generated: i32,
    pub current_depth: i32,
    pub deepest_level: i32,
    pub game_in_progress: bool,
    pub game_has_ended: bool,
    pub easy_mode: bool,
    pub seed: u64,
    #[serde(rename = "RNG")]
    pub rng: i32,
    pub absolute_turn_number: i64,
    pub milliseconds: i64,
    pub monster_spawn_fuse: i32,
    pub turns: i64,
}

impl From<&GameStateSnapshot> for GameStatePayload {
    fn from(s: &GameStateSnapshot) -> Self {
        Self {
            wizard: s.wizard,
            reward_rooms_generated: s.reward_rooms_generated,
            gold_generated: s.gold_generated,
            current_depth: s.current_depth,
            deepest_level: s.deepest_level,
            game_in_progress: s.game_in_progress,
            game_has_ended: s.game_has_ended,
            easy_mode: s.easy_mode,
            seed: s.seed,
            rng: s.rng,
            absolute_turn_number: s.absolute_turn_number,
            milliseconds: s.milliseconds,
            monster_spawn_fuse: s.monster_spawn_fuse,
            turns: s.absolute_turn_number,
        }
    }
}

/// Body of `/gamestats/update`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatsPayload {
    pub games: u32,
    pub escaped: u32,
    pub mastered: u32,
    pub won: u32,
    /// Percentage rounded to two decimals
    pub win_rate: f64,
    pub deepest_level: u32,
    pub cumulative_levels: u64,
    pub highest_score: u64,
    pub cumulative_score: u64,
    pub most_gold: u64,
    pub cumulative_gold: u64,
    pub most_lumenstones: u32,
    pub cumulative_lumenstones: u64,
    pub fewest_turns_win: u64,
    pub cumulative_turns: u64,
    pub longest_win_streak: u32,
    pub longest_mastery_streak: u32,
    pub current_win_streak: u32,
    pub current_mastery_streak: u32,
}

impl From<&GameStats> for GameStatsPayload {
    fn from(s: &GameStats) -> Self {
        Self {
            games: s.games,
            escaped: s.escaped,
            mastered: s.mastered,
            won: s.won,
            win_rate: (f64::from(s.win_rate) * 100.0).round() / 100.0,
            deepest_level: s.deepest_level,
            cumulative_levels: s.cumulative_levels,
            highest_score: s.highest_score,
            cumulative_score: s.cumulative_score,
            most_gold: s.most_gold,
            cumulative_gold: s.cumulative_gold,
            most_lumenstones: s.most_lumenstones,
            cumulative_lumenstones: s.cumulative_lumenstones,
            fewest_turns_win: s.fewest_turns_win,
            cumulative_turns: s.cumulative_turns,
            longest_win_streak: s.longest_win_streak,
            longest_mastery_streak: s.longest_mastery_streak,
            current_win_streak: s.current_win_streak,
            current_mastery_streak: s.current_mastery_streak,
        }
    }
}

/// Body of the flat `/metrics` push: player and game state in one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatMetricsPayload {
    pub gold: i32,
    pub gold_generated: i32,
    pub depth_level: i32,
    pub deepest_level: i32,
    pub hp: i32,
    pub turns: i64,
    pub strength: i32,
    pub monster_spawn_fuse: i32,
    pub player_turn_number: i64,
    pub absolute_turn_number: i64,
    pub milliseconds: i64,
    pub xpxp_this_turn: i32,
    pub stealth_range: i32,
    pub reward_rooms_generated: i32,
    pub wizard: bool,
    pub disturbed: bool,
    pub game_in_progress: bool,
    pub game_has_ended: bool,
    pub easy_mode: bool,
    pub seed: u64,
    #[serde(rename = "RNG")]
    pub rng: i32,
    pub clairvoyance: i32,
    pub stealth_bonus: i32,
    pub regeneration_bonus: i32,
    pub light_multiplier: i32,
    pub awareness_bonus: i32,
    pub transference: i32,
    pub wisdom_bonus: i32,
    pub reaping: i32,
    pub regen_per_turn: i32,
    pub weakness_amount: i32,
    pub poison_amount: i32,
}

impl From<&GameSnapshot> for FlatMetricsPayload {
    fn from(snap: &GameSnapshot) -> Self {
        let s = &snap.state;
        let p = &snap.player;
        Self {
            gold: p.gold,
            gold_generated: s.gold_generated,
            depth_level: p.depth_level,
            deepest_level: s.deepest_level,
            hp: p.current_hp,
            turns: s.absolute_turn_number,
            strength: p.strength,
            monster_spawn_fuse: s.monster_spawn_fuse,
            player_turn_number: p.player_turn_number,
            absolute_turn_number: s.absolute_turn_number,
            milliseconds: s.milliseconds,
            xpxp_this_turn: p.xpxp_this_turn,
            stealth_range: p.stealth_range,
            reward_rooms_generated: s.reward_rooms_generated,
            wizard: s.wizard,
            disturbed: p.disturbed,
            game_in_progress: s.game_in_progress,
            game_has_ended: s.game_has_ended,
            easy_mode: s.easy_mode,
            seed: s.seed,
            rng: s.rng,
            clairvoyance: p.rings.clairvoyance,
            stealth_bonus: p.rings.stealth_bonus,
            regeneration_bonus: p.rings.regeneration_bonus,
            light_multiplier: p.rings.light_multiplier,
            awareness_bonus: p.rings.awareness_bonus,
            transference: p.rings.transference,
            wisdom_bonus: p.rings.wisdom_bonus,
            reaping: p.rings.reaping,
            regen_per_turn: p.regen_per_turn,
            weakness_amount: p.weakness_amount,
            poison_amount: p.poison_amount,
        }
    }
}
