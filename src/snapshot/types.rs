use super::run_history::RunRecord;
use serde::{Deserialize, Serialize};

/// Monster ids at or above this are not tracked individually.
pub const MAX_MONSTERS: i32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DamageRange {
    pub min: i32,
    pub max: i32,
}

/// Bonuses granted by worn rings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RingBonuses {
    pub clairvoyance: i32,
    pub stealth_bonus: i32,
    pub regeneration_bonus: i32,
    pub light_multiplier: i32,
    pub awareness_bonus: i32,
    pub transference: i32,
    pub wisdom_bonus: i32,
    pub reaping: i32,
}

/// The player character as of one tick.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSnapshot {
    pub gold: i32,
    pub depth_level: i32,
    pub deepest_level: i32,
    pub current_hp: i32,
    pub max_hp: i32,
    pub strength: i32,
    /// Input turns; does not advance while paralysed
    pub player_turn_number: i64,
    /// Squares explored this turn
    pub xpxp_this_turn: i32,
    /// Distance from which monsters notice the player
    pub stealth_range: i32,
    /// Player should stop auto-acting
    pub disturbed: bool,
    pub regen_per_turn: i32,
    pub weakness_amount: i32,
    pub poison_amount: i32,
    pub rings: RingBonuses,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonsterSnapshot {
    pub id: i32,
    /// Name assigned by the portal (pod name for monsties)
    pub portal_name: String,
    /// Engine monster type, e.g. "goblin conjurer"
    pub type_name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub spawn_depth: i32,
    pub position: Position,
    pub attack_speed: i32,
    pub movement_speed: i32,
    pub accuracy: i32,
    pub defense: i32,
    pub damage: DamageRange,
    pub turns_between_regen: i64,
    pub is_dead: bool,
    /// Bookkeeping flag set by the engine once the monster has died but
    /// before it is removed from the level
    pub has_died: bool,
}

impl MonsterSnapshot {
    pub fn id_in_range(&self) -> bool {
        (0..MAX_MONSTERS).contains(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelSnapshot {
    pub visited: bool,
    pub monsters: Vec<MonsterSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemSnapshot {
    /// Engine category bit, see [`crate::items::ItemCategory`]
    pub category: u16,
    pub kind: i16,
    pub damage: DamageRange,
    pub armor: i16,
    pub charges: i16,
    pub enchant1: i16,
    pub enchant2: i16,
    pub times_enchanted: i16,
    pub strength_required: i16,
    pub quantity: i16,
    pub inventory_letter: Option<char>,
    pub inscription: String,
    pub origin_depth: i16,
    /// Runic index when the item carries one
    pub runic: Option<i16>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EquippedItems {
    pub weapon: Option<ItemSnapshot>,
    pub armor: Option<ItemSnapshot>,
    pub left_ring: Option<ItemSnapshot>,
    pub right_ring: Option<ItemSnapshot>,
}

/// Run-wide state that is not about the player character.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameStateSnapshot {
    pub wizard: bool,
    pub reward_rooms_generated: i32,
    pub gold_generated: i32,
    pub game_in_progress: bool,
    pub game_has_ended: bool,
    pub easy_mode: bool,
    /// Master seed for the whole dungeon
    pub seed: u64,
    /// Which RNG stream is active
    pub rng: i32,
    /// Turns since the beginning of time; always increments
    pub absolute_turn_number: i64,
    /// Milliseconds since launch
    pub milliseconds: i64,
    pub monster_spawn_fuse: i32,
    pub current_depth: i32,
    pub deepest_level: i32,
}

/// Everything the reporters need from one tick of the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSnapshot {
    pub state: GameStateSnapshot,
    pub player: PlayerSnapshot,
    /// Indexed by depth; level 0 is the first floor
    pub levels: Vec<LevelSnapshot>,
    pub equipped: EquippedItems,
    pub pack: Vec<ItemSnapshot>,
    pub run_history: Vec<RunRecord>,
}

impl GameSnapshot {
    /// Monsters on visited levels up to the deepest level reached, paired
    /// with the level index they were found on.
    pub fn visible_monsters(&self) -> impl Iterator<Item = (usize, &MonsterSnapshot)> {
        let deepest = usize::try_from(self.state.deepest_level).unwrap_or(0);
        self.levels
            .iter()
            .enumerate()
            .take(deepest + 1)
            .filter(|(_, level)| level.visited)
            .flat_map(|(index, level)| level.monsters.iter().map(move |m| (index, m)))
    }

    pub fn monsters_alive(&self) -> usize {
        self.visible_monsters()
            .filter(|(_, m)| !m.is_dead && !m.has_died)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monster(id: i32) -> MonsterSnapshot {
        MonsterSnapshot {
            id,
            portal_name: format!("m{}", id),
            ..Default::default()
        }
    }

    fn snapshot_with_levels(deepest: i32, levels: Vec<LevelSnapshot>) -> GameSnapshot {
        GameSnapshot {
            state: GameStateSnapshot {
                deepest_level: deepest,
                ..Default::default()
            },
            levels,
            ..Default::default()
        }
    }

    #[test]
    fn test_visible_monsters_skips_unvisited_levels() {
        let snap = snapshot_with_levels(
            1,
            vec![
                LevelSnapshot { visited: true, monsters: vec![monster(1)] },
                LevelSnapshot { visited: false, monsters: vec![monster(2)] },
            ],
        );
        let ids: Vec<i32> = snap.visible_monsters().map(|(_, m)| m.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_visible_monsters_stops_at_deepest_level() {
        let snap = snapshot_with_levels(
            0,
            vec![
                LevelSnapshot { visited: true, monsters: vec![monster(1)] },
                LevelSnapshot { visited: true, monsters: vec![monster(2)] },
            ],
        );
        assert_eq!(snap.visible_monsters().count(), 1);
    }

    #[test]
    fn test_visible_monsters_reports_level_index() {
        let snap = snapshot_with_levels(
            2,
            vec![
                LevelSnapshot { visited: true, monsters: vec![] },
                LevelSnapshot { visited: false, monsters: vec![monster(5)] },
                LevelSnapshot { visited: true, monsters: vec![monster(7)] },
            ],
        );
        let found: Vec<(usize, i32)> = snap.visible_monsters().map(|(l, m)| (l, m.id)).collect();
        assert_eq!(found, vec![(2, 7)]);
    }

    #[test]
    fn test_monsters_alive_excludes_dead() {
        let mut dead = monster(2);
        dead.has_died = true;
        let snap = snapshot_with_levels(
            0,
            vec![LevelSnapshot { visited: true, monsters: vec![monster(1), dead] }],
        );
        assert_eq!(snap.monsters_alive(), 1);
    }

    #[test]
    fn test_id_range() {
        assert!(monster(0).id_in_range());
        assert!(monster(1023).id_in_range());
        assert!(!monster(1024).id_in_range());
        assert!(!monster(-1).id_in_range());
    }

    #[test]
    fn test_partial_json_snapshot_uses_defaults() {
        let snap: GameSnapshot =
            serde_json::from_str(r#"{"player": {"gold": 12}, "state": {"seed": 7}}"#).unwrap();
        assert_eq!(snap.player.gold, 12);
        assert_eq!(snap.state.seed, 7);
        assert!(snap.levels.is_empty());
    }
}
