//! A seeded stand-in for the game engine.
//!
//! Each call to [`GameSource::snapshot`] advances the run by one step:
//! monsters wander and fight, the player picks things up, descends, and
//! eventually dies or escapes. Finished runs are appended to the run
//! history the way the engine's history file grows.

use super::config::SimConfig;
use crate::items::ItemCategory;
use crate::snapshot::{
    DamageRange, GameSnapshot, GameSource, ItemSnapshot, LevelSnapshot, MonsterSnapshot,
    PlayerSnapshot, Position, RunRecord, RESULT_ESCAPED,
};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DCOLS: i32 = 79;
const DROWS: i32 = 29;

/// Run history dates start here so seeded runs stay reproducible.
const EPOCH: i64 = 1_700_000_000;

struct MonsterKind {
    name: &'static str,
    hp: i32,
    defense: i32,
    accuracy: i32,
    damage: (i32, i32),
    movement_speed: i32,
    attack_speed: i32,
    turns_between_regen: i64,
}

const MONSTER_KINDS: &[MonsterKind] = &[
    MonsterKind { name: "rat", hp: 6, defense: 0, accuracy: 80, damage: (1, 3), movement_speed: 100, attack_speed: 100, turns_between_regen: 20 },
    MonsterKind { name: "kobold", hp: 7, defense: 0, accuracy: 80, damage: (1, 4), movement_speed: 100, attack_speed: 100, turns_between_regen: 20 },
    MonsterKind { name: "jackal", hp: 8, defense: 3, accuracy: 70, damage: (2, 4), movement_speed: 50, attack_speed: 100, turns_between_regen: 20 },
    MonsterKind { name: "eel", hp: 18, defense: 27, accuracy: 100, damage: (3, 7), movement_speed: 50, attack_speed: 100, turns_between_regen: 5 },
    MonsterKind { name: "monkey", hp: 12, defense: 17, accuracy: 100, damage: (1, 3), movement_speed: 100, attack_speed: 100, turns_between_regen: 20 },
    MonsterKind { name: "pink jelly", hp: 50, defense: 0, accuracy: 50, damage: (1, 3), movement_speed: 100, attack_speed: 100, turns_between_regen: 20 },
    MonsterKind { name: "goblin", hp: 15, defense: 10, accuracy: 70, damage: (2, 5), movement_speed: 100, attack_speed: 100, turns_between_regen: 20 },
    MonsterKind { name: "goblin conjurer", hp: 10, defense: 10, accuracy: 70, damage: (2, 4), movement_speed: 100, attack_speed: 100, turns_between_regen: 20 },
    MonsterKind { name: "ogre", hp: 55, defense: 60, accuracy: 125, damage: (9, 13), movement_speed: 100, attack_speed: 200, turns_between_regen: 20 },
];

/// Portal monsties arrive as this engine type.
const MONSTIE_KIND: MonsterKind = MonsterKind {
    name: "monstie",
    hp: 20,
    defense: 10,
    accuracy: 90,
    damage: (2, 6),
    movement_speed: 100,
    attack_speed: 100,
    turns_between_regen: 10,
};

pub struct SimulatedDungeon {
    rng: ChaCha8Rng,
    config: SimConfig,
    game: GameSnapshot,
    next_monster_id: i32,
    next_letter: u8,
    games_started: u32,
    monsters_killed: u64,
    monsties_spawned: usize,
}

impl SimulatedDungeon {
    pub fn new(config: SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let mut dungeon = Self {
            rng,
            config,
            game: GameSnapshot::default(),
            next_monster_id: 0,
            next_letter: b'a',
            games_started: 0,
            monsters_killed: 0,
            monsties_spawned: 0,
        };
        dungeon.start_game();
        dungeon
    }

    pub fn games_started(&self) -> u32 {
        self.games_started
    }

    pub fn monsters_killed(&self) -> u64 {
        self.monsters_killed
    }

    pub fn monsties_spawned(&self) -> usize {
        self.monsties_spawned
    }

    pub fn runs(&self) -> &[RunRecord] {
        &self.game.run_history
    }

    /// The state as of the last step, without advancing.
    pub fn current(&self) -> &GameSnapshot {
        &self.game
    }

    fn start_game(&mut self) {
        let history = std::mem::take(&mut self.game.run_history);
        let milliseconds = self.game.state.milliseconds;
        self.games_started += 1;
        self.next_letter = b'a';

        let mut game = GameSnapshot {
            run_history: history,
            ..Default::default()
        };
        game.state.seed = self.rng.gen_range(1..=u64::from(u32::MAX));
        game.state.game_in_progress = true;
        game.state.current_depth = 1;
        game.state.deepest_level = 1;
        game.state.monster_spawn_fuse = 125;
        game.state.milliseconds = milliseconds;
        game.player = PlayerSnapshot {
            depth_level: 1,
            deepest_level: 1,
            current_hp: 40,
            max_hp: 40,
            strength: 12,
            stealth_range: 14,
            regen_per_turn: 1,
            ..Default::default()
        };
        self.game = game;

        let dagger = self.new_item(ItemCategory::Weapon, 0, DamageRange { min: 3, max: 4 }, 0);
        let armor = self.new_item(ItemCategory::Armor, 0, DamageRange::default(), 30);
        let food = self.new_item(ItemCategory::Food, 0, DamageRange::default(), 0);
        self.game.equipped.weapon = Some(dagger.clone());
        self.game.equipped.armor = Some(armor.clone());
        self.game.pack = vec![dagger, armor, food];

        self.enter_level(1);
        log::debug!("Simulated game {} started, seed {}", self.games_started, self.game.state.seed);
    }

    fn new_item(&mut self, category: ItemCategory, kind: i16, damage: DamageRange, armor: i16) -> ItemSnapshot {
        let letter = char::from(self.next_letter);
        self.next_letter = self.next_letter.saturating_add(1).min(b'z');
        ItemSnapshot {
            category: category.code(),
            kind,
            damage,
            armor,
            quantity: 1,
            inventory_letter: Some(letter),
            origin_depth: self.game.state.current_depth as i16,
            ..Default::default()
        }
    }

    fn new_monster(&mut self, kind: &MonsterKind, name: &str, depth: i32) -> MonsterSnapshot {
        let id = self.next_monster_id;
        self.next_monster_id += 1;
        MonsterSnapshot {
            id,
            portal_name: name.to_string(),
            type_name: kind.name.to_string(),
            hp: kind.hp,
            max_hp: kind.hp,
            spawn_depth: depth,
            position: Position {
                x: self.rng.gen_range(1..DCOLS - 1),
                y: self.rng.gen_range(1..DROWS - 1),
            },
            attack_speed: kind.attack_speed,
            movement_speed: kind.movement_speed,
            accuracy: kind.accuracy,
            defense: kind.defense,
            damage: DamageRange {
                min: kind.damage.0,
                max: kind.damage.1,
            },
            turns_between_regen: kind.turns_between_regen,
            ..Default::default()
        }
    }

    /// Move the player to `depth`, generating the level on first visit.
    fn enter_level(&mut self, depth: i32) {
        let index = (depth - 1) as usize;
        while self.game.levels.len() <= index {
            self.game.levels.push(LevelSnapshot::default());
        }
        if !self.game.levels[index].visited {
            let count = self.config.monsters_per_level;
            let pool = MONSTER_KINDS.len().min(2 + depth as usize);
            let mut monsters = Vec::with_capacity(count);
            for _ in 0..count {
                let kind = &MONSTER_KINDS[self.rng.gen_range(0..pool)];
                monsters.push(self.new_monster(kind, kind.name, depth));
            }
            let level = &mut self.game.levels[index];
            level.visited = true;
            level.monsters = monsters;
        }

        self.game.state.current_depth = depth;
        self.game.player.depth_level = depth;
        if depth > self.game.state.deepest_level {
            self.game.state.deepest_level = depth;
            self.game.player.deepest_level = depth;
        }
    }

    fn current_level(&mut self) -> &mut LevelSnapshot {
        let index = (self.game.state.current_depth - 1) as usize;
        &mut self.game.levels[index]
    }

    fn end_game(&mut self, result: String, killed_by: String) {
        let state = &mut self.game.state;
        state.game_in_progress = false;
        state.game_has_ended = true;

        let escaped = result == RESULT_ESCAPED;
        let gold = self.game.player.gold.max(0) as u64;
        let deepest = state.deepest_level.max(0) as u32;
        let run = RunRecord {
            seed: state.seed,
            date: EPOCH + state.milliseconds / 1000,
            result,
            killed_by,
            gold,
            lumenstones: 0,
            score: if escaped { gold * 2 } else { gold },
            turns: state.absolute_turn_number.max(0) as u64,
            deepest_level: deepest,
        };
        log::debug!("Simulated run over: {} on depth {}", run.result, run.deepest_level);
        self.game.run_history.push(run);
    }

    fn advance(&mut self) {
        if self.game.state.game_has_ended {
            if self.config.restart_after_end {
                self.start_game();
            }
            return;
        }

        let turns = self.config.turns_per_step;
        self.game.state.absolute_turn_number += turns;
        self.game.state.milliseconds += turns * 100;
        self.game.state.monster_spawn_fuse = (self.game.state.monster_spawn_fuse - 1).max(0);
        self.game.player.player_turn_number += turns;
        self.game.player.xpxp_this_turn = self.rng.gen_range(0..4);
        self.game.player.disturbed = self.rng.gen_bool(0.2);

        // The engine drops monsters one tick after flagging them dead
        self.current_level().monsters.retain(|m| !m.has_died);

        self.wander();
        if let Some(killer) = self.fight() {
            let killed_by = format!("Killed by a {}", killer);
            self.end_game(killed_by.clone(), killer);
            return;
        }
        self.loot();

        let cleared = self.current_level().monsters.iter().all(|m| m.is_dead || m.has_died);
        if cleared || self.rng.gen_bool(0.05) {
            let next = self.game.state.current_depth + 1;
            if next > self.config.max_depth {
                self.end_game(RESULT_ESCAPED.to_string(), String::new());
                return;
            }
            self.enter_level(next);
        }
    }

    fn wander(&mut self) {
        let steps: Vec<(i32, i32)> = (0..self.current_level().monsters.len())
            .map(|_| (self.rng.gen_range(-1..=1), self.rng.gen_range(-1..=1)))
            .collect();
        for (monster, (dx, dy)) in self.current_level().monsters.iter_mut().zip(steps) {
            monster.position.x = (monster.position.x + dx).clamp(1, DCOLS - 2);
            monster.position.y = (monster.position.y + dy).clamp(1, DROWS - 2);
        }
    }

    /// One exchange of blows. Returns the killer's name if the player died.
    fn fight(&mut self) -> Option<String> {
        let living: Vec<usize> = self
            .current_level()
            .monsters
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.has_died)
            .map(|(i, _)| i)
            .collect();
        let &target = living.choose(&mut self.rng)?;
        if !self.rng.gen_bool(0.6) {
            self.regenerate();
            return None;
        }

        let weapon = self.game.equipped.weapon.as_ref().map(|w| w.damage).unwrap_or_default();
        let hit = self.rng.gen_range(weapon.min..=weapon.max.max(weapon.min)) + self.game.player.strength / 4;
        let accuracy_roll = self.rng.gen_range(0..100);
        let counter = self.rng.gen_range(0..100);

        let monster = &mut self.current_level().monsters[target];
        monster.hp -= hit;
        if monster.hp <= 0 {
            monster.hp = 0;
            monster.has_died = true;
            self.monsters_killed += 1;
            return None;
        }

        let (min, max, accuracy, name) = (
            monster.damage.min,
            monster.damage.max,
            monster.accuracy,
            monster.type_name.clone(),
        );
        if counter < accuracy.min(95) && accuracy_roll < 90 {
            let damage = self.rng.gen_range(min..=max.max(min));
            self.game.player.current_hp -= damage;
            if self.game.player.current_hp <= 0 {
                self.game.player.current_hp = 0;
                return Some(name);
            }
        }
        None
    }

    fn regenerate(&mut self) {
        let player = &mut self.game.player;
        player.current_hp = (player.current_hp + player.regen_per_turn).min(player.max_hp);
    }

    fn loot(&mut self) {
        if self.rng.gen_bool(0.15) {
            let depth = self.game.state.current_depth;
            let gold = self.rng.gen_range(5..40) * depth;
            self.game.player.gold += gold;
            self.game.state.gold_generated += gold;
        }
        if self.rng.gen_bool(0.05) && self.game.pack.len() < 26 {
            let category = *[ItemCategory::Potion, ItemCategory::Scroll, ItemCategory::Ring]
                .choose(&mut self.rng)
                .unwrap_or(&ItemCategory::Potion);
            let kind = self.rng.gen_range(0..8);
            let item = self.new_item(category, kind, DamageRange::default(), 0);
            self.game.pack.push(item);
        }
    }
}

impl GameSource for SimulatedDungeon {
    fn snapshot(&mut self) -> Option<GameSnapshot> {
        self.advance();
        Some(self.game.clone())
    }

    fn accepts_commands(&self) -> bool {
        true
    }

    fn spawn_monstie(&mut self, pod_name: &str) -> bool {
        if self.game.state.game_has_ended {
            return false;
        }
        let depth = self.game.state.current_depth;
        let monstie = self.new_monster(&MONSTIE_KIND, pod_name, depth);
        self.current_level().monsters.push(monstie);
        self.monsties_spawned += 1;
        true
    }

    fn kill_monster(&mut self, monster_id: i32) -> bool {
        let found = self
            .game
            .levels
            .iter_mut()
            .flat_map(|level| level.monsters.iter_mut())
            .find(|m| m.id == monster_id && !m.has_died);
        match found {
            Some(monster) => {
                monster.hp = 0;
                monster.has_died = true;
                self.monsters_killed += 1;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dungeon(seed: u64) -> SimulatedDungeon {
        SimulatedDungeon::new(SimConfig::quick_test(seed))
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = dungeon(7);
        let mut b = dungeon(7);
        for _ in 0..40 {
            assert_eq!(a.snapshot(), b.snapshot());
        }
    }

    #[test]
    fn test_starts_on_first_level_with_equipment() {
        let d = dungeon(1);
        let game = d.current();
        assert!(game.state.game_in_progress);
        assert_eq!(game.state.current_depth, 1);
        assert!(game.levels[0].visited);
        assert_eq!(game.levels[0].monsters.len(), 3);
        assert!(game.equipped.weapon.is_some());
        assert_eq!(game.pack.len(), 3);
        assert_ne!(game.state.seed, 0);
    }

    #[test]
    fn test_turns_advance_every_step() {
        let mut d = SimulatedDungeon::new(SimConfig {
            restart_after_end: false,
            ..SimConfig::quick_test(3)
        });
        let first = d.snapshot().unwrap().state.absolute_turn_number;
        let second = d.snapshot().unwrap().state.absolute_turn_number;
        assert!(second > first || d.current().state.game_has_ended);
    }

    #[test]
    fn test_runs_end_and_restart() {
        let mut d = dungeon(11);
        for _ in 0..2000 {
            d.snapshot();
        }
        assert!(!d.runs().is_empty());
        assert!(d.games_started() >= 2);
        for run in d.runs() {
            assert!(run.is_valid());
            assert!(run.deepest_level >= 1);
        }
    }

    #[test]
    fn test_without_restart_the_game_stays_over() {
        let mut d = SimulatedDungeon::new(SimConfig {
            restart_after_end: false,
            ..SimConfig::quick_test(5)
        });
        for _ in 0..2000 {
            d.snapshot();
        }
        assert!(d.current().state.game_has_ended);
        assert_eq!(d.games_started(), 1);
        assert_eq!(d.runs().len(), 1);
    }

    #[test]
    fn test_spawn_monstie_places_named_monster() {
        let mut d = dungeon(2);
        assert!(d.spawn_monstie("monstie-pod-1"));
        let level = &d.current().levels[0];
        let monstie = level.monsters.last().unwrap();
        assert_eq!(monstie.portal_name, "monstie-pod-1");
        assert_eq!(monstie.type_name, "monstie");
    }

    #[test]
    fn test_kill_monster_flags_it_dead_once() {
        let mut d = dungeon(2);
        let id = d.current().levels[0].monsters[0].id;
        assert!(d.kill_monster(id));
        assert!(!d.kill_monster(id));
        assert!(!d.kill_monster(-5));
        assert!(d.current().levels[0].monsters[0].has_died);
    }
}
