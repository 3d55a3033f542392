//! Run history records and the aggregate statistics derived from them.
//!
//! The engine appends one tab-separated line per finished run:
//! `seed  date  result  killedBy  gold  lumenstones  score  turns  deepestLevel`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Result text of a run that escaped the dungeon with the amulet.
pub const RESULT_ESCAPED: &str = "Escaped";
/// Result text of a run that escaped with every lumenstone.
pub const RESULT_MASTERED: &str = "Mastered";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunRecord {
    pub seed: u64,
    /// Unix timestamp of the run's end
    pub date: i64,
    pub result: String,
    pub killed_by: String,
    pub gold: u64,
    pub lumenstones: u32,
    pub score: u64,
    pub turns: u64,
    pub deepest_level: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Escaped,
    Mastered,
    Lost,
}

impl RunRecord {
    pub fn outcome(&self) -> RunOutcome {
        match self.result.as_str() {
            RESULT_MASTERED => RunOutcome::Mastered,
            RESULT_ESCAPED => RunOutcome::Escaped,
            _ => RunOutcome::Lost,
        }
    }

    /// Seed 0 marks a placeholder entry the engine writes for unseeded runs.
    pub fn is_valid(&self) -> bool {
        self.seed != 0
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.date, 0)
    }

    /// Parse one history line. Returns `None` for malformed lines.
    pub fn parse_line(line: &str) -> Option<RunRecord> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 9 {
            return None;
        }
        Some(RunRecord {
            seed: fields[0].trim().parse().ok()?,
            date: fields[1].trim().parse().ok()?,
            result: fields[2].trim().to_string(),
            killed_by: fields[3].trim().to_string(),
            gold: fields[4].trim().parse().ok()?,
            lumenstones: fields[5].trim().parse().ok()?,
            score: fields[6].trim().parse().ok()?,
            turns: fields[7].trim().parse().ok()?,
            deepest_level: fields[8].trim().parse().ok()?,
        })
    }

    /// The line this record would occupy in the history file.
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.seed,
            self.date,
            self.result,
            self.killed_by,
            self.gold,
            self.lumenstones,
            self.score,
            self.turns,
            self.deepest_level
        )
    }
}

/// Parse a whole history file, skipping blank and malformed lines.
pub fn parse_run_history(text: &str) -> Vec<RunRecord> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| {
            let parsed = RunRecord::parse_line(line);
            if parsed.is_none() {
                log::warn!("Skipping malformed run history line {}: {:?}", index + 1, line);
            }
            parsed
        })
        .collect()
}

/// Load a history file. A missing file is an empty history.
pub fn load_run_history(path: &Path) -> io::Result<Vec<RunRecord>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(parse_run_history(&text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// Lifetime statistics across every recorded run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GameStats {
    pub games: u32,
    pub escaped: u32,
    pub mastered: u32,
    pub won: u32,
    /// Percentage of games won
    pub win_rate: f32,
    pub deepest_level: u32,
    pub cumulative_levels: u64,
    pub highest_score: u64,
    pub cumulative_score: u64,
    pub most_gold: u64,
    pub cumulative_gold: u64,
    pub most_lumenstones: u32,
    pub cumulative_lumenstones: u64,
    /// Zero until the first win
    pub fewest_turns_win: u64,
    pub cumulative_turns: u64,
    pub longest_win_streak: u32,
    pub longest_mastery_streak: u32,
    pub current_win_streak: u32,
    pub current_mastery_streak: u32,
}

impl GameStats {
    /// Aggregate every valid run, in file order (streaks depend on order).
    pub fn from_runs<'a, I>(runs: I) -> GameStats
    where
        I: IntoIterator<Item = &'a RunRecord>,
    {
        let mut stats = GameStats::default();
        for run in runs.into_iter().filter(|r| r.is_valid()) {
            stats.add_run(run);
        }
        stats
    }

    pub fn add_run(&mut self, run: &RunRecord) {
        self.games += 1;
        self.cumulative_score += run.score;
        self.cumulative_gold += run.gold;
        self.cumulative_lumenstones += u64::from(run.lumenstones);
        self.cumulative_levels += u64::from(run.deepest_level);
        self.cumulative_turns += run.turns;

        self.highest_score = self.highest_score.max(run.score);
        self.most_gold = self.most_gold.max(run.gold);
        self.most_lumenstones = self.most_lumenstones.max(run.lumenstones);
        self.deepest_level = self.deepest_level.max(run.deepest_level);

        match run.outcome() {
            RunOutcome::Escaped | RunOutcome::Mastered => {
                if self.fewest_turns_win == 0 || run.turns < self.fewest_turns_win {
                    self.fewest_turns_win = run.turns;
                }
                self.won += 1;
                self.current_win_streak += 1;
                if run.outcome() == RunOutcome::Mastered {
                    self.mastered += 1;
                    self.current_mastery_streak += 1;
                } else {
                    self.escaped += 1;
                    self.current_mastery_streak = 0;
                }
            }
            RunOutcome::Lost => {
                self.current_win_streak = 0;
                self.current_mastery_streak = 0;
            }
        }

        self.longest_win_streak = self.longest_win_streak.max(self.current_win_streak);
        self.longest_mastery_streak = self.longest_mastery_streak.max(self.current_mastery_streak);

        self.win_rate = self.won as f32 / self.games as f32 * 100.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(seed: u64, result: &str, score: u64, turns: u64) -> RunRecord {
        RunRecord {
            seed,
            date: 1_700_000_000,
            result: result.to_string(),
            killed_by: "goblin".to_string(),
            gold: score / 2,
            lumenstones: 0,
            score,
            turns,
            deepest_level: 5,
        }
    }

    #[test]
    fn test_parse_line_round_trips_to_line() {
        let record = run(1234, "Killed", 900, 4000);
        assert_eq!(RunRecord::parse_line(&record.to_line()), Some(record));
    }

    #[test]
    fn test_parse_line_rejects_short_or_garbled_lines() {
        assert_eq!(RunRecord::parse_line("1\t2\t3"), None);
        assert_eq!(
            RunRecord::parse_line("abc\t0\tKilled\tgoblin\t1\t0\t1\t1\t1"),
            None
        );
    }

    #[test]
    fn test_parse_history_skips_blank_and_bad_lines() {
        let text = format!(
            "{}\n\nnot a run\n{}\n",
            run(1, "Killed", 10, 100).to_line(),
            run(2, RESULT_ESCAPED, 20, 200).to_line()
        );
        let runs = parse_run_history(&text);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].seed, 2);
    }

    #[test]
    fn test_missing_history_file_is_empty() {
        let path = std::env::temp_dir().join(format!("no-such-history-{}", uuid::Uuid::new_v4()));
        assert!(load_run_history(&path).unwrap().is_empty());
    }

    #[test]
    fn test_outcome_from_result_text() {
        assert_eq!(run(1, RESULT_ESCAPED, 0, 0).outcome(), RunOutcome::Escaped);
        assert_eq!(run(1, RESULT_MASTERED, 0, 0).outcome(), RunOutcome::Mastered);
        assert_eq!(run(1, "Quit", 0, 0).outcome(), RunOutcome::Lost);
    }

    #[test]
    fn test_stats_ignore_seed_zero() {
        let runs = vec![run(0, RESULT_ESCAPED, 100, 10), run(5, "Killed", 50, 10)];
        let stats = GameStats::from_runs(&runs);
        assert_eq!(stats.games, 1);
        assert_eq!(stats.won, 0);
    }

    #[test]
    fn test_streaks_and_win_rate() {
        let runs = vec![
            run(1, RESULT_ESCAPED, 100, 9000),
            run(2, RESULT_MASTERED, 300, 8000),
            run(3, RESULT_MASTERED, 200, 12000),
            run(4, "Killed", 50, 3000),
        ];
        let stats = GameStats::from_runs(&runs);

        assert_eq!(stats.games, 4);
        assert_eq!(stats.won, 3);
        assert_eq!(stats.escaped, 1);
        assert_eq!(stats.mastered, 2);
        assert_eq!(stats.longest_win_streak, 3);
        assert_eq!(stats.longest_mastery_streak, 2);
        assert_eq!(stats.current_win_streak, 0);
        assert_eq!(stats.current_mastery_streak, 0);
        assert_eq!(stats.fewest_turns_win, 8000);
        assert_eq!(stats.highest_score, 300);
        assert_eq!(stats.cumulative_score, 650);
        assert!((stats.win_rate - 75.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_escape_breaks_mastery_streak_but_not_win_streak() {
        let runs = vec![
            run(1, RESULT_MASTERED, 1, 1),
            run(2, RESULT_ESCAPED, 1, 1),
        ];
        let stats = GameStats::from_runs(&runs);
        assert_eq!(stats.current_win_streak, 2);
        assert_eq!(stats.current_mastery_streak, 0);
        assert_eq!(stats.longest_mastery_streak, 1);
    }

    #[test]
    fn test_fewest_turns_stays_zero_without_wins() {
        let runs = vec![run(1, "Killed", 1, 500)];
        assert_eq!(GameStats::from_runs(&runs).fewest_turns_win, 0);
    }

    #[test]
    fn test_ended_at_converts_timestamp() {
        let record = run(1, "Killed", 1, 1);
        assert_eq!(record.ended_at().unwrap().timestamp(), 1_700_000_000);
    }
}
