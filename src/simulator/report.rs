//! Simulation report generation.

use serde::Serialize;

/// What a simulated run sent and how the dungeon went.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimReport {
    pub steps: u64,
    pub posts_sent: usize,
    pub posts_failed: usize,
    pub games_started: u32,
    pub runs_finished: usize,
    pub runs_won: u32,
    pub deepest_level: u32,
    pub monsters_killed: u64,
    pub monsties_spawned: usize,
}

impl SimReport {
    /// Share of posts that reached the portal, in percent.
    pub fn delivery_rate(&self) -> f64 {
        let total = self.posts_sent + self.posts_failed;
        if total == 0 {
            return 100.0;
        }
        self.posts_sent as f64 / total as f64 * 100.0
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                  PORTAL SIMULATION REPORT\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str("── DUNGEON ──────────────────────────────────────────────────────\n");
        report.push_str(&format!("  Steps:               {}\n", self.steps));
        report.push_str(&format!("  Games Started:       {}\n", self.games_started));
        report.push_str(&format!(
            "  Runs Finished:       {} ({} won)\n",
            self.runs_finished, self.runs_won
        ));
        report.push_str(&format!("  Deepest Level:       {}\n", self.deepest_level));
        report.push_str(&format!("  Monsters Killed:     {}\n", self.monsters_killed));
        report.push_str(&format!("  Monsties Spawned:    {}\n\n", self.monsties_spawned));

        report.push_str("── PORTAL ───────────────────────────────────────────────────────\n");
        report.push_str(&format!("  Posts Sent:          {}\n", self.posts_sent));
        report.push_str(&format!("  Posts Failed:        {}\n", self.posts_failed));
        report.push_str(&format!(
            "  Delivery Rate:       {:.1}%\n",
            self.delivery_rate()
        ));
        report
    }

    /// Generate a JSON report for further analysis.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_rate() {
        let report = SimReport {
            posts_sent: 3,
            posts_failed: 1,
            ..Default::default()
        };
        assert!((report.delivery_rate() - 75.0).abs() < 1e-9);
        assert_eq!(SimReport::default().delivery_rate(), 100.0);
    }

    #[test]
    fn test_text_and_json_carry_the_numbers() {
        let report = SimReport {
            steps: 12,
            posts_sent: 40,
            runs_finished: 2,
            runs_won: 1,
            ..Default::default()
        };
        let text = report.to_text();
        assert!(text.contains("Steps:               12"));
        assert!(text.contains("Runs Finished:       2 (1 won)"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(json["posts_sent"], 40);
    }
}
