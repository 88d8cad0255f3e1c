use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::streak::{GameDay, current_streak, longest_streak};

/// Per-player statistics over their full daily game history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub total_games: u32,
    pub total_wins: u32,
    pub total_losses: u32,
    /// Percentage of games won, 0.0 to 100.0.
    pub win_rate: f64,
    pub average_attempts: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
}

impl PlayerStats {
    pub fn from_days(days: &[GameDay], today: NaiveDate) -> Self {
        let total_games = days.len() as u32;
        let total_wins = days.iter().filter(|d| d.won).count() as u32;
        let attempts: u32 = days.iter().map(|d| u32::from(d.attempts)).sum();

        Self {
            total_games,
            total_wins,
            total_losses: total_games - total_wins,
            win_rate: ratio(total_wins, total_games) * 100.0,
            average_attempts: ratio(attempts, total_games),
            current_streak: current_streak(days, today),
            longest_streak: longest_streak(days),
        }
    }

    /// Win rate and average attempts rounded to two decimals.
    pub fn rounded(self) -> Self {
        Self {
            win_rate: round_to(self.win_rate, 2),
            average_attempts: round_to(self.average_attempts, 2),
            ..self
        }
    }
}

/// Aggregate figures across every player, for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub total_attempts: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub average_attempts: f64,
    pub average_hints_used: f64,
}

impl GameSummary {
    /// Summarize `(won, attempts, hints_used)` rows.
    pub fn summarize<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (bool, u8, u8)>,
    {
        let mut total = 0u32;
        let mut wins = 0u32;
        let mut attempts = 0u32;
        let mut hints = 0u32;

        for (won, row_attempts, row_hints) in rows {
            total += 1;
            wins += u32::from(won);
            attempts += u32::from(row_attempts);
            hints += u32::from(row_hints);
        }

        Self {
            total_attempts: total,
            wins,
            losses: total - wins,
            win_rate: round_to(ratio(wins, total) * 100.0, 1),
            average_attempts: round_to(ratio(attempts, total), 2),
            average_hints_used: round_to(ratio(hints, total), 2),
        }
    }
}

pub(crate) fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        f64::from(numerator) / f64::from(denominator)
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streak::parse_date;

    #[test]
    fn stats_for_mixed_history() {
        let days = vec![
            GameDay::new(parse_date("2024-05-01").unwrap(), true, 2),
            GameDay::new(parse_date("2024-05-02").unwrap(), false, 4),
            GameDay::new(parse_date("2024-05-03").unwrap(), true, 3),
            GameDay::new(parse_date("2024-05-05").unwrap(), true, 1),
        ];
        let stats = PlayerStats::from_days(&days, parse_date("2024-05-05").unwrap());

        assert_eq!(stats.total_games, 4);
        assert_eq!(stats.total_wins, 3);
        assert_eq!(stats.total_losses, 1);
        assert_eq!(stats.win_rate, 75.0);
        assert_eq!(stats.average_attempts, 2.5);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 3);
    }

    #[test]
    fn rounded_keeps_two_decimals() {
        let days = vec![
            GameDay::new(parse_date("2024-05-01").unwrap(), true, 1),
            GameDay::new(parse_date("2024-05-02").unwrap(), false, 4),
            GameDay::new(parse_date("2024-05-03").unwrap(), false, 2),
        ];
        let stats = PlayerStats::from_days(&days, parse_date("2024-05-03").unwrap()).rounded();
        assert_eq!(stats.win_rate, 33.33);
        assert_eq!(stats.average_attempts, 2.33);
        assert_eq!(stats.current_streak, 3);
    }

    #[test]
    fn empty_history_is_all_zero() {
        let stats = PlayerStats::from_days(&[], parse_date("2024-05-05").unwrap());
        assert_eq!(stats, PlayerStats::default());
    }

    #[test]
    fn summary_rounds_figures() {
        let summary = GameSummary::summarize([(true, 1, 0), (false, 4, 3), (true, 2, 1)]);
        assert_eq!(summary.total_attempts, 3);
        assert_eq!(summary.wins, 2);
        assert_eq!(summary.losses, 1);
        assert_eq!(summary.win_rate, 66.7);
        assert_eq!(summary.average_attempts, 2.33);
        assert_eq!(summary.average_hints_used, 1.33);

        assert_eq!(GameSummary::summarize(Vec::<(bool, u8, u8)>::new()), GameSummary::default());
    }
}
