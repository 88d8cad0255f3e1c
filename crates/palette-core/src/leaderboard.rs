use std::collections::HashMap;
use std::collections::HashSet;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::stats::{ratio, round_to};
use crate::streak::{GameDay, current_streak, longest_streak};

/// One row of the global attempt history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAttempt {
    pub user_id: String,
    pub day: GameDay,
}

/// Display fields shown next to a leaderboard row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
    pub total_games: u32,
    pub total_wins: u32,
    pub win_rate: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub average_attempts: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    CurrentStreak,
    WinRate,
    TotalWins,
    AverageAttempts,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "currentStreak" => Ok(SortBy::CurrentStreak),
            "winRate" => Ok(SortBy::WinRate),
            "totalWins" => Ok(SortBy::TotalWins),
            "averageAttempts" => Ok(SortBy::AverageAttempts),
            other => Err(format!("unknown sort key '{}'", other)),
        }
    }
}

impl SortBy {
    /// Parse a query value, falling back to current streak for anything unknown.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

/// Rank every player who has at least one attempt.
///
/// Players keep the order in which they first appear in `attempts` when the
/// sort key and its tie-breaker are both equal.
pub fn build_leaderboard(
    attempts: &[UserAttempt],
    profiles: &HashMap<String, PlayerProfile>,
    today: NaiveDate,
    sort_by: SortBy,
) -> Vec<LeaderboardEntry> {
    let mut order: Vec<&str> = Vec::new();
    let mut grouped: HashMap<&str, Vec<GameDay>> = HashMap::new();
    for attempt in attempts {
        let days = grouped.entry(attempt.user_id.as_str()).or_insert_with(|| {
            order.push(attempt.user_id.as_str());
            Vec::new()
        });
        days.push(attempt.day);
    }

    let mut entries: Vec<LeaderboardEntry> = order
        .into_iter()
        .map(|user_id| {
            let days = &grouped[user_id];
            let profile = profiles.get(user_id).cloned().unwrap_or_default();
            entry_for(user_id, days, profile, today)
        })
        .collect();

    sort_entries(&mut entries, sort_by);
    entries
}

fn entry_for(
    user_id: &str,
    days: &[GameDay],
    profile: PlayerProfile,
    today: NaiveDate,
) -> LeaderboardEntry {
    let total_games = days.iter().map(|d| d.date).collect::<HashSet<_>>().len() as u32;
    let total_wins = days.iter().filter(|d| d.won).count() as u32;
    let attempts: u32 = days.iter().map(|d| u32::from(d.attempts)).sum();

    LeaderboardEntry {
        user_id: user_id.to_string(),
        username: profile.username,
        first_name: profile.first_name,
        last_name: profile.last_name,
        image_url: profile.image_url,
        total_games,
        total_wins,
        win_rate: round_to(ratio(total_wins, total_games) * 100.0, 2),
        current_streak: current_streak(days, today),
        longest_streak: longest_streak(days),
        average_attempts: round_to(ratio(attempts, days.len() as u32), 2),
    }
}

fn sort_entries(entries: &mut [LeaderboardEntry], sort_by: SortBy) {
    entries.sort_by(|a, b| match sort_by {
        SortBy::CurrentStreak => b
            .current_streak
            .cmp(&a.current_streak)
            .then(b.win_rate.total_cmp(&a.win_rate)),
        SortBy::WinRate => b
            .win_rate
            .total_cmp(&a.win_rate)
            .then(b.total_wins.cmp(&a.total_wins)),
        SortBy::TotalWins => b
            .total_wins
            .cmp(&a.total_wins)
            .then(b.win_rate.total_cmp(&a.win_rate)),
        SortBy::AverageAttempts => a
            .average_attempts
            .total_cmp(&b.average_attempts)
            .then(b.win_rate.total_cmp(&a.win_rate)),
    });
}

/// 1-based position of `user_id` in a sorted leaderboard.
pub fn rank_of<'a>(
    entries: &'a [LeaderboardEntry],
    user_id: &str,
) -> Option<(usize, &'a LeaderboardEntry)> {
    entries
        .iter()
        .enumerate()
        .find(|(_, e)| e.user_id == user_id)
        .map(|(i, e)| (i + 1, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streak::parse_date;

    fn attempt(user: &str, date: &str, won: bool, attempts: u8) -> UserAttempt {
        UserAttempt {
            user_id: user.to_string(),
            day: GameDay::new(parse_date(date).unwrap(), won, attempts),
        }
    }

    fn history() -> Vec<UserAttempt> {
        vec![
            // ash: 3-day current streak, 2/3 wins
            attempt("ash", "2024-04-10", true, 1),
            attempt("ash", "2024-04-09", false, 4),
            attempt("ash", "2024-04-08", true, 2),
            // misty: no current streak, 2/2 wins
            attempt("misty", "2024-04-08", true, 3),
            attempt("misty", "2024-04-07", true, 3),
            // brock: played today, 3 wins over 4 games
            attempt("brock", "2024-04-10", true, 2),
            attempt("brock", "2024-04-05", true, 2),
            attempt("brock", "2024-04-04", true, 1),
            attempt("brock", "2024-04-03", false, 4),
        ]
    }

    fn today() -> NaiveDate {
        parse_date("2024-04-10").unwrap()
    }

    fn ids(entries: &[LeaderboardEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.user_id.as_str()).collect()
    }

    #[test]
    fn computes_per_player_figures() {
        let board = build_leaderboard(&history(), &HashMap::new(), today(), SortBy::CurrentStreak);
        let ash = board.iter().find(|e| e.user_id == "ash").unwrap();

        assert_eq!(ash.total_games, 3);
        assert_eq!(ash.total_wins, 2);
        assert_eq!(ash.win_rate, 66.67);
        assert_eq!(ash.average_attempts, 2.33);
        assert_eq!(ash.current_streak, 3);
        assert_eq!(ash.longest_streak, 3);

        let brock = board.iter().find(|e| e.user_id == "brock").unwrap();
        assert_eq!(brock.current_streak, 1);
        assert_eq!(brock.longest_streak, 3);
    }

    #[test]
    fn sorts_by_each_key() {
        let all = history();
        let profiles = HashMap::new();

        let by_streak = build_leaderboard(&all, &profiles, today(), SortBy::CurrentStreak);
        assert_eq!(ids(&by_streak), vec!["ash", "brock", "misty"]);

        let by_rate = build_leaderboard(&all, &profiles, today(), SortBy::WinRate);
        assert_eq!(ids(&by_rate), vec!["misty", "brock", "ash"]);

        let by_wins = build_leaderboard(&all, &profiles, today(), SortBy::TotalWins);
        assert_eq!(ids(&by_wins), vec!["brock", "misty", "ash"]);

        let by_attempts = build_leaderboard(&all, &profiles, today(), SortBy::AverageAttempts);
        assert_eq!(ids(&by_attempts), vec!["brock", "ash", "misty"]);
    }

    #[test]
    fn attaches_profiles_and_ranks() {
        let mut profiles = HashMap::new();
        profiles.insert(
            "misty".to_string(),
            PlayerProfile {
                username: Some("misty".to_string()),
                first_name: Some("Misty".to_string()),
                ..PlayerProfile::default()
            },
        );
        let board = build_leaderboard(&history(), &profiles, today(), SortBy::WinRate);

        let (position, entry) = rank_of(&board, "misty").unwrap();
        assert_eq!(position, 1);
        assert_eq!(entry.first_name.as_deref(), Some("Misty"));
        assert!(rank_of(&board, "gary").is_none());
    }

    #[test]
    fn unknown_sort_key_falls_back() {
        assert_eq!(SortBy::parse_or_default(Some("bogus")), SortBy::CurrentStreak);
        assert_eq!(SortBy::parse_or_default(None), SortBy::CurrentStreak);
        assert_eq!(SortBy::parse_or_default(Some("totalWins")), SortBy::TotalWins);
    }

    #[test]
    fn empty_history_is_empty_board() {
        assert!(build_leaderboard(&[], &HashMap::new(), today(), SortBy::WinRate).is_empty());
    }
}
