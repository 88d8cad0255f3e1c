//! Consecutive-day streaks over a player's daily game history.
//!
//! A streak is only "current" if the player has played today. Having played
//! yesterday but not yet today yields a current streak of 0.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::StreakError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A game attempt as it arrives over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub date: String,
    pub won: bool,
    pub attempts: u8,
}

/// A game attempt with its date parsed to a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameDay {
    pub date: NaiveDate,
    pub won: bool,
    pub attempts: u8,
}

impl GameDay {
    pub fn new(date: NaiveDate, won: bool, attempts: u8) -> Self {
        Self { date, won, attempts }
    }
}

impl TryFrom<&AttemptRecord> for GameDay {
    type Error = StreakError;

    fn try_from(record: &AttemptRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            date: parse_date(&record.date)?,
            won: record.won,
            attempts: record.attempts,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub current_streak: u32,
    pub longest_streak: u32,
}

impl StreakState {
    pub fn from_days(days: &[GameDay], today: NaiveDate) -> Self {
        Self {
            current_streak: current_streak(days, today),
            longest_streak: longest_streak(days),
        }
    }
}

/// Parse a `YYYY-MM-DD` calendar date. Anything else is rejected.
pub fn parse_date(value: &str) -> Result<NaiveDate, StreakError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| StreakError::InvalidDate(value.to_string()))
}

/// Parse a whole history, failing on the first malformed date.
pub fn parse_attempts(records: &[AttemptRecord]) -> Result<Vec<GameDay>, StreakError> {
    records.iter().map(GameDay::try_from).collect()
}

/// Distinct played days, most recent first.
fn played_days_desc(days: &[GameDay]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates.dedup();
    dates
}

/// Days played back-to-back ending today.
pub fn current_streak(days: &[GameDay], today: NaiveDate) -> u32 {
    let dates = played_days_desc(days);
    let Some((latest, earlier)) = dates.split_first() else {
        return 0;
    };

    if (today - *latest).num_days() != 0 {
        return 0;
    }

    let mut streak = 1u32;
    for date in earlier {
        if (today - *date).num_days() == i64::from(streak) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Longest run of back-to-back played days anywhere in the history.
pub fn longest_streak(days: &[GameDay]) -> u32 {
    let mut dates = played_days_desc(days);
    if dates.is_empty() {
        return 0;
    }
    dates.reverse();

    let mut longest = 1u32;
    let mut running = 1u32;
    for pair in dates.windows(2) {
        if (pair[1] - pair[0]).num_days() == 1 {
            running += 1;
            longest = longest.max(running);
        } else {
            running = 1;
        }
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn played(dates: &[NaiveDate]) -> Vec<GameDay> {
        dates.iter().map(|d| GameDay::new(*d, true, 2)).collect()
    }

    #[test]
    fn empty_history_has_no_streaks() {
        let today = day("2024-06-10");
        assert_eq!(current_streak(&[], today), 0);
        assert_eq!(longest_streak(&[]), 0);
        assert_eq!(StreakState::from_days(&[], today), StreakState::default());
    }

    #[test]
    fn current_streak_counts_back_from_today() {
        let today = day("2024-06-10");
        let days = played(&[today, today - Duration::days(1), today - Duration::days(2)]);
        assert_eq!(current_streak(&days, today), 3);
    }

    #[test]
    fn yesterday_alone_is_not_a_current_streak() {
        let today = day("2024-06-10");
        let days = played(&[today - Duration::days(1), today - Duration::days(2)]);
        assert_eq!(current_streak(&days, today), 0);
        assert_eq!(longest_streak(&days), 2);
    }

    #[test]
    fn current_streak_stops_at_first_gap() {
        let today = day("2024-06-10");
        let days = played(&[
            today - Duration::days(4),
            today,
            today - Duration::days(1),
            today - Duration::days(3),
        ]);
        assert_eq!(current_streak(&days, today), 2);
    }

    #[test]
    fn future_dated_attempt_breaks_current_streak() {
        let today = day("2024-06-10");
        let days = played(&[today + Duration::days(1), today]);
        assert_eq!(current_streak(&days, today), 0);
    }

    #[test]
    fn longest_streak_picks_the_longest_run() {
        let d = day("2024-03-01");
        let days = played(&[
            d + Duration::days(5),
            d,
            d + Duration::days(6),
            d + Duration::days(2),
            d + Duration::days(1),
        ]);
        assert_eq!(longest_streak(&days), 3);
    }

    #[test]
    fn single_attempt_has_longest_streak_one() {
        assert_eq!(longest_streak(&played(&[day("2024-01-01")])), 1);
    }

    #[test]
    fn runs_cross_month_boundaries() {
        let days = played(&[day("2024-02-28"), day("2024-02-29"), day("2024-03-01")]);
        assert_eq!(longest_streak(&days), 3);
        assert_eq!(current_streak(&days, day("2024-03-01")), 3);
    }

    #[test]
    fn duplicate_days_count_once() {
        let today = day("2024-06-10");
        let days = played(&[today, today, today - Duration::days(1)]);
        assert_eq!(current_streak(&days, today), 2);
        assert_eq!(longest_streak(&days), 2);
    }

    #[test]
    fn losses_still_extend_streaks() {
        let records = vec![
            AttemptRecord { date: "2024-01-01".into(), won: true, attempts: 2 },
            AttemptRecord { date: "2024-01-02".into(), won: false, attempts: 4 },
            AttemptRecord { date: "2024-01-03".into(), won: true, attempts: 1 },
        ];
        let days = parse_attempts(&records).unwrap();
        let state = StreakState::from_days(&days, day("2024-01-03"));
        assert_eq!(state.current_streak, 3);
        assert_eq!(state.longest_streak, 3);
    }

    #[test]
    fn recomputing_is_stable() {
        let today = day("2024-06-10");
        let days = played(&[today, today - Duration::days(1), today - Duration::days(7)]);
        let first = StreakState::from_days(&days, today);
        let second = StreakState::from_days(&days, today);
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let records = vec![
            AttemptRecord { date: "2024-01-01".into(), won: true, attempts: 2 },
            AttemptRecord { date: "01/02/2024".into(), won: true, attempts: 2 },
        ];
        assert_eq!(
            parse_attempts(&records),
            Err(StreakError::InvalidDate("01/02/2024".to_string()))
        );
        assert!(parse_date("2024-02-30").is_err());
    }
}
