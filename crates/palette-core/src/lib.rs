//! Palette extraction and daily-game scoring.
//!
//! Everything in this crate is synchronous and free of I/O apart from image
//! decoding. Request handlers do the fetching and storage, then call in here.

pub mod error;
pub mod extract;
pub mod leaderboard;
pub mod stats;
pub mod streak;

pub use error::{ExtractError, StreakError};
pub use extract::{
    ColorExtractor, DEFAULT_FILL_COLOR, ExtractedColor, Extraction, ExtractorConfig, pad_palette,
};
pub use leaderboard::{LeaderboardEntry, PlayerProfile, SortBy, UserAttempt, build_leaderboard};
pub use stats::{GameSummary, PlayerStats};
pub use streak::{AttemptRecord, GameDay, StreakState, current_streak, longest_streak};
