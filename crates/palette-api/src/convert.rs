//! Row → API model conversion.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use palette_core::streak::parse_date;
use palette_core::{GameDay, PlayerProfile};
use palette_db::models::{GameAttemptRow, PokemonColorsRow, SavedPaletteRow, UserRow};
use palette_types::models::{GameAttempt, PokemonColors, SavedPalette, User, UserSummary};

use crate::error::ApiError;

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
pub(crate) fn parse_timestamp(value: &str, row_id: &str) -> DateTime<Utc> {
    value
        .parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on row '{}': {}", value, row_id, e);
            DateTime::default()
        })
}

fn parse_id(value: &str) -> Uuid {
    value.parse().unwrap_or_else(|e| {
        warn!("Corrupt row id '{}': {}", value, e);
        Uuid::default()
    })
}

pub(crate) fn game_attempt(row: GameAttemptRow) -> Result<GameAttempt, ApiError> {
    Ok(GameAttempt {
        id: parse_id(&row.id),
        date: parse_date(&row.date)?,
        created_at: parse_timestamp(&row.created_at, &row.id),
        updated_at: parse_timestamp(&row.updated_at, &row.id),
        user_id: row.user_id,
        target_pokemon_id: row.target_pokemon_id,
        is_shiny: row.is_shiny,
        guesses: row.guesses,
        attempts: row.attempts,
        won: row.won,
        pokemon_guessed: row.pokemon_guessed,
        hints_used: row.hints_used,
    })
}

pub(crate) fn game_day(attempt: &GameAttempt) -> GameDay {
    GameDay::new(attempt.date, attempt.won, attempt.attempts)
}

pub(crate) fn saved_palette(row: SavedPaletteRow) -> SavedPalette {
    SavedPalette {
        id: parse_id(&row.id),
        created_at: parse_timestamp(&row.created_at, &row.id),
        updated_at: parse_timestamp(&row.updated_at, &row.id),
        user_id: row.user_id,
        pokemon_id: row.pokemon_id,
        pokemon_name: row.pokemon_name,
        pokemon_form: row.pokemon_form,
        is_shiny: row.is_shiny,
        colors: row.colors,
        image_url: row.image_url,
        palette_name: row.palette_name,
    }
}

pub(crate) fn user(row: UserRow) -> User {
    User {
        created_at: parse_timestamp(&row.created_at, &row.id),
        id: row.id,
        email: row.email,
        username: row.username,
        first_name: row.first_name,
        last_name: row.last_name,
        image_url: row.image_url,
        is_admin: row.is_admin,
    }
}

pub(crate) fn user_summary(row: &UserRow) -> UserSummary {
    UserSummary {
        id: row.id.clone(),
        email: row.email.clone(),
        username: row.username.clone(),
        first_name: row.first_name.clone(),
        last_name: row.last_name.clone(),
    }
}

pub(crate) fn player_profile(row: UserRow) -> PlayerProfile {
    PlayerProfile {
        username: row.username,
        first_name: row.first_name,
        last_name: row.last_name,
        image_url: row.image_url,
    }
}

pub(crate) fn pokemon_colors(row: PokemonColorsRow) -> PokemonColors {
    PokemonColors {
        updated_at: parse_timestamp(&row.updated_at, &row.pokemon_id.to_string()),
        pokemon_id: row.pokemon_id,
        colors: row.colors,
        updated_by: row.updated_by,
    }
}
