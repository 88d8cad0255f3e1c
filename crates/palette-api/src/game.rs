use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use palette_core::leaderboard::rank_of;
use palette_core::streak::parse_date;
use palette_core::{GameDay, PlayerStats, SortBy, UserAttempt, build_leaderboard};
use palette_db::models::{NewGameAttempt, Upsert};
use palette_types::api::{
    Claims, GameAttemptResponse, GameAttemptsResponse, LeaderboardResponse, SaveGameAttemptRequest,
};

use crate::convert;
use crate::error::ApiError;
use crate::middleware::decode_claims;
use crate::run_blocking;
use crate::state::AppState;

const MAX_ATTEMPTS: u8 = 4;
const MAX_HINTS: u8 = 3;
const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
const MAX_LEADERBOARD_LIMIT: usize = 100;

/// The calendar day streaks are measured against.
pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

#[derive(Debug, Deserialize)]
pub struct AttemptsQuery {
    #[serde(default)]
    pub stats: bool,
    pub limit: Option<u32>,
    /// Only the attempt for this day (`YYYY-MM-DD`).
    pub date: Option<String>,
}

/// GET /daily-game-attempts: the caller's attempts, newest day first.
///
/// `stats=true` adds totals and streaks computed over the full history,
/// independent of `date` and `limit`.
pub async fn get_attempts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Query(query), _): WithRejection<Query<AttemptsQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(date) = &query.date {
        parse_date(date).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    }

    let want_stats = query.stats;
    let db = state.clone();
    let user_id = claims.sub.clone();
    let (rows, full_history) = run_blocking(move || {
        let rows = db
            .db
            .get_game_attempts(&user_id, query.date.as_deref(), query.limit)?;

        // stats always cover every day played, so a filtered listing needs a
        // second read
        let filtered = query.date.is_some() || query.limit.is_some();
        let full_history = if query.stats && filtered {
            Some(db.db.get_game_attempts(&user_id, None, None)?)
        } else {
            None
        };
        Ok((rows, full_history))
    })
    .await?;

    let attempts = rows
        .into_iter()
        .map(convert::game_attempt)
        .collect::<Result<Vec<_>, _>>()?;

    let stats = if want_stats {
        let days = match full_history {
            Some(history) => history
                .into_iter()
                .map(|row| convert::game_attempt(row).map(|a| convert::game_day(&a)))
                .collect::<Result<Vec<_>, _>>()?,
            None => attempts.iter().map(convert::game_day).collect(),
        };
        Some(PlayerStats::from_days(&days, today()))
    } else {
        None
    };

    Ok(Json(GameAttemptsResponse { attempts, stats }))
}

/// POST /daily-game-attempts: save or replace the caller's attempt for a day.
pub async fn save_attempt(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<SaveGameAttemptRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    parse_date(&req.date).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if req.target_pokemon_id == 0 {
        return Err(ApiError::BadRequest(
            "Missing required fields: date, targetPokemonId, guesses, attempts, won".to_string(),
        ));
    }
    if !(1..=MAX_ATTEMPTS).contains(&req.attempts) {
        return Err(ApiError::BadRequest(format!(
            "Attempts must be between 1 and {}",
            MAX_ATTEMPTS
        )));
    }
    if req.hints_used > MAX_HINTS {
        return Err(ApiError::BadRequest(format!(
            "Hints used must be between 0 and {}",
            MAX_HINTS
        )));
    }

    let db = state.clone();
    let user_id = claims.sub.clone();
    let (row, outcome) = run_blocking(move || {
        let id = Uuid::new_v4().to_string();
        let saved = db.db.upsert_game_attempt(&NewGameAttempt {
            id: &id,
            user_id: &user_id,
            date: &req.date,
            target_pokemon_id: req.target_pokemon_id,
            is_shiny: req.is_shiny,
            guesses: &req.guesses,
            attempts: req.attempts,
            won: req.won,
            pokemon_guessed: req.pokemon_guessed,
            hints_used: req.hints_used,
        })?;
        Ok(saved)
    })
    .await?;

    let attempt = convert::game_attempt(row)?;
    info!(
        "Game attempt {:?} for {} on {} (won: {})",
        outcome, claims.sub, attempt.date, attempt.won
    );

    let (status, message) = match outcome {
        Upsert::Created => (StatusCode::CREATED, "Game attempt saved successfully"),
        Upsert::Updated => (StatusCode::OK, "Game attempt updated successfully"),
    };
    Ok((
        status,
        Json(GameAttemptResponse {
            message: message.to_string(),
            attempt,
        }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
    pub sort_by: Option<String>,
}

/// GET /daily-game-attempts/leaderboard. Public, but a valid bearer token adds
/// the caller's own entry and position.
pub async fn leaderboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    WithRejection(Query(query), _): WithRejection<Query<LeaderboardQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .min(MAX_LEADERBOARD_LIMIT);
    let sort_by = SortBy::parse_or_default(query.sort_by.as_deref());
    let caller = decode_claims(&headers, &state.jwt_secret).ok();

    let db = state.clone();
    let (summaries, users) = run_blocking(move || {
        let summaries = db.db.get_attempt_summaries()?;

        let mut user_ids: Vec<String> = summaries.iter().map(|s| s.user_id.clone()).collect();
        user_ids.sort();
        user_ids.dedup();
        let users = db.db.get_users_by_ids(&user_ids)?;
        Ok((summaries, users))
    })
    .await?;

    let attempts = summaries
        .into_iter()
        .map(|s| {
            Ok::<_, ApiError>(UserAttempt {
                day: GameDay::new(parse_date(&s.date)?, s.won, s.attempts),
                user_id: s.user_id,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let profiles: HashMap<String, _> = users
        .into_iter()
        .map(|u| (u.id.clone(), convert::player_profile(u)))
        .collect();

    let mut board = build_leaderboard(&attempts, &profiles, today(), sort_by);
    debug!("Leaderboard built for {} players ({:?})", board.len(), sort_by);

    let (current_user, current_user_position) = caller
        .as_ref()
        .and_then(|c| rank_of(&board, &c.sub))
        .map(|(position, entry)| (Some(entry.clone()), Some(position)))
        .unwrap_or((None, None));

    board.truncate(limit);

    Ok(Json(LeaderboardResponse {
        leaderboard: board,
        current_user,
        current_user_position,
    }))
}
