use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::{debug, info};

use palette_core::extract::normalize_hex;
use palette_core::{GameSummary, PlayerStats, pad_palette};
use palette_types::api::{
    AdminGameAttempt, AdminGameDataResponse, AdminUserDetailResponse, Claims,
    PokemonColorsListResponse, PokemonColorsResponse, SavedPalettesResponse,
    UpdatePokemonColorsRequest, UsersResponse,
};

use crate::convert;
use crate::error::ApiError;
use crate::run_blocking;
use crate::state::AppState;

/// Attempts included in a user's detail view.
const USER_DETAIL_ATTEMPTS: u32 = 50;
/// Curated palettes always carry this many colors.
const POKEMON_PALETTE_LEN: usize = 3;

/// Every attempt with its player, plus totals across all players.
pub async fn game_data(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let (rows, users) = run_blocking(move || {
        let rows = db.db.get_all_game_attempts()?;

        let mut user_ids: Vec<String> = rows.iter().map(|r| r.user_id.clone()).collect();
        user_ids.sort();
        user_ids.dedup();
        let users = db.db.get_users_by_ids(&user_ids)?;
        Ok((rows, users))
    })
    .await?;

    let users: HashMap<_, _> = users
        .iter()
        .map(|u| (u.id.as_str(), convert::user_summary(u)))
        .collect();

    let stats = GameSummary::summarize(rows.iter().map(|r| (r.won, r.attempts, r.hints_used)));

    let game_attempts = rows
        .into_iter()
        .map(|row| {
            let user = users.get(row.user_id.as_str()).cloned();
            Ok::<_, ApiError>(AdminGameAttempt {
                attempt: convert::game_attempt(row)?,
                user,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Admin game data: {} attempts", game_attempts.len());
    Ok(Json(AdminGameDataResponse {
        game_attempts,
        stats,
    }))
}

pub async fn saved_palettes(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = run_blocking(move || Ok(db.db.get_all_saved_palettes()?)).await?;

    Ok(Json(SavedPalettesResponse {
        palettes: rows.into_iter().map(convert::saved_palette).collect(),
    }))
}

/// Every non-deleted user, newest first.
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = run_blocking(move || Ok(db.db.list_users()?)).await?;

    Ok(Json(UsersResponse {
        users: rows.into_iter().map(convert::user).collect(),
    }))
}

/// One user with their latest attempts, stats over those attempts and saved palettes.
pub async fn user_detail(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let found = run_blocking(move || {
        let Some(user) = db.db.get_user(&user_id)?.filter(|u| !u.is_deleted) else {
            return Ok(None);
        };
        let attempts = db
            .db
            .get_game_attempts(&user.id, None, Some(USER_DETAIL_ATTEMPTS))?;
        let palettes = db.db.get_saved_palettes(&user.id)?;
        Ok(Some((user, attempts, palettes)))
    })
    .await?;

    let Some((user, attempts, palettes)) = found else {
        return Err(ApiError::NotFound("User not found".to_string()));
    };

    let game_attempts = attempts
        .into_iter()
        .map(convert::game_attempt)
        .collect::<Result<Vec<_>, _>>()?;
    let days: Vec<_> = game_attempts.iter().map(convert::game_day).collect();
    let game_stats = PlayerStats::from_days(&days, crate::game::today()).rounded();

    Ok(Json(AdminUserDetailResponse {
        user: convert::user(user),
        game_attempts,
        game_stats,
        saved_palettes: palettes.into_iter().map(convert::saved_palette).collect(),
    }))
}

pub async fn pokemon_colors(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = run_blocking(move || Ok(db.db.get_pokemon_colors()?)).await?;

    Ok(Json(PokemonColorsListResponse {
        pokemon: rows.into_iter().map(convert::pokemon_colors).collect(),
    }))
}

/// Replaces a Pokémon's curated palette. Extra colors are dropped and short
/// lists are padded with their last color.
pub async fn update_pokemon_colors(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<UpdatePokemonColorsRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    if req.pokemon_id == 0 || req.colors.is_empty() {
        return Err(ApiError::BadRequest(
            "Invalid request: pokemonId and colors array required".to_string(),
        ));
    }
    let colors = req
        .colors
        .iter()
        .map(|c| normalize_hex(c))
        .collect::<Result<Vec<_>, _>>()?;
    let colors = pad_palette(&colors, POKEMON_PALETTE_LEN);

    let db = state.clone();
    let pokemon_id = req.pokemon_id;
    let admin_id = claims.sub.clone();
    let row = run_blocking(move || Ok(db.db.set_pokemon_colors(pokemon_id, &colors, &admin_id)?))
        .await?;

    info!("Pokemon {} colors set to {:?} by {}", row.pokemon_id, row.colors, claims.sub);
    Ok(Json(PokemonColorsResponse {
        message: "Pokemon color palette updated successfully".to_string(),
        pokemon_id: row.pokemon_id,
        colors: row.colors,
    }))
}
