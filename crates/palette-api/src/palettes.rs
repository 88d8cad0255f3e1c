use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::{info, warn};
use uuid::Uuid;

use palette_core::extract::normalize_hex;
use palette_db::models::{NewSavedPalette, Upsert};
use palette_types::api::{
    Claims, MessageResponse, SavePaletteRequest, SavedPaletteResponse, SavedPalettesResponse,
};

use crate::convert;
use crate::error::ApiError;
use crate::run_blocking;
use crate::state::AppState;

pub async fn list_palettes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = run_blocking(move || Ok(db.db.get_saved_palettes(&claims.sub)?)).await?;

    Ok(Json(SavedPalettesResponse {
        palettes: rows.into_iter().map(convert::saved_palette).collect(),
    }))
}

/// One saved palette per (Pokémon, form, shiny) for each user; saving again
/// replaces its colors, image and name.
pub async fn save_palette(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<SavePaletteRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    if req.pokemon_id == 0 || req.pokemon_name.trim().is_empty() || req.colors.is_empty() {
        return Err(ApiError::BadRequest(
            "Missing required fields: pokemonId, pokemonName, colors".to_string(),
        ));
    }
    let colors = req
        .colors
        .iter()
        .map(|c| normalize_hex(c))
        .collect::<Result<Vec<_>, _>>()?;

    let db = state.clone();
    let user_id = claims.sub.clone();
    let (row, outcome) = run_blocking(move || {
        let id = Uuid::new_v4().to_string();
        let saved = db.db.upsert_saved_palette(&NewSavedPalette {
            id: &id,
            user_id: &user_id,
            pokemon_id: req.pokemon_id,
            pokemon_name: req.pokemon_name.trim(),
            pokemon_form: req.pokemon_form.as_deref().filter(|f| !f.is_empty()),
            is_shiny: req.is_shiny,
            colors: &colors,
            image_url: req.image_url.as_deref(),
            palette_name: req.palette_name.as_deref(),
        })?;
        Ok(saved)
    })
    .await?;

    let palette = convert::saved_palette(row);
    info!(
        "Palette {:?} for {}: pokemon {} ({} colors)",
        outcome,
        claims.sub,
        palette.pokemon_id,
        palette.colors.len()
    );

    let (status, message) = match outcome {
        Upsert::Created => (StatusCode::CREATED, "Palette saved successfully"),
        Upsert::Updated => (StatusCode::OK, "Palette updated successfully"),
    };
    Ok((
        status,
        Json(SavedPaletteResponse {
            message: message.to_string(),
            palette,
        }),
    ))
}

pub async fn delete_palette(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let palette_id = id.clone();
    let owner = run_blocking(move || Ok(db.db.get_saved_palette_owner(&palette_id)?)).await?;

    match owner {
        None => return Err(ApiError::NotFound("Palette not found".to_string())),
        Some(owner) if owner != claims.sub => {
            warn!("User {} tried to delete palette {} owned by {}", claims.sub, id, owner);
            return Err(ApiError::Forbidden(
                "Unauthorized to delete this palette".to_string(),
            ));
        }
        Some(_) => {}
    }

    let db = state.clone();
    let palette_id = id.clone();
    let deleted = run_blocking(move || Ok(db.db.delete_saved_palette(&palette_id)?)).await?;
    if !deleted {
        // removed between the ownership check and the delete
        return Err(ApiError::NotFound("Palette not found".to_string()));
    }

    info!("Palette {} deleted by {}", id, claims.sub);
    Ok(Json(MessageResponse {
        message: "Palette deleted successfully".to_string(),
    }))
}
