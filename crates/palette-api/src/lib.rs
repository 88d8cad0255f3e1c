pub mod admin;
pub mod error;
pub mod extract;
pub mod game;
pub mod middleware;
pub mod palettes;
pub mod state;

mod convert;

use axum::{
    Json, Router,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{delete, get, post},
};
use tracing::error;

use crate::error::ApiError;
use crate::middleware::{require_admin, require_auth};
use crate::state::AppState;

/// All API routes. Transport layers (CORS, tracing) are added by the server.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/daily-game-attempts/leaderboard", get(game::leaderboard))
        .route("/palette/extract", post(extract::extract_palette));

    let protected_routes = Router::new()
        .route(
            "/daily-game-attempts",
            get(game::get_attempts).post(game::save_attempt),
        )
        .route(
            "/saved-palettes",
            get(palettes::list_palettes).post(palettes::save_palette),
        )
        .route("/saved-palettes/{id}", delete(palettes::delete_palette))
        .layer(from_fn_with_state(state.clone(), require_auth));

    // require_auth is the outer layer, so claims are in place for require_admin
    let admin_routes = Router::new()
        .route("/admin/game-data", get(admin::game_data))
        .route("/admin/saved-palettes", get(admin::saved_palettes))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{user_id}", get(admin::user_detail))
        .route(
            "/admin/pokemon-colors",
            get(admin::pokemon_colors).put(admin::update_pokemon_colors),
        )
        .layer(from_fn_with_state(state.clone(), require_admin))
        .layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Run blocking work (SQLite, image decoding) off the async runtime.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(anyhow::anyhow!("blocking task failed: {}", e))
    })?
}
