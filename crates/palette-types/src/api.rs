use serde::{Deserialize, Serialize};

use palette_core::{Extraction, GameSummary, LeaderboardEntry, PlayerStats};

use crate::models::{GameAttempt, PokemonColors, SavedPalette, User, UserSummary};

// -- JWT Claims --

/// Claims of the bearer tokens issued by the auth provider. Only `sub` and
/// `exp` are required; profile fields are copied onto the user row when
/// present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// -- Daily game --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SaveGameAttemptRequest {
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub target_pokemon_id: u32,
    #[serde(default)]
    pub is_shiny: bool,
    pub guesses: Vec<u32>,
    pub attempts: u8,
    pub won: bool,
    #[serde(default)]
    pub pokemon_guessed: Option<u32>,
    #[serde(default)]
    pub hints_used: u8,
}

#[derive(Debug, Serialize)]
pub struct GameAttemptResponse {
    pub message: String,
    pub attempt: GameAttempt,
}

#[derive(Debug, Serialize)]
pub struct GameAttemptsResponse {
    pub attempts: Vec<GameAttempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<PlayerStats>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub current_user: Option<LeaderboardEntry>,
    pub current_user_position: Option<usize>,
}

// -- Saved palettes --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SavePaletteRequest {
    pub pokemon_id: u32,
    pub pokemon_name: String,
    #[serde(default)]
    pub pokemon_form: Option<String>,
    #[serde(default)]
    pub is_shiny: bool,
    pub colors: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub palette_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SavedPaletteResponse {
    pub message: String,
    pub palette: SavedPalette,
}

#[derive(Debug, Serialize)]
pub struct SavedPalettesResponse {
    pub palettes: Vec<SavedPalette>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// -- Palette extraction --

fn default_color_count() -> usize {
    3
}

/// Exactly one of `url` or `image_base64` must be set.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExtractPaletteRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default = "default_color_count")]
    pub count: usize,
    #[serde(default)]
    pub include_frequencies: bool,
}

#[derive(Debug, Serialize)]
pub struct ExtractPaletteResponse {
    pub colors: Extraction,
}

// -- Admin --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminGameAttempt {
    #[serde(flatten)]
    pub attempt: GameAttempt,
    pub user: Option<UserSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminGameDataResponse {
    pub game_attempts: Vec<AdminGameAttempt>,
    pub stats: GameSummary,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

/// One user's profile with their recent games and saved palettes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserDetailResponse {
    pub user: User,
    pub game_attempts: Vec<GameAttempt>,
    pub game_stats: PlayerStats,
    pub saved_palettes: Vec<SavedPalette>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdatePokemonColorsRequest {
    pub pokemon_id: u32,
    pub colors: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PokemonColorsResponse {
    pub message: String,
    pub pokemon_id: u32,
    pub colors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PokemonColorsListResponse {
    pub pokemon: Vec<PokemonColors>,
}
