use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user as known to this service. The id is the auth provider's subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Identity fields attached to rows in admin views.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// One day's play of the daily guessing game. Unique per (user, date).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAttempt {
    pub id: Uuid,
    pub user_id: String,
    pub date: NaiveDate,
    pub target_pokemon_id: u32,
    pub is_shiny: bool,
    pub guesses: Vec<u32>,
    pub attempts: u8,
    pub won: bool,
    pub pokemon_guessed: Option<u32>,
    pub hints_used: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A palette a user saved for one Pokémon configuration
/// (id, form, shiny). Unique per (user, configuration).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPalette {
    pub id: Uuid,
    pub user_id: String,
    pub pokemon_id: u32,
    pub pokemon_name: String,
    pub pokemon_form: Option<String>,
    pub is_shiny: bool,
    pub colors: Vec<String>,
    pub image_url: Option<String>,
    pub palette_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin-curated palette for a Pokémon, always exactly three colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PokemonColors {
    pub pokemon_id: u32,
    pub colors: Vec<String>,
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,
}
