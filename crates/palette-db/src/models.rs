/// Row types as read from SQLite.
/// Dates and timestamps stay as stored text; the API layer parses them.

pub struct UserRow {
    pub id: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
    pub is_admin: bool,
    pub is_deleted: bool,
    pub created_at: String,
}

pub struct GameAttemptRow {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub target_pokemon_id: u32,
    pub is_shiny: bool,
    pub guesses: Vec<u32>,
    pub attempts: u8,
    pub won: bool,
    pub pokemon_guessed: Option<u32>,
    pub hints_used: u8,
    pub created_at: String,
    pub updated_at: String,
}

/// The columns the leaderboard needs, for every player.
pub struct AttemptSummaryRow {
    pub user_id: String,
    pub date: String,
    pub won: bool,
    pub attempts: u8,
}

pub struct NewGameAttempt<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub date: &'a str,
    pub target_pokemon_id: u32,
    pub is_shiny: bool,
    pub guesses: &'a [u32],
    pub attempts: u8,
    pub won: bool,
    pub pokemon_guessed: Option<u32>,
    pub hints_used: u8,
}

pub struct SavedPaletteRow {
    pub id: String,
    pub user_id: String,
    pub pokemon_id: u32,
    pub pokemon_name: String,
    pub pokemon_form: Option<String>,
    pub is_shiny: bool,
    pub colors: Vec<String>,
    pub image_url: Option<String>,
    pub palette_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct NewSavedPalette<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub pokemon_id: u32,
    pub pokemon_name: &'a str,
    pub pokemon_form: Option<&'a str>,
    pub is_shiny: bool,
    pub colors: &'a [String],
    pub image_url: Option<&'a str>,
    pub palette_name: Option<&'a str>,
}

pub struct PokemonColorsRow {
    pub pokemon_id: u32,
    pub colors: Vec<String>,
    pub updated_by: String,
    pub updated_at: String,
}

/// Whether an upsert created the row or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}
