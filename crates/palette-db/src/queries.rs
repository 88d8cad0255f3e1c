use crate::Database;
use crate::models::{
    AttemptSummaryRow, GameAttemptRow, NewGameAttempt, NewSavedPalette, PokemonColorsRow,
    SavedPaletteRow, Upsert, UserRow,
};
use anyhow::Result;
use rusqlite::{Connection, Row, types::Type};

const USER_COLUMNS: &str =
    "id, email, username, first_name, last_name, image_url, is_admin, is_deleted, created_at";

/// Ids per `IN (...)` lookup, well under SQLite's bound-variable limit.
const ID_BATCH_SIZE: usize = 500;

const ATTEMPT_COLUMNS: &str = "id, user_id, date, target_pokemon_id, is_shiny, guesses, attempts, \
     won, pokemon_guessed, hints_used, created_at, updated_at";

const PALETTE_COLUMNS: &str = "id, user_id, pokemon_id, pokemon_name, pokemon_form, is_shiny, \
     colors, image_url, palette_name, created_at, updated_at";

impl Database {
    // -- Users --

    /// Create the user on first sight; afterwards only fill in profile
    /// fields that the caller actually knows.
    pub fn ensure_user(
        &self,
        id: &str,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                    username = COALESCE(excluded.username, users.username),
                    email = COALESCE(excluded.email, users.email)",
                (id, username, email),
            )?;
            Ok(())
        })
    }

    pub fn set_admin(&self, id: &str, is_admin: bool) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users SET is_admin = ?2 WHERE id = ?1",
                rusqlite::params![id, is_admin],
            )?;
            Ok(())
        })
    }

    pub fn get_user(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
            let row = conn.query_row(&sql, [id], user_from_row).optional()?;
            Ok(row)
        })
    }

    /// Batch-fetch users for a set of ids. Unknown ids are skipped.
    pub fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<UserRow>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let mut users = Vec::with_capacity(ids.len());
            for batch in ids.chunks(ID_BATCH_SIZE) {
                let placeholders: Vec<String> =
                    (1..=batch.len()).map(|i| format!("?{}", i)).collect();
                let sql = format!(
                    "SELECT {} FROM users WHERE id IN ({})",
                    USER_COLUMNS,
                    placeholders.join(", ")
                );

                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(rusqlite::params_from_iter(batch.iter()), user_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                users.extend(rows);
            }

            Ok(users)
        })
    }

    /// Every user that hasn't been deleted, newest first.
    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM users WHERE is_deleted = 0 ORDER BY created_at DESC, rowid DESC",
                USER_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Daily game --

    /// Insert or replace the attempt for (user, date).
    pub fn upsert_game_attempt(&self, new: &NewGameAttempt<'_>) -> Result<(GameAttemptRow, Upsert)> {
        let guesses = serde_json::to_string(new.guesses)?;

        self.with_conn_mut(|conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT id FROM daily_game_attempts WHERE user_id = ?1 AND date = ?2",
                    (new.user_id, new.date),
                    |row| row.get(0),
                )
                .optional()?;

            conn.execute(
                "INSERT INTO daily_game_attempts
                    (id, user_id, date, target_pokemon_id, is_shiny, guesses, attempts, won,
                     pokemon_guessed, hints_used)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(user_id, date) DO UPDATE SET
                    target_pokemon_id = excluded.target_pokemon_id,
                    is_shiny = excluded.is_shiny,
                    guesses = excluded.guesses,
                    attempts = excluded.attempts,
                    won = excluded.won,
                    pokemon_guessed = excluded.pokemon_guessed,
                    hints_used = excluded.hints_used,
                    updated_at = datetime('now')",
                rusqlite::params![
                    new.id,
                    new.user_id,
                    new.date,
                    new.target_pokemon_id,
                    new.is_shiny,
                    guesses,
                    new.attempts,
                    new.won,
                    new.pokemon_guessed,
                    new.hints_used,
                ],
            )?;

            let sql = format!(
                "SELECT {} FROM daily_game_attempts WHERE user_id = ?1 AND date = ?2",
                ATTEMPT_COLUMNS
            );
            let row = conn.query_row(&sql, (new.user_id, new.date), attempt_from_row)?;
            let outcome = if existing.is_some() {
                Upsert::Updated
            } else {
                Upsert::Created
            };
            Ok((row, outcome))
        })
    }

    /// A user's attempts, newest day first.
    pub fn get_game_attempts(
        &self,
        user_id: &str,
        date: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<GameAttemptRow>> {
        // LIMIT -1 means no limit in SQLite
        let limit = limit.map(i64::from).unwrap_or(-1);

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM daily_game_attempts
                 WHERE user_id = ?1 AND (?2 IS NULL OR date = ?2)
                 ORDER BY date DESC
                 LIMIT ?3",
                ATTEMPT_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![user_id, date, limit], attempt_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Every attempt by every user, most recently created first.
    pub fn get_all_game_attempts(&self) -> Result<Vec<GameAttemptRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM daily_game_attempts ORDER BY created_at DESC, rowid DESC",
                ATTEMPT_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], attempt_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Leaderboard input: every attempt, newest day first.
    pub fn get_attempt_summaries(&self) -> Result<Vec<AttemptSummaryRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, date, won, attempts FROM daily_game_attempts
                 ORDER BY date DESC, rowid ASC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(AttemptSummaryRow {
                        user_id: row.get(0)?,
                        date: row.get(1)?,
                        won: row.get(2)?,
                        attempts: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Saved palettes --

    /// Insert a palette, or update colors, image and name of the one already
    /// saved for the same Pokémon configuration.
    pub fn upsert_saved_palette(
        &self,
        new: &NewSavedPalette<'_>,
    ) -> Result<(SavedPaletteRow, Upsert)> {
        let colors = serde_json::to_string(new.colors)?;
        let form = new.pokemon_form.unwrap_or("");

        self.with_conn_mut(|conn| {
            let key = rusqlite::params![new.user_id, new.pokemon_id, form, new.is_shiny];

            let existing: Option<String> = conn
                .query_row(
                    "SELECT id FROM saved_palettes
                     WHERE user_id = ?1 AND pokemon_id = ?2 AND pokemon_form = ?3 AND is_shiny = ?4",
                    key,
                    |row| row.get(0),
                )
                .optional()?;

            conn.execute(
                "INSERT INTO saved_palettes
                    (id, user_id, pokemon_id, pokemon_name, pokemon_form, is_shiny, colors,
                     image_url, palette_name)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(user_id, pokemon_id, pokemon_form, is_shiny) DO UPDATE SET
                    colors = excluded.colors,
                    image_url = excluded.image_url,
                    palette_name = excluded.palette_name,
                    updated_at = datetime('now')",
                rusqlite::params![
                    new.id,
                    new.user_id,
                    new.pokemon_id,
                    new.pokemon_name,
                    form,
                    new.is_shiny,
                    colors,
                    new.image_url,
                    new.palette_name,
                ],
            )?;

            let sql = format!(
                "SELECT {} FROM saved_palettes
                 WHERE user_id = ?1 AND pokemon_id = ?2 AND pokemon_form = ?3 AND is_shiny = ?4",
                PALETTE_COLUMNS
            );
            let row = conn.query_row(&sql, key, palette_from_row)?;
            let outcome = if existing.is_some() {
                Upsert::Updated
            } else {
                Upsert::Created
            };
            Ok((row, outcome))
        })
    }

    pub fn get_saved_palettes(&self, user_id: &str) -> Result<Vec<SavedPaletteRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM saved_palettes WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
                PALETTE_COLUMNS
            );
            query_palettes(conn, &sql, [user_id])
        })
    }

    pub fn get_all_saved_palettes(&self) -> Result<Vec<SavedPaletteRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM saved_palettes ORDER BY created_at DESC, rowid DESC",
                PALETTE_COLUMNS
            );
            query_palettes(conn, &sql, [])
        })
    }

    pub fn get_saved_palette_owner(&self, id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let owner = conn
                .query_row("SELECT user_id FROM saved_palettes WHERE id = ?1", [id], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(owner)
        })
    }

    /// Returns false when no palette had that id.
    pub fn delete_saved_palette(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let deleted = conn.execute("DELETE FROM saved_palettes WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    // -- Pokémon color overrides --

    pub fn set_pokemon_colors(
        &self,
        pokemon_id: u32,
        colors: &[String],
        updated_by: &str,
    ) -> Result<PokemonColorsRow> {
        let encoded = serde_json::to_string(colors)?;

        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO pokemon_colors (pokemon_id, colors, updated_by) VALUES (?1, ?2, ?3)
                 ON CONFLICT(pokemon_id) DO UPDATE SET
                    colors = excluded.colors,
                    updated_by = excluded.updated_by,
                    updated_at = datetime('now')",
                rusqlite::params![pokemon_id, encoded, updated_by],
            )?;

            let row = conn.query_row(
                "SELECT pokemon_id, colors, updated_by, updated_at FROM pokemon_colors
                 WHERE pokemon_id = ?1",
                [pokemon_id],
                pokemon_colors_from_row,
            )?;
            Ok(row)
        })
    }

    pub fn get_pokemon_colors(&self) -> Result<Vec<PokemonColorsRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT pokemon_id, colors, updated_by, updated_at FROM pokemon_colors
                 ORDER BY pokemon_id",
            )?;
            let rows = stmt
                .query_map([], pokemon_colors_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_palettes<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<SavedPaletteRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, palette_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        image_url: row.get(5)?,
        is_admin: row.get(6)?,
        is_deleted: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn attempt_from_row(row: &Row<'_>) -> rusqlite::Result<GameAttemptRow> {
    let guesses: String = row.get(5)?;
    Ok(GameAttemptRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: row.get(2)?,
        target_pokemon_id: row.get(3)?,
        is_shiny: row.get(4)?,
        guesses: serde_json::from_str(&guesses)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?,
        attempts: row.get(6)?,
        won: row.get(7)?,
        pokemon_guessed: row.get(8)?,
        hints_used: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn palette_from_row(row: &Row<'_>) -> rusqlite::Result<SavedPaletteRow> {
    let form: String = row.get(4)?;
    let colors: String = row.get(6)?;
    Ok(SavedPaletteRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        pokemon_id: row.get(2)?,
        pokemon_name: row.get(3)?,
        pokemon_form: if form.is_empty() { None } else { Some(form) },
        is_shiny: row.get(5)?,
        colors: serde_json::from_str(&colors)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?,
        image_url: row.get(7)?,
        palette_name: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn pokemon_colors_from_row(row: &Row<'_>) -> rusqlite::Result<PokemonColorsRow> {
    let colors: String = row.get(1)?;
    Ok(PokemonColorsRow {
        pokemon_id: row.get(0)?,
        colors: serde_json::from_str(&colors)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?,
        updated_by: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
