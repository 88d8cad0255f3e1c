use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (users, daily game, saved palettes)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                email       TEXT,
                username    TEXT,
                first_name  TEXT,
                last_name   TEXT,
                image_url   TEXT,
                is_admin    INTEGER NOT NULL DEFAULT 0,
                is_deleted  INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            -- One row per user per calendar day; later writes replace earlier ones.
            CREATE TABLE daily_game_attempts (
                id                  TEXT PRIMARY KEY,
                user_id             TEXT NOT NULL REFERENCES users(id),
                date                TEXT NOT NULL,
                target_pokemon_id   INTEGER NOT NULL,
                is_shiny            INTEGER NOT NULL DEFAULT 0,
                guesses             TEXT NOT NULL DEFAULT '[]',
                attempts            INTEGER NOT NULL CHECK (attempts BETWEEN 1 AND 4),
                won                 INTEGER NOT NULL,
                pokemon_guessed     INTEGER,
                hints_used          INTEGER NOT NULL DEFAULT 0,
                created_at          TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at          TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(user_id, date)
            );

            CREATE INDEX idx_game_attempts_date
                ON daily_game_attempts(date);

            -- pokemon_form is '' for the base form so the UNIQUE key holds.
            CREATE TABLE saved_palettes (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL REFERENCES users(id),
                pokemon_id      INTEGER NOT NULL,
                pokemon_name    TEXT NOT NULL,
                pokemon_form    TEXT NOT NULL DEFAULT '',
                is_shiny        INTEGER NOT NULL DEFAULT 0,
                colors          TEXT NOT NULL,
                image_url       TEXT,
                palette_name    TEXT,
                created_at      TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at      TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(user_id, pokemon_id, pokemon_form, is_shiny)
            );

            CREATE INDEX idx_saved_palettes_user
                ON saved_palettes(user_id, created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    if version < 2 {
        info!("Running migration v2 (pokemon color overrides)");
        conn.execute_batch(
            "
            -- Admin-curated palettes that replace the extracted default.
            CREATE TABLE pokemon_colors (
                pokemon_id  INTEGER PRIMARY KEY,
                colors      TEXT NOT NULL,
                updated_by  TEXT NOT NULL REFERENCES users(id),
                updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            INSERT INTO schema_version (version) VALUES (2);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
