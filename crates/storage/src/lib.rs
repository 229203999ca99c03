use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{PlayerId, Position};

/// SQLite-backed position store. One row per player, keyed by fid.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        let storage = Self { pool };
        storage.ensure_players_table().await?;
        Ok(storage)
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn ensure_players_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS players (
                id         INTEGER PRIMARY KEY,
                x          INTEGER NOT NULL,
                y          INTEGER NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure players table exists")?;
        Ok(())
    }

    pub async fn position(&self, player: PlayerId) -> Result<Option<Position>> {
        let row = sqlx::query("SELECT x, y FROM players WHERE id = ?")
            .bind(player.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| Position::new(r.get::<i64, _>(0), r.get::<i64, _>(1))))
    }

    /// Insert-if-absent. First writer wins; returns whatever the row holds
    /// afterwards, so concurrent seeders agree on one position.
    pub async fn seed_position(&self, player: PlayerId, spawn: Position) -> Result<Position> {
        let row = sqlx::query(
            "INSERT INTO players (id, x, y) VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET id=excluded.id
             RETURNING x, y",
        )
        .bind(player.0)
        .bind(spawn.x)
        .bind(spawn.y)
        .fetch_one(&self.pool)
        .await?;
        Ok(Position::new(row.get::<i64, _>(0), row.get::<i64, _>(1)))
    }

    /// Conditional write: commits `next` only while the row still holds
    /// `expected`. Returns false when another writer got there first.
    pub async fn update_position_if(
        &self,
        player: PlayerId,
        expected: Position,
        next: Position,
    ) -> Result<bool> {
        let row = sqlx::query(
            "UPDATE players SET x = ?, y = ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ? AND x = ? AND y = ?
             RETURNING id",
        )
        .bind(next.x)
        .bind(next.y)
        .bind(player.0)
        .bind(expected.x)
        .bind(expected.y)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
