use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};

use shared::domain::UserSession;

/// Local persistence for the cached user session. A single device holds at
/// most one signed-in session, so the table is a single-row store that is
/// replaced wholesale on every write.
#[derive(Clone)]
pub struct SessionStore {
    pool: Pool<Sqlite>,
}

impl SessionStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        let store = Self { pool };
        store.ensure_session_table().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn ensure_session_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cached_session (
                slot        INTEGER PRIMARY KEY CHECK (slot = 0),
                session_id  TEXT NOT NULL,
                nickname    TEXT NOT NULL,
                avatar      TEXT NOT NULL,
                phone       TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure cached_session table exists")?;
        Ok(())
    }

    pub async fn load_session(&self) -> Result<Option<UserSession>> {
        let row = sqlx::query(
            "SELECT session_id, nickname, avatar, phone FROM cached_session WHERE slot = 0",
        )
        .fetch_optional(&self.pool)
        .await
        .context("failed to load cached session")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(UserSession {
            session_id: row.try_get("session_id")?,
            nickname: row.try_get("nickname")?,
            avatar: row.try_get("avatar")?,
            phone: row.try_get("phone")?,
        }))
    }

    pub async fn save_session(&self, session: &UserSession) -> Result<()> {
        let updated_at: DateTime<Utc> = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO cached_session (slot, session_id, nickname, avatar, phone, updated_at)
            VALUES (0, ?, ?, ?, ?, ?)
            ON CONFLICT (slot) DO UPDATE SET
                session_id = excluded.session_id,
                nickname   = excluded.nickname,
                avatar     = excluded.avatar,
                phone      = excluded.phone,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&session.session_id)
        .bind(&session.nickname)
        .bind(&session.avatar)
        .bind(&session.phone)
        .bind(updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("failed to save cached session")?;
        Ok(())
    }

    pub async fn clear_session(&self) -> Result<()> {
        sqlx::query("DELETE FROM cached_session WHERE slot = 0")
            .execute(&self.pool)
            .await
            .context("failed to clear cached session")?;
        Ok(())
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
