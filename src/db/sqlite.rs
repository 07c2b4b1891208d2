use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::ConnectOptions;

use super::{DatabaseError, DB_NAME, DB_VERSION, RECORD_ID, STORE_NAME};

/// SQLite file standing in for the browser's IndexedDB.
#[derive(Clone, Debug)]
pub struct WebhookDb {
    path: PathBuf,
}

impl WebhookDb {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{}.sqlite", DB_NAME)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored URL, or `None` if it was never saved.
    pub async fn load(&self) -> Result<Option<String>, DatabaseError> {
        let mut conn = self.open().await?;
        let sql = format!("SELECT url FROM {} WHERE id = ?1", STORE_NAME);
        sqlx::query_scalar::<_, String>(&sql)
            .bind(RECORD_ID)
            .fetch_optional(&mut conn)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load webhook URL: {}", e);
                DatabaseError::Load(e.to_string())
            })
    }

    pub async fn save(&self, url: &str) -> Result<(), DatabaseError> {
        let mut conn = self.open().await?;
        let sql = format!(
            "INSERT INTO {} (id, url) VALUES (?1, ?2) ON CONFLICT(id) DO UPDATE SET url = excluded.url",
            STORE_NAME
        );
        sqlx::query(&sql)
            .bind(RECORD_ID)
            .bind(url)
            .execute(&mut conn)
            .await
            .map_err(|e| {
                tracing::error!("Failed to save webhook URL: {}", e);
                DatabaseError::Save(e.to_string())
            })?;
        Ok(())
    }

    async fn open(&self) -> Result<SqliteConnection, DatabaseError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| connection_error(e.to_string()))?;
        }

        let mut conn = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true)
            .connect()
            .await
            .map_err(|e| connection_error(e.to_string()))?;

        let version: i64 = sqlx::query_scalar("PRAGMA user_version")
            .fetch_one(&mut conn)
            .await
            .map_err(|e| connection_error(e.to_string()))?;
        if version < i64::from(DB_VERSION) {
            upgrade(&mut conn)
                .await
                .map_err(|e| connection_error(e.to_string()))?;
        }

        Ok(conn)
    }
}

/// Runs once per database file, when it is first opened at this version.
async fn upgrade(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    tracing::info!("Creating {} store in {}", STORE_NAME, DB_NAME);
    let create = format!(
        "CREATE TABLE IF NOT EXISTS {} (id TEXT PRIMARY KEY NOT NULL, url TEXT NOT NULL)",
        STORE_NAME
    );
    sqlx::query(&create).execute(&mut *conn).await?;
    // PRAGMA values cannot be bound.
    sqlx::query(&format!("PRAGMA user_version = {}", DB_VERSION))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

fn connection_error(reason: String) -> DatabaseError {
    tracing::error!("Database connection error: {}", reason);
    DatabaseError::Connection(reason)
}
