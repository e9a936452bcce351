//! libSQL backend — async `StateStore` implementation.
//!
//! Supports local file and in-memory databases. A single connection is
//! reused for all operations; `libsql::Connection` is `Send + Sync` and
//! safe for concurrent async use.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;

use crate::error::DatabaseError;
use crate::store::traits::{StateStore, UserRecord};

/// libSQL state store.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and initialize the schema.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.init_schema().await?;
        info!(path = %path.display(), "State database opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS users (
                    user_id TEXT PRIMARY KEY,
                    target_mood INTEGER,
                    target_location INTEGER
                )",
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to create users table: {e}")))?;
        Ok(())
    }
}

/// Read a nullable INTEGER column.
fn int_or_null(row: &libsql::Row, idx: i32) -> Result<Option<i64>, libsql::Error> {
    match row.get_value(idx)? {
        libsql::Value::Integer(n) => Ok(Some(n)),
        _ => Ok(None),
    }
}

#[async_trait]
impl StateStore for LibSqlStore {
    async fn get(&self, user_id: &str) -> Result<UserRecord, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                "SELECT target_mood, target_location FROM users WHERE user_id = ?1",
                params![user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to read user state: {e}")))?;

        let row = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to read user state row: {e}")))?;

        match row {
            Some(row) => {
                let target_mood = int_or_null(&row, 0)
                    .map_err(|e| DatabaseError::Query(format!("Bad target_mood column: {e}")))?;
                let target_location = int_or_null(&row, 1).map_err(|e| {
                    DatabaseError::Query(format!("Bad target_location column: {e}"))
                })?;
                Ok(UserRecord {
                    target_mood,
                    target_location,
                })
            }
            None => Ok(UserRecord::default()),
        }
    }

    async fn set_mood(&self, user_id: &str, mood: i64) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO users (user_id, target_mood, target_location)
                 VALUES (?1, ?2, -1)
                 ON CONFLICT(user_id) DO UPDATE SET target_mood = excluded.target_mood",
                params![user_id, mood],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to set mood: {e}")))?;
        Ok(())
    }

    async fn set_location(&self, user_id: &str, location: i64) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO users (user_id, target_mood, target_location)
                 VALUES (?1, -1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET target_location = excluded.target_location",
                params![user_id, location],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to set location: {e}")))?;
        Ok(())
    }

    async fn reset(&self, user_id: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO users (user_id, target_mood, target_location)
                 VALUES (?1, -1, -1)
                 ON CONFLICT(user_id) DO UPDATE SET target_mood = -1, target_location = -1",
                params![user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("Failed to reset user state: {e}")))?;
        Ok(())
    }
}
