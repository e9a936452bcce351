//! `StateStore` trait — async interface for the per-user answer record.

use async_trait::async_trait;

use crate::error::DatabaseError;

/// Stored answers for one user.
///
/// An absent row reads as both fields `None` ("never set"). A stored `-1`
/// means "explicitly cleared" — a completed flow resets both fields to `-1`
/// rather than deleting the row, so a returning user skips the introduction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRecord {
    pub target_mood: Option<i64>,
    pub target_location: Option<i64>,
}

/// Backend-agnostic store for conversation answers.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the record for a user. Absent records return the default.
    async fn get(&self, user_id: &str) -> Result<UserRecord, DatabaseError>;

    /// Set the user's mood answer.
    ///
    /// Updates `target_mood` on an existing row; inserts `(mood, -1)` when
    /// the user has no row yet.
    async fn set_mood(&self, user_id: &str, mood: i64) -> Result<(), DatabaseError>;

    /// Set the user's location answer.
    ///
    /// Updates `target_location` on an existing row; inserts `(-1, location)`
    /// when the user has no row yet.
    async fn set_location(&self, user_id: &str, location: i64) -> Result<(), DatabaseError>;

    /// Reset both answers to `-1`. Idempotent.
    async fn reset(&self, user_id: &str) -> Result<(), DatabaseError>;
}
