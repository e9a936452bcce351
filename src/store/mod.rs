//! Persistence layer — per-user conversation answers.

pub mod libsql_backend;
pub mod traits;

pub use libsql_backend::LibSqlStore;
pub use traits::{StateStore, UserRecord};
