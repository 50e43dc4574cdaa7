//! Shared handler state.
//!
//! # Responsibility
//! - Own the single SQLite connection shared by all requests.
//! - Run entry use-cases on the blocking pool against that connection.
//!
//! # Invariants
//! - Each use-case builds a fresh repository/service over the locked connection.
//! - The async runtime never blocks on SQLite work.

use crate::error::{ApiError, ApiResult};
use greenledger_core::{EntryService, RepoResult, SqliteEntryRepository};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// State injected into every handler.
#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Wraps a migrated connection for shared use.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `op` against an entry service bound to the shared connection.
    ///
    /// # Errors
    /// - Repository errors are converted with `ApiError::from`.
    /// - A poisoned lock or failed blocking task maps to `ApiError::Storage`.
    pub async fn with_entry_service<T, F>(&self, op: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: for<'conn> FnOnce(&EntryService<SqliteEntryRepository<'conn>>) -> RepoResult<T>
            + Send
            + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| ApiError::Storage("entry store lock poisoned".to_string()))?;
            let repo = SqliteEntryRepository::try_new(&guard)?;
            let service = EntryService::new(repo);
            let outcome = op(&service);
            outcome.map_err(ApiError::from)
        })
        .await
        .map_err(|err| ApiError::Storage(format!("entry store task failed: {err}")))?
    }
}
