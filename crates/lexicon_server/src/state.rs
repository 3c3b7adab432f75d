//! Shared application state.
//!
//! The backend connection is the only shared object. Each request borrows it
//! on a blocking thread for the duration of its backend calls.

use crate::config::ServerConfig;
use crate::error::ApiError;
use log::error;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    config: Arc<ServerConfig>,
}

impl AppState {
    /// Wraps a migrated connection and the server config.
    pub fn new(conn: Connection, config: ServerConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Runs `work` against the backend connection on a blocking thread.
    ///
    /// A panic inside `work` or a poisoned lock becomes
    /// [`ApiError::Unexpected`] instead of taking the process down.
    pub async fn with_connection<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let joined = tokio::task::spawn_blocking(move || {
            let conn = db.lock().map_err(|_| {
                error!("event=db_lock module=http status=error error_code=lock_poisoned");
                ApiError::Unexpected
            })?;
            work(&conn)
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(err) => {
                error!(
                    "event=handler_join module=http status=error error_code=task_failed error={}",
                    err
                );
                Err(ApiError::Unexpected)
            }
        }
    }
}
