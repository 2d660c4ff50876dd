use crate::data::migrations;
use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, Transaction};
use std::fmt;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Which of the two stores a `Database` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Store {
    Accounts,
    Contacts,
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Store::Accounts => f.write_str("accounts"),
            Store::Contacts => f.write_str("contacts"),
        }
    }
}

/// One SQLite connection, serialised behind a mutex.
pub struct Database {
    conn: Mutex<Connection>,
    store: Store,
}

impl Database {
    pub fn open(path: &Path, store: Store) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create directory {} for {store} store", parent.display())
            })?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open {store} store at {}", path.display()))?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn, store)?;

        info!(store = %store, path = %path.display(), "Database opened");
        Ok(Self {
            conn: Mutex::new(conn),
            store,
        })
    }

    pub fn open_in_memory(store: Store) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn, store)?;
        debug!(store = %store, "In-memory database opened");
        Ok(Self {
            conn: Mutex::new(conn),
            store,
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }

    /// Runs `f` inside a transaction. Commits when `f` succeeds, rolls back
    /// and returns the original error otherwise.
    pub fn with_tx<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| anyhow!("DB lock poisoned: {}", e))?;
        let tx = conn.transaction()?;
        match f(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                warn!(store = %self.store, error = %err, "Rolling back transaction");
                if let Err(rollback_err) = tx.rollback() {
                    warn!(store = %self.store, error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}
