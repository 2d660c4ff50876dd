use crate::data::database::Store;
use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

const ACCOUNTS_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        username    TEXT NOT NULL UNIQUE,
        password    TEXT NOT NULL,
        firstname   TEXT,
        lastname    TEXT,
        email       TEXT NOT NULL UNIQUE,
        created_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );
";

const CONTACTS_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS contacts (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL,
        email       TEXT NOT NULL,
        phone       TEXT,
        message     TEXT NOT NULL,
        created_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );
";

pub fn run(conn: &Connection, store: Store) -> Result<()> {
    let schema = match store {
        Store::Accounts => ACCOUNTS_SCHEMA,
        Store::Contacts => CONTACTS_SCHEMA,
    };
    conn.execute_batch(schema)?;

    info!(store = %store, "Database migrations complete");
    Ok(())
}
