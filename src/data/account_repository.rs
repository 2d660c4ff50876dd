use crate::data::database::Database;
use crate::domain::account::{Account, NewAccount};
use crate::domain::error::DomainError;
use crate::domain::repository::AccountRepository;
use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, Row, ToSql};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

const ACCOUNT_COLUMNS: &str = "id, username, email, password, firstname, lastname, created_at";

#[derive(Clone)]
pub struct SqliteAccountRepository {
    db: Arc<Database>,
}

impl SqliteAccountRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

fn row_to_account(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        first_name: row.get(4)?,
        last_name: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn query_account(conn: &Connection, column: &str, value: impl ToSql) -> Result<Option<Account>> {
    let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE {column} = ?1");
    let account = conn
        .query_row(&sql, [value], row_to_account)
        .optional()?;
    Ok(account)
}

/// Maps a UNIQUE violation on `users` to the matching domain error.
fn map_unique_violation(err: rusqlite::Error) -> anyhow::Error {
    if let rusqlite::Error::SqliteFailure(code, Some(msg)) = &err {
        if code.code == rusqlite::ErrorCode::ConstraintViolation {
            if msg.contains("users.username") {
                return DomainError::UsernameTaken.into();
            }
            if msg.contains("users.email") {
                return DomainError::EmailTaken.into();
            }
        }
    }
    err.into()
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    #[instrument(skip(self, account), fields(username = %account.username, email = %account.email))]
    async fn insert_account(&self, account: NewAccount) -> Result<Account> {
        trace!("Inserting account into accounts store");
        let db = self.db.clone();
        let saved = tokio::task::spawn_blocking(move || {
            db.with_tx(|tx| {
                tx.execute(
                    "INSERT INTO users (username, password, firstname, lastname, email) VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![
                        account.username,
                        account.password_hash,
                        account.first_name,
                        account.last_name,
                        account.email,
                    ],
                )
                .map_err(map_unique_violation)?;
                let id = tx.last_insert_rowid();
                query_account(tx, "id", id)?.ok_or_else(|| {
                    DomainError::Internal(format!("Account {id} vanished after insert")).into()
                })
            })
        })
        .await??;
        debug!(account_id = saved.id, username = %saved.username, "Account saved");
        Ok(saved)
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let db = self.db.clone();
        let username = username.to_string();
        let account = tokio::task::spawn_blocking(move || {
            db.with_conn(|conn| query_account(conn, "username", &username))
        })
        .await??;
        match &account {
            Some(a) => debug!(account_id = a.id, "Account found by username"),
            None => trace!("No account with this username"),
        }
        Ok(account)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let db = self.db.clone();
        let email = email.to_string();
        let account = tokio::task::spawn_blocking(move || {
            db.with_conn(|conn| query_account(conn, "email", &email))
        })
        .await??;
        match &account {
            Some(a) => debug!(account_id = a.id, "Account found by email"),
            None => trace!("No account with this email"),
        }
        Ok(account)
    }
}
