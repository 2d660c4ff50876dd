use crate::data::database::Database;
use crate::domain::contact::{ContactMessage, NewContactMessage};
use crate::domain::error::DomainError;
use crate::domain::repository::ContactRepository;
use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, Row};
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct SqliteContactRepository {
    db: Arc<Database>,
}

impl SqliteContactRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<ContactMessage> {
    Ok(ContactMessage {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        message: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn query_message(conn: &Connection, id: i64) -> Result<Option<ContactMessage>> {
    let message = conn
        .query_row(
            "SELECT id, name, email, phone, message, created_at FROM contacts WHERE id = ?1",
            [id],
            row_to_message,
        )
        .optional()?;
    Ok(message)
}

#[async_trait]
impl ContactRepository for SqliteContactRepository {
    #[instrument(skip(self, message), fields(email = %message.email))]
    async fn insert_message(&self, message: NewContactMessage) -> Result<ContactMessage> {
        let db = self.db.clone();
        let saved = tokio::task::spawn_blocking(move || {
            db.with_tx(|tx| {
                tx.execute(
                    "INSERT INTO contacts (name, email, phone, message) VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![message.name, message.email, message.phone, message.message],
                )?;
                let id = tx.last_insert_rowid();
                query_message(tx, id)?.ok_or_else(|| {
                    DomainError::Internal(format!("Contact message {id} vanished after insert")).into()
                })
            })
        })
        .await??;
        debug!(message_id = saved.id, "Contact message saved");
        Ok(saved)
    }
}
