use crate::domain::account::{Account, NewAccount};
use crate::domain::contact::{ContactMessage, NewContactMessage};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Inserts a new account. Unique violations surface as
    /// `DomainError::UsernameTaken` or `DomainError::EmailTaken`.
    async fn insert_account(&self, account: NewAccount) -> Result<Account>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;
}

#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Contact messages are write-only; nothing reads them back.
    async fn insert_message(&self, message: NewContactMessage) -> Result<ContactMessage>;
}
