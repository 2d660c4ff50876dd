use crate::domain::account::{Account, LoginForm, SignupForm};
use crate::domain::error::DomainError;
use crate::domain::repository::AccountRepository;
use crate::infrastructure::security::{hash_password, verify_password};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};

pub struct AuthService<R: AccountRepository> {
    account_repository: Arc<R>,
}

impl<R: AccountRepository> AuthService<R> {
    pub fn new(account_repository: Arc<R>) -> Self {
        Self { account_repository }
    }

    /// Creates an account. Username is checked before email, so a form that
    /// collides on both reports the username.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn signup(&self, form: SignupForm) -> Result<Account> {
        trace!("Starting signup");
        let valid = form.validate()?;

        if self
            .account_repository
            .find_by_username(&valid.username)
            .await?
            .is_some()
        {
            warn!(username = %valid.username, "Username already taken");
            return Err(DomainError::UsernameTaken.into());
        }
        if self
            .account_repository
            .find_by_email(&valid.email)
            .await?
            .is_some()
        {
            warn!(email = %valid.email, "Email already in use");
            return Err(DomainError::EmailTaken.into());
        }

        // Argon2 is CPU-bound; keep it off the async workers.
        let password = valid.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await?
            .map_err(|e| {
                error!(error = %e, "Failed to hash password");
                DomainError::Internal(format!("Failed to hash password: {}", e))
            })?;

        debug!(username = %valid.username, "Saving account");
        let account = self
            .account_repository
            .insert_account(valid.into_new_account(password_hash))
            .await?;

        info!(
            account_id = account.id,
            username = %account.username,
            "Account created"
        );
        Ok(account)
    }

    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn login(&self, form: LoginForm) -> Result<Account> {
        trace!("Starting login");

        // Same normalisation as signup, which stores the trimmed username.
        let username = form.username.trim();
        let account = self
            .account_repository
            .find_by_username(username)
            .await?
            .ok_or_else(|| {
                warn!("Unknown username during login");
                DomainError::InvalidCredentials
            })?;

        let password = form.password.clone();
        let password_hash = account.password_hash.clone();
        let is_valid = tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await?
            .map_err(|e| {
                error!(account_id = account.id, error = %e, "Stored password hash is unreadable");
                DomainError::Internal(format!("Failed to verify password: {}", e))
            })?;

        if !is_valid {
            warn!(account_id = account.id, "Invalid password during login");
            return Err(DomainError::InvalidCredentials.into());
        }

        info!(account_id = account.id, username = %account.username, "Login successful");
        Ok(account)
    }
}
