use crate::domain::error::DomainError;
use crate::domain::validation;
use serde::{Deserialize, Serialize};

pub const USERNAME_MAX_LEN: usize = 100;
pub const NAME_MAX_LEN: usize = 100;
pub const EMAIL_MAX_LEN: usize = 100;

/// A stored credential record from the accounts store.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: String,
}

/// Row to insert; `password_hash` is already a PHC string.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Signup form as posted by the browser. Missing fields read as empty.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub username: String,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Signup fields after trimming and validation.
#[derive(Debug, Clone)]
pub struct ValidSignup {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: String,
}

impl ValidSignup {
    pub fn into_new_account(self, password_hash: String) -> NewAccount {
        NewAccount {
            username: self.username,
            email: self.email,
            password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }
}

impl SignupForm {
    pub fn validate(&self) -> Result<ValidSignup, DomainError> {
        let username = validation::required("Username", &self.username, USERNAME_MAX_LEN)?;
        let email = validation::email("Email", &self.email, EMAIL_MAX_LEN)?;
        let first_name = validation::optional("First name", &self.first_name, NAME_MAX_LEN)?;
        let last_name = validation::optional("Last name", &self.last_name, NAME_MAX_LEN)?;
        if self.password.is_empty() {
            return Err(DomainError::Validation("Password is required.".to_string()));
        }

        Ok(ValidSignup {
            username,
            email,
            first_name,
            last_name,
            password: self.password.clone(),
        })
    }
}
