use crate::domain::error::DomainError;
use crate::domain::validation;
use serde::{Deserialize, Serialize};

pub const NAME_MAX_LEN: usize = 100;
pub const EMAIL_MAX_LEN: usize = 120;
pub const PHONE_MAX_LEN: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl ContactForm {
    pub fn validate(&self) -> Result<NewContactMessage, DomainError> {
        let name = validation::required("Name", &self.name, NAME_MAX_LEN)?;
        let email = validation::email("Email", &self.email, EMAIL_MAX_LEN)?;
        let phone = validation::optional("Phone", &self.phone, PHONE_MAX_LEN)?;
        // The body keeps its inner formatting; only surrounding blank space goes.
        let message = self.message.trim();
        if message.is_empty() {
            return Err(DomainError::Validation("Message is required.".to_string()));
        }

        Ok(NewContactMessage {
            name,
            email,
            phone,
            message: message.to_string(),
        })
    }
}
