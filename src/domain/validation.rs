//! Field-level checks shared by the signup and contact forms.
//!
//! Text fields are trimmed before checking. Blank optional fields become
//! `None` so they are stored as NULL rather than empty strings.

use crate::domain::error::DomainError;

pub fn required(label: &str, value: &str, max_len: usize) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::Validation(format!("{label} is required.")));
    }
    check_len(label, value, max_len)?;
    Ok(value.to_string())
}

pub fn optional(label: &str, value: &str, max_len: usize) -> Result<Option<String>, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    check_len(label, value, max_len)?;
    Ok(Some(value.to_string()))
}

pub fn email(label: &str, value: &str, max_len: usize) -> Result<String, DomainError> {
    let value = required(label, value, max_len)?;
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !value.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(DomainError::Validation(
            "Please enter a valid email address.".to_string(),
        ));
    }
    Ok(value)
}

fn check_len(label: &str, value: &str, max_len: usize) -> Result<(), DomainError> {
    if value.chars().count() > max_len {
        return Err(DomainError::Validation(format!(
            "{label} must be at most {max_len} characters."
        )));
    }
    Ok(())
}
