use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Username already taken. Please choose a different one.")]
    UsernameTaken,
    #[error("Email is already in use. Please use a different one.")]
    EmailTaken,
    #[error("Invalid credentials, please try again.")]
    InvalidCredentials,
    #[error("{0}")]
    Validation(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
