pub mod account;
pub mod contact;
pub mod error;
pub mod repository;
pub mod validation;
