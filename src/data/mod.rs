pub mod account_repository;
pub mod contact_repository;
pub mod database;
pub mod migrations;
