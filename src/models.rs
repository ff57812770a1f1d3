pub mod auth;
pub mod catalog;
pub mod delegates;
pub mod requests;
