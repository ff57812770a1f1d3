pub mod auth;
pub mod catalog;
pub mod delegates;
pub mod pricing;
pub mod requests;
