pub mod auth;
pub mod catalog;
pub mod pricing;
pub mod request_service;
