pub mod auth;
pub mod delegate;
pub mod i18n;
