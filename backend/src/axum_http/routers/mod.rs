pub mod admin;
pub mod auth;
pub mod discord;
pub mod subscriptions;
