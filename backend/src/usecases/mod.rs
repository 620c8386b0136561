pub mod admin;
pub mod audit_log;
pub mod auth;
pub mod discord;
pub mod role_reconciliation;
pub mod subscriptions;
