pub mod admin_logs;
pub mod subscriptions;
pub mod users;
