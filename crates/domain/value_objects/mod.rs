pub mod admin_logs;
pub mod enums;
pub mod networks;
pub mod plans;
pub mod subscriptions;
pub mod users;
