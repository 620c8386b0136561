pub mod networks;
pub mod plan_codes;
pub mod subscription_statuses;
pub mod user_roles;
pub mod user_statuses;
