use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Subscriber,
    Admin,
    Superadmin,
}

impl UserRole {
    /// Admin roles are never touched by subscription logic.
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Superadmin)
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "subscriber" => UserRole::Subscriber,
            "admin" => UserRole::Admin,
            "superadmin" => UserRole::Superadmin,
            _ => UserRole::User,
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let role = match self {
            UserRole::User => "user",
            UserRole::Subscriber => "subscriber",
            UserRole::Admin => "admin",
            UserRole::Superadmin => "superadmin",
        };
        write!(f, "{}", role)
    }
}
