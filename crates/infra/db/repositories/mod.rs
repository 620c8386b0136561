use diesel::result::{DatabaseErrorKind, Error as DieselError};

pub mod admin_logs;
pub mod subscriptions;
pub mod users;

pub const TX_HASH_UNIQUE_CONSTRAINT: &str = "subscriptions_tx_hash_key";
pub const DISCORD_ID_UNIQUE_CONSTRAINT: &str = "users_discord_id_key";

/// True only when `err` is a unique violation on the named constraint.
pub(crate) fn violates_unique(err: &DieselError, constraint: &str) -> bool {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            info.constraint_name() == Some(constraint)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::DatabaseErrorInformation;

    struct Violation {
        constraint: Option<&'static str>,
    }

    impl DatabaseErrorInformation for Violation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn details(&self) -> Option<&str> {
            None
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            None
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn unique_violation(constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(Violation { constraint }),
        )
    }

    #[test]
    fn matches_only_the_named_constraint() {
        let tx_hash = unique_violation(Some(TX_HASH_UNIQUE_CONSTRAINT));
        assert!(violates_unique(&tx_hash, TX_HASH_UNIQUE_CONSTRAINT));
        assert!(!violates_unique(&tx_hash, DISCORD_ID_UNIQUE_CONSTRAINT));

        let primary_key = unique_violation(Some("subscriptions_pkey"));
        assert!(!violates_unique(&primary_key, TX_HASH_UNIQUE_CONSTRAINT));

        let unnamed = unique_violation(None);
        assert!(!violates_unique(&unnamed, TX_HASH_UNIQUE_CONSTRAINT));
    }

    #[test]
    fn other_errors_never_match() {
        let foreign_key = DieselError::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation,
            Box::new(Violation {
                constraint: Some(TX_HASH_UNIQUE_CONSTRAINT),
            }),
        );
        assert!(!violates_unique(&foreign_key, TX_HASH_UNIQUE_CONSTRAINT));
        assert!(!violates_unique(&DieselError::NotFound, TX_HASH_UNIQUE_CONSTRAINT));
    }
}
