//! Error taxonomy shared by the stores, the services and the HTTP layer.

use thiserror::Error;

pub type Result<T, E = RegisterError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("category {0} does not exist")]
    UnknownCategory(i64),

    #[error("category {0} is still referenced by one or more risks")]
    CategoryInUse(i64),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl RegisterError {
    pub fn risk_not_found(id: i64) -> Self {
        Self::NotFound { entity: "risk", id }
    }

    pub fn category_not_found(id: i64) -> Self {
        Self::NotFound { entity: "category", id }
    }

    /// True for errors caused by the request rather than by the service.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Migration(_))
    }
}

/// A stored enum column held a value outside its closed set.
#[derive(Debug, Error)]
#[error("unknown {kind} value `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_entity() {
        let err = RegisterError::risk_not_found(7);
        assert_eq!(err.to_string(), "risk 7 not found");

        let err = RegisterError::category_not_found(3);
        assert!(err.to_string().contains("category 3"));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(RegisterError::Validation("bad".into()).is_client_error());
        assert!(RegisterError::CategoryInUse(1).is_client_error());
        assert!(!RegisterError::Database(sqlx::Error::RowNotFound).is_client_error());
    }
}
