//! Errors raised while executing statements.

use thiserror::Error;

pub type StmtResult<T> = Result<T, StmtError>;

/// SQLSTATE codes classified by [`StmtError::from_db_error`].
pub mod sqlstate {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const CHECK_VIOLATION: &str = "23514";
    pub const SERIALIZATION_FAILURE: &str = "40001";
}

/// Execution and transaction errors. Building a statement never fails.
#[derive(Debug, Error)]
pub enum StmtError {
    /// Driver or database error without a more specific variant.
    #[error("Query error: {0}")]
    Query(tokio_postgres::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violation: {constraint}: {message}")]
    UniqueViolation { constraint: String, message: String },

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Concurrent serializable transactions conflicted; the transaction may be retried.
    #[error("Serialization failure: {0}")]
    SerializationFailure(String),

    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Returned from a transaction body to roll back without reporting an error.
    #[error("transaction aborted")]
    AbortTx,

    #[error("{0}")]
    Other(String),
}

impl StmtError {
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Whether the transaction may succeed if run again (SQLSTATE 40001).
    pub fn is_serialization_failure(&self) -> bool {
        matches!(self, Self::SerializationFailure(_))
    }

    /// Whether a unique constraint failed; `Some(name)` also checks which one.
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::UniqueViolation { constraint: c, .. } => {
                constraint.is_none_or(|want| want == c.as_str())
            }
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Classify a driver error by SQLSTATE.
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        let classified = err
            .as_db_error()
            .and_then(|db| classify(db.code().code(), db.constraint(), db.message()));
        match classified {
            Some(specific) => specific,
            None => Self::Query(err),
        }
    }
}

/// `?` on a driver error keeps the SQLSTATE classification, so a
/// serialization failure raised inside a transaction body is still retried.
impl From<tokio_postgres::Error> for StmtError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::from_db_error(err)
    }
}

fn classify(code: &str, constraint: Option<&str>, message: &str) -> Option<StmtError> {
    let constraint = constraint.unwrap_or("unknown");
    let err = match code {
        sqlstate::UNIQUE_VIOLATION => StmtError::UniqueViolation {
            constraint: constraint.to_string(),
            message: message.to_string(),
        },
        sqlstate::FOREIGN_KEY_VIOLATION => {
            StmtError::ForeignKeyViolation(format!("{}: {}", constraint, message))
        }
        sqlstate::CHECK_VIOLATION => {
            StmtError::CheckViolation(format!("{}: {}", constraint, message))
        }
        sqlstate::SERIALIZATION_FAILURE => StmtError::SerializationFailure(message.to_string()),
        _ => return None,
    };
    Some(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_constraint_filter() {
        let err = StmtError::UniqueViolation {
            constraint: "users_email_key".into(),
            message: "duplicate key value".into(),
        };
        assert!(err.is_unique_violation(None));
        assert!(err.is_unique_violation(Some("users_email_key")));
        assert!(!err.is_unique_violation(Some("users_pkey")));
        assert!(!StmtError::AbortTx.is_unique_violation(None));
    }

    #[test]
    fn test_classification_helpers() {
        assert!(StmtError::SerializationFailure("x".into()).is_serialization_failure());
        assert!(!StmtError::Other("x".into()).is_serialization_failure());
        assert!(StmtError::not_found("none").is_not_found());
    }

    #[test]
    fn test_classify_sqlstate() {
        let err = classify(
            tokio_postgres::error::SqlState::T_R_SERIALIZATION_FAILURE.code(),
            None,
            "could not serialize access",
        );
        assert!(err.is_some_and(|e| e.is_serialization_failure()));

        let err = classify("23505", Some("users_pkey"), "duplicate");
        assert!(err.is_some_and(|e| e.is_unique_violation(Some("users_pkey"))));

        let err = classify("23503", None, "missing parent");
        assert!(matches!(
            err,
            Some(StmtError::ForeignKeyViolation(m)) if m == "unknown: missing parent"
        ));

        assert!(classify("42P01", None, "undefined table").is_none());
    }

    #[test]
    fn test_display() {
        let err = StmtError::decode("id", "unexpected null");
        assert_eq!(err.to_string(), "Decode error on column 'id': unexpected null");
        let err = StmtError::UniqueViolation {
            constraint: "users_pkey".into(),
            message: "duplicate".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unique constraint violation: users_pkey: duplicate"
        );
    }
}
