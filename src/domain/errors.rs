//! Domain errors for the attainment service.

use thiserror::Error;

/// Domain-level errors surfaced by the scoring services.
///
/// Each variant corresponds to one outward status class: bad input is
/// rejected before any mutation, lookups that resolve to nothing are
/// `NotFound`, duplicate administrative inserts are `Conflict`, and
/// everything the backing store reports is a `StorageFault`.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage fault: {0}")]
    StorageFault(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Short machine-readable code for the error class.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::StorageFault(_) => "STORAGE_FAULT",
        }
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::Conflict(db_err.message().to_string());
            }
        }
        Self::StorageFault(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            DomainError::InvalidInput(String::new()).code(),
            DomainError::NotFound(String::new()).code(),
            DomainError::Conflict(String::new()).code(),
            DomainError::StorageFault(String::new()).code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_non_database_sqlx_error_is_storage_fault() {
        let err: DomainError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DomainError::StorageFault(_)));
    }
}
