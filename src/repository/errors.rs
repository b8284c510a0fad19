use diesel::r2d2::{Error as R2D2Error, PoolError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::domain::types::TypeConstraintError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("entity not found")]
    NotFound,

    /// A unique index rejected the write (duplicate email, dedupe key, ...).
    #[error("duplicate entry: {0}")]
    Duplicate(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    /// A stored row could not be turned back into a domain value.
    #[error("invalid stored row: {0}")]
    InvalidRow(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RepositoryError::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                RepositoryError::Duplicate(info.message().to_string())
            }
            DieselError::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::NotNullViolation
                | DatabaseErrorKind::CheckViolation,
                info,
            ) => RepositoryError::Constraint(info.message().to_string()),
            DieselError::DeserializationError(e) => RepositoryError::InvalidRow(e.to_string()),
            other => RepositoryError::Database(other.to_string()),
        }
    }
}

impl From<R2D2Error> for RepositoryError {
    fn from(err: R2D2Error) -> Self {
        RepositoryError::Connection(err.to_string())
    }
}

impl From<PoolError> for RepositoryError {
    fn from(err: PoolError) -> Self {
        RepositoryError::Connection(err.to_string())
    }
}

/// Only loaded rows pass through this conversion; input is validated before
/// it reaches the repository.
impl From<TypeConstraintError> for RepositoryError {
    fn from(err: TypeConstraintError) -> Self {
        RepositoryError::InvalidRow(err.to_string())
    }
}
