//! Error taxonomy shared by the schema helpers and the reports.
//!
//! Every failing SQLite call is funnelled through [`QueryContext`], which
//! attaches a short description of what was being attempted and sorts the
//! underlying `rusqlite` error into one of the variants below. A filter that
//! matches nothing is not an error: reports return `None` or an empty `Vec`.

use rusqlite::{Error as SqlError, ErrorCode};
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RecordsError>;

#[derive(Debug, Error)]
pub enum RecordsError {
    /// A uniqueness, required-field, check or foreign key constraint
    /// rejected the statement. SQLite rolls the statement back, so the
    /// store is left unchanged.
    #[error("constraint violation while trying to {action}: {detail}")]
    ConstraintViolation { action: &'static str, detail: String },

    /// The backing store could not be opened or read.
    #[error("database unavailable while trying to {action}")]
    Connectivity {
        action: &'static str,
        #[source]
        source: SqlError,
    },

    /// An update or delete addressed a row that does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("failed to {action}")]
    Query {
        action: &'static str,
        #[source]
        source: SqlError,
    },
}

impl RecordsError {
    /// Sort a raw SQLite error into the taxonomy.
    pub fn from_sql(action: &'static str, err: SqlError) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => RecordsError::ConstraintViolation {
                action,
                detail: constraint_detail(&err),
            },
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::SystemIoFailure
                | ErrorCode::PermissionDenied
                | ErrorCode::ReadOnly,
            ) => RecordsError::Connectivity { action, source: err },
            _ => RecordsError::Query { action, source: err },
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, RecordsError::ConstraintViolation { .. })
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, RecordsError::Connectivity { .. })
    }
}

/// SQLite puts the interesting part ("UNIQUE constraint failed: students.email")
/// in the extended message; fall back to the generic description otherwise.
fn constraint_detail(err: &SqlError) -> String {
    match err {
        SqlError::SqliteFailure(_, Some(message)) => message.clone(),
        other => other.to_string(),
    }
}

/// `anyhow::Context`-style helper for `rusqlite` results.
pub trait QueryContext<T> {
    fn query_context(self, action: &'static str) -> Result<T>;
}

impl<T> QueryContext<T> for std::result::Result<T, SqlError> {
    fn query_context(self, action: &'static str) -> Result<T> {
        self.map_err(|err| RecordsError::from_sql(action, err))
    }
}
