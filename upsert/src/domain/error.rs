//! Errors surfaced by the upsert core.

use thiserror::Error;

use super::ports::{RoutineCreatorError, RoutineExecutorError, TableContextError};
use super::schema::InvalidColumnError;

/// Errors returned by resolution and execution.
///
/// Collaborator errors are passed through unchanged; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpsertError {
    /// The row references columns the table does not have.
    #[error("table '{table}': {source}")]
    InvalidColumns {
        /// Table the row targeted.
        table: String,
        /// Offending columns.
        #[source]
        source: InvalidColumnError,
    },
    /// The row has neither selector nor setter columns.
    #[error("row for table '{table}' names no columns")]
    EmptyRow {
        /// Table the row targeted.
        table: String,
    },
    /// The table could not be described.
    #[error(transparent)]
    TableContext(#[from] TableContextError),
    /// The merge routine could not be created.
    #[error(transparent)]
    RoutineCreation(#[from] RoutineCreatorError),
    /// The merge routine call failed.
    #[error(transparent)]
    RoutineExecution(#[from] RoutineExecutorError),
    /// A row was dispatched through a routine built for other key-sets.
    #[error(
        "row does not match routine {routine}: expected selector {expected_selector:?} and setter {expected_setter:?}, got {actual_selector:?} and {actual_setter:?}"
    )]
    RowShapeMismatch {
        /// Routine name.
        routine: String,
        /// Selector keys the routine was built for.
        expected_selector: Vec<String>,
        /// Setter keys the routine was built for.
        expected_setter: Vec<String>,
        /// Selector keys of the row.
        actual_selector: Vec<String>,
        /// Setter keys of the row.
        actual_setter: Vec<String>,
    },
}

impl UpsertError {
    /// Attach the target table to a validation failure.
    pub fn invalid_columns(table: impl Into<String>, source: InvalidColumnError) -> Self {
        Self::InvalidColumns {
            table: table.into(),
            source,
        }
    }
}
