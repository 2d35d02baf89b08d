//! Port for materialising merge routines in the data store.

use crate::domain::MergeFunction;

use super::{ColumnDefinition, define_port_error};

define_port_error! {
    /// Errors raised while creating a merge routine.
    pub enum RoutineCreatorError {
        /// Connection to the backing datastore failed.
        Connection {
            /// Driver detail.
            message: String
        } => "routine creation connection failed: {message}",
        /// The routine definition was rejected.
        Statement {
            /// Driver detail.
            message: String
        } => "routine creation failed: {message}",
    }
}

/// Port that installs the server-side routine for one signature.
///
/// The registry calls this at most once per signature at a time; adapters
/// should still create idempotently (e.g. `CREATE OR REPLACE`).
#[cfg_attr(test, mockall::automock)]
pub trait RoutineCreator: Send + Sync {
    /// Create the routine described by `routine` using the table's `columns`.
    fn create_routine(
        &self,
        routine: &MergeFunction,
        columns: &[ColumnDefinition],
    ) -> Result<(), RoutineCreatorError>;
}

/// Creator that records nothing and always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureRoutineCreator;

impl RoutineCreator for FixtureRoutineCreator {
    fn create_routine(
        &self,
        _routine: &MergeFunction,
        _columns: &[ColumnDefinition],
    ) -> Result<(), RoutineCreatorError> {
        Ok(())
    }
}
