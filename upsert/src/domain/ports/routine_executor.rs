//! Port for running one row through a merge routine.

use crate::domain::{MergeFunction, RoutineArguments};

use super::define_port_error;

define_port_error! {
    /// Errors raised while executing a merge routine.
    pub enum RoutineExecutorError {
        /// Connection to the backing datastore failed.
        Connection {
            /// Driver detail.
            message: String
        } => "routine execution connection failed: {message}",
        /// The routine call failed.
        Statement {
            /// Driver detail.
            message: String
        } => "routine execution failed: {message}",
    }
}

/// Port that invokes a previously resolved merge routine.
#[cfg_attr(test, mockall::automock)]
pub trait RoutineExecutor: Send + Sync {
    /// Run `routine` with arguments in its declared parameter order.
    fn execute_routine(
        &self,
        routine: &MergeFunction,
        arguments: &RoutineArguments,
    ) -> Result<(), RoutineExecutorError>;
}

/// Executor that discards every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureRoutineExecutor;

impl RoutineExecutor for FixtureRoutineExecutor {
    fn execute_routine(
        &self,
        _routine: &MergeFunction,
        _arguments: &RoutineArguments,
    ) -> Result<(), RoutineExecutorError> {
        Ok(())
    }
}
