//! Ports consumed by the merge routine registry.

mod macros;
pub(crate) use macros::define_port_error;

mod routine_creator;
mod routine_executor;
mod table_context;

#[cfg(test)]
pub use routine_creator::MockRoutineCreator;
pub use routine_creator::{FixtureRoutineCreator, RoutineCreator, RoutineCreatorError};
#[cfg(test)]
pub use routine_executor::MockRoutineExecutor;
pub use routine_executor::{FixtureRoutineExecutor, RoutineExecutor, RoutineExecutorError};
#[cfg(test)]
pub use table_context::MockTableContext;
pub use table_context::{ColumnDefinition, FixtureTableContext, TableContext, TableContextError};
