//! Identity resolution and canonicalisation for merge-routine upserts.
//!
//! Data flows leaf-first: raw input is normalised into a [`Row`], the
//! [`MergeRoutineRegistry`] maps the row's signature to a [`MergeFunction`]
//! (validating columns and creating the routine on first sight), and the
//! row is then dispatched through that routine. Collaborators live behind
//! the traits in [`ports`].

mod error;
mod merge_function;
mod naming;
pub mod ports;
mod registry;
mod row;
mod schema;
mod upsert;
mod value;

pub use error::UpsertError;
pub use merge_function::{MergeFunction, MergeFunctionSignature, RoutineArguments};
pub use naming::{MAX_NAME_LENGTH, generate_name};
pub use registry::MergeRoutineRegistry;
pub use row::{IGNORE_ON_UPDATE, Row, normalize_row};
pub use schema::{InvalidColumnError, validate_columns};
pub use upsert::Upsert;
pub use value::{ColumnKey, OptionValue, RawOption, RawValue, Value};
