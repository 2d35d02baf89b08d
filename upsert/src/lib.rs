//! Identity resolution and canonicalisation behind insert-or-update.
//!
//! Backends without an atomic upsert statement need a server-side merge
//! routine per table and column combination. This crate decides which
//! routine a row needs, names it deterministically within identifier length
//! limits, validates the referenced columns, and makes sure each routine is
//! created at most once per process.
//!
//! - [`domain`] holds row normalisation, naming, validation, the registry and
//!   the ports it calls out to.
//! - [`outbound`] implements those ports for PostgreSQL.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use upsert::domain::ports::{FixtureRoutineCreator, FixtureRoutineExecutor, FixtureTableContext};
//! use upsert::domain::{MergeRoutineRegistry, RawOption, normalize_row};
//!
//! let registry = MergeRoutineRegistry::new(
//!     Arc::new(FixtureRoutineCreator),
//!     Arc::new(FixtureRoutineExecutor),
//! );
//! let pets = FixtureTableContext::new("pets", ["name", "gender", "tag_number"]);
//! let row = normalize_row([("name", "Jerry")], [("gender", "male")], Vec::<(&str, RawOption)>::new());
//!
//! let routine = registry.resolve(&row, &pets).expect("columns exist");
//! assert_eq!(routine.name(), "upsert_pets_SEL_name_SET_gender_A_name");
//! registry.execute(&routine, &row).expect("fixture executor accepts every row");
//! ```

pub mod domain;
pub mod outbound;
