//! Per-table handle combining normalisation, resolution and execution.

use std::sync::Arc;

use super::error::UpsertError;
use super::ports::{RoutineCreator, RoutineExecutor, TableContext};
use super::registry::MergeRoutineRegistry;
use super::row::normalize_row;
use super::value::{ColumnKey, RawOption, RawValue};

/// Upserts rows into one table through a shared registry.
pub struct Upsert<T, C, E> {
    table: T,
    registry: Arc<MergeRoutineRegistry<C, E>>,
}

impl<T, C, E> Upsert<T, C, E>
where
    T: TableContext,
    C: RoutineCreator,
    E: RoutineExecutor,
{
    /// Bind `table` to `registry`.
    pub const fn new(table: T, registry: Arc<MergeRoutineRegistry<C, E>>) -> Self {
        Self { table, registry }
    }

    /// Table this handle writes to.
    pub const fn table(&self) -> &T {
        &self.table
    }

    /// Insert or update one row.
    ///
    /// # Errors
    ///
    /// Propagates every [`UpsertError`] from resolution and execution.
    pub fn row<S, SK, SV, W, WK, WV, O, OK, OV>(
        &self,
        selector: S,
        setter: W,
        options: O,
    ) -> Result<(), UpsertError>
    where
        S: IntoIterator<Item = (SK, SV)>,
        SK: Into<ColumnKey>,
        SV: Into<RawValue>,
        W: IntoIterator<Item = (WK, WV)>,
        WK: Into<ColumnKey>,
        WV: Into<RawValue>,
        O: IntoIterator<Item = (OK, OV)>,
        OK: Into<ColumnKey>,
        OV: Into<RawOption>,
    {
        let row = normalize_row(selector, setter, options);
        let routine = self.registry.resolve(&row, &self.table)?;
        self.registry.execute(&routine, &row)
    }

    /// Insert or update a row that only names its selector.
    ///
    /// # Errors
    ///
    /// Propagates every [`UpsertError`] from resolution and execution.
    pub fn row_with_selector<S, SK, SV>(&self, selector: S) -> Result<(), UpsertError>
    where
        S: IntoIterator<Item = (SK, SV)>,
        SK: Into<ColumnKey>,
        SV: Into<RawValue>,
    {
        self.row(
            selector,
            Vec::<(ColumnKey, RawValue)>::new(),
            Vec::<(ColumnKey, RawOption)>::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    //! End-to-end flow through the handle with mocked collaborators.
    use super::*;
    use crate::domain::ports::{
        FixtureRoutineCreator, FixtureTableContext, MockRoutineCreator, MockRoutineExecutor,
    };
    use crate::domain::{IGNORE_ON_UPDATE, Value};
    use rstest::rstest;

    fn tasks() -> FixtureTableContext {
        FixtureTableContext::new("tasks", ["id", "name", "priority", "created_at"])
    }

    #[rstest]
    fn repeated_rows_create_once_and_execute_each_time() {
        let mut creator = MockRoutineCreator::new();
        creator
            .expect_create_routine()
            .times(1)
            .returning(|_, _| Ok(()));
        let mut executor = MockRoutineExecutor::new();
        executor
            .expect_execute_routine()
            .times(2)
            .returning(|_, _| Ok(()));
        let registry = Arc::new(MergeRoutineRegistry::new(
            Arc::new(creator),
            Arc::new(executor),
        ));
        let upsert = Upsert::new(tasks(), registry);

        let no_options = Vec::<(&str, RawOption)>::new;
        upsert
            .row([("id", 1_i64)], [("name", "Clean bathroom")], no_options())
            .expect("first row");
        upsert
            .row([("id", 1_i64)], [("name", "Clean kitchen")], no_options())
            .expect("second row");
    }

    #[rstest]
    fn ignore_on_update_reaches_the_creator() {
        let mut creator = MockRoutineCreator::new();
        creator
            .expect_create_routine()
            .withf(|routine, _| routine.ignore_on_update().contains("priority"))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut executor = MockRoutineExecutor::new();
        executor
            .expect_execute_routine()
            .times(1)
            .returning(|_, _| Ok(()));
        let registry = Arc::new(MergeRoutineRegistry::new(
            Arc::new(creator),
            Arc::new(executor),
        ));
        let upsert = Upsert::new(tasks(), registry);

        upsert
            .row(
                [("id", 1_i64)],
                [("name", "Clean kitchen"), ("priority", "low")],
                [(IGNORE_ON_UPDATE, RawOption::columns(["priority"]))],
            )
            .expect("row applied");
    }

    #[rstest]
    fn selector_only_rows_write_their_selector() {
        let mut executor = MockRoutineExecutor::new();
        executor
            .expect_execute_routine()
            .withf(|_, arguments| arguments.setter == vec![Value::Text("Inky".to_owned())])
            .times(2)
            .returning(|_, _| Ok(()));
        let registry = Arc::new(MergeRoutineRegistry::new(
            Arc::new(FixtureRoutineCreator),
            Arc::new(executor),
        ));
        let upsert = Upsert::new(FixtureTableContext::new("pets", ["name", "gender"]), registry);

        upsert.row_with_selector([("name", "Inky")]).expect("first");
        upsert.row_with_selector([("name", "Inky")]).expect("second");
        assert_eq!(upsert.table().table_name(), "pets");
    }
}
