//! PL/pgSQL merge routine rendering, creation and invocation.

use std::collections::HashMap;

use postgres::types::ToSql;

use crate::domain::{MergeFunction, RoutineArguments, Value};
use crate::domain::ports::{
    ColumnDefinition, RoutineCreator, RoutineCreatorError, RoutineExecutor, RoutineExecutorError,
};

use super::{SharedClient, map_postgres_error_message, quote_ident};

/// Creation timestamps are never overwritten by the update branch.
const CREATED_COLUMNS: [&str; 2] = ["created_at", "created_on"];

const FALLBACK_TYPE: &str = "text";

/// Render the `CREATE OR REPLACE FUNCTION` statement for `routine`.
///
/// Parameters are positional `text` values, selector columns first and
/// setter columns after, each cast to its column type where used. The body
/// updates the matching row and falls back to an insert, retrying the update
/// when a concurrent insert wins the unique constraint. Without selector
/// columns the routine only inserts. The registry never resolves a row
/// without setter columns, so the insert always names at least one column.
#[must_use]
pub fn merge_routine_sql(routine: &MergeFunction, columns: &[ColumnDefinition]) -> String {
    let types: HashMap<&str, &str> = columns
        .iter()
        .map(|column| (column.name.as_str(), column.sql_type.as_str()))
        .collect();
    let cast = |position: usize, column: &str| {
        let sql_type = types.get(column).copied().unwrap_or(FALLBACK_TYPE);
        format!("${position}::{sql_type}")
    };

    let selector: Vec<(&str, String)> = routine
        .selector_keys()
        .iter()
        .enumerate()
        .map(|(index, column)| (column.as_str(), cast(index + 1, column.as_str())))
        .collect();
    let offset = selector.len();
    let setter: Vec<(&str, String)> = routine
        .setter_keys()
        .iter()
        .enumerate()
        .map(|(index, column)| (column.as_str(), cast(offset + index + 1, column.as_str())))
        .collect();

    let ignored = routine.ignore_on_update();
    let assignments = setter
        .iter()
        .filter(|(column, _)| !ignored.contains(*column) && !CREATED_COLUMNS.contains(column))
        .map(|(column, value)| format!("{} = {value}", quote_ident(column)))
        .collect::<Vec<_>>()
        .join(", ");
    let conditions = selector
        .iter()
        .map(|(column, value)| format!("{} = {value}", quote_ident(column)))
        .collect::<Vec<_>>()
        .join(" AND ");
    let insert_columns = setter
        .iter()
        .map(|(column, _)| quote_ident(column))
        .collect::<Vec<_>>()
        .join(", ");
    let insert_values = setter
        .iter()
        .map(|(_, value)| value.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let parameters = vec![FALLBACK_TYPE; selector.len() + setter.len()].join(", ");
    let table = routine.quoted_table_name();

    let update_step = if conditions.is_empty() {
        String::new()
    } else if assignments.is_empty() {
        format!(
            "    PERFORM 1 FROM {table} WHERE {conditions};\n    IF FOUND THEN\n      RETURN;\n    END IF;\n"
        )
    } else {
        format!(
            "    UPDATE {table} SET {assignments} WHERE {conditions};\n    IF FOUND THEN\n      RETURN;\n    END IF;\n"
        )
    };

    format!(
        "CREATE OR REPLACE FUNCTION {name}({parameters}) RETURNS VOID AS\n\
         $upsert$\n\
         BEGIN\n\
         \x20 LOOP\n\
         {update_step}\
         \x20   BEGIN\n\
         \x20     INSERT INTO {table} ({insert_columns}) VALUES ({insert_values});\n\
         \x20     RETURN;\n\
         \x20   EXCEPTION WHEN unique_violation THEN\n\
         \x20   END;\n\
         \x20 END LOOP;\n\
         END;\n\
         $upsert$ LANGUAGE plpgsql;",
        name = qualified_routine_name(routine),
    )
}

/// Render the statement invoking `routine` with `parameter_count` text
/// parameters.
#[must_use]
pub fn merge_routine_call_sql(routine: &MergeFunction, parameter_count: usize) -> String {
    let placeholders = (1..=parameter_count)
        .map(|position| format!("${position}::text"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT {}({placeholders})", qualified_routine_name(routine))
}

/// Routine name qualified with the schema of its table, so tables sharing a
/// name across schemas never replace each other's routines.
fn qualified_routine_name(routine: &MergeFunction) -> String {
    routine.schema().map_or_else(
        || quote_ident(routine.name()),
        |schema| format!("{}.{}", quote_ident(schema), quote_ident(routine.name())),
    )
}

/// Installs merge routines with `CREATE OR REPLACE FUNCTION`.
#[derive(Clone)]
pub struct PostgresRoutineCreator {
    client: SharedClient,
}

impl PostgresRoutineCreator {
    pub(crate) const fn new(client: SharedClient) -> Self {
        Self { client }
    }
}

impl RoutineCreator for PostgresRoutineCreator {
    fn create_routine(
        &self,
        routine: &MergeFunction,
        columns: &[ColumnDefinition],
    ) -> Result<(), RoutineCreatorError> {
        let statement = merge_routine_sql(routine, columns);
        self.client
            .lock()
            .batch_execute(&statement)
            .map_err(|error| {
                let message = map_postgres_error_message(&error, "create_routine");
                if error.is_closed() {
                    RoutineCreatorError::connection(message)
                } else {
                    RoutineCreatorError::statement(message)
                }
            })
    }
}

/// Calls merge routines with every argument bound as text.
#[derive(Clone)]
pub struct PostgresRoutineExecutor {
    client: SharedClient,
}

impl PostgresRoutineExecutor {
    pub(crate) const fn new(client: SharedClient) -> Self {
        Self { client }
    }
}

impl RoutineExecutor for PostgresRoutineExecutor {
    fn execute_routine(
        &self,
        routine: &MergeFunction,
        arguments: &RoutineArguments,
    ) -> Result<(), RoutineExecutorError> {
        let statement = merge_routine_call_sql(routine, arguments.len());
        let texts: Vec<Option<String>> = arguments.iter().map(Value::to_sql_text).collect();
        let params: Vec<&(dyn ToSql + Sync)> = texts
            .iter()
            .map(|text| text as &(dyn ToSql + Sync))
            .collect();

        self.client
            .lock()
            .execute(statement.as_str(), &params)
            .map(|_| ())
            .map_err(|error| {
                let message = map_postgres_error_message(&error, "execute_routine");
                if error.is_closed() {
                    RoutineExecutorError::connection(message)
                } else {
                    RoutineExecutorError::statement(message)
                }
            })
    }
}

#[cfg(test)]
#[path = "merge_routine_tests.rs"]
mod tests;
