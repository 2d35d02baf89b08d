//! PostgreSQL-backed table description read from the system catalogues.

use crate::domain::ports::{ColumnDefinition, TableContext, TableContextError};

use super::{SharedClient, map_postgres_error_message, quote_ident};

const COLUMNS_QUERY: &str = concat!(
    "SELECT ",
    "  attr.attname AS column_name, ",
    "  pg_catalog.format_type(attr.atttypid, attr.atttypmod) AS data_type ",
    "FROM pg_catalog.pg_attribute attr ",
    "JOIN pg_catalog.pg_class cls ",
    "  ON cls.oid = attr.attrelid ",
    "JOIN pg_catalog.pg_namespace ns ",
    "  ON ns.oid = cls.relnamespace ",
    "WHERE ns.nspname = $1 ",
    "  AND cls.relname = $2 ",
    "  AND cls.relkind IN ('r', 'p') ",
    "  AND attr.attnum > 0 ",
    "  AND NOT attr.attisdropped ",
    "ORDER BY attr.attnum"
);

/// Describes one table of the configured schema.
#[derive(Clone)]
pub struct PostgresTableContext {
    client: SharedClient,
    schema: String,
    table_name: String,
    assume_routine_exists: bool,
}

impl PostgresTableContext {
    pub(crate) const fn new(
        client: SharedClient,
        schema: String,
        table_name: String,
        assume_routine_exists: bool,
    ) -> Self {
        Self {
            client,
            schema,
            table_name,
            assume_routine_exists,
        }
    }

    /// Schema the table lives in.
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }
}

impl TableContext for PostgresTableContext {
    fn table_name(&self) -> String {
        self.table_name.clone()
    }

    fn schema_name(&self) -> Option<String> {
        Some(self.schema.clone())
    }

    fn quoted_table_name(&self) -> String {
        format!(
            "{}.{}",
            quote_ident(&self.schema),
            quote_ident(&self.table_name)
        )
    }

    fn column_definitions(&self) -> Result<Vec<ColumnDefinition>, TableContextError> {
        let rows = self
            .client
            .lock()
            .query(COLUMNS_QUERY, &[&self.schema, &self.table_name])
            .map_err(|error| {
                let message = map_postgres_error_message(&error, "column_definitions");
                if error.is_closed() {
                    TableContextError::connection(message)
                } else {
                    TableContextError::query(message)
                }
            })?;

        if rows.is_empty() {
            return Err(TableContextError::unknown_table(format!(
                "{}.{}",
                self.schema, self.table_name
            )));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                ColumnDefinition::new(
                    row.get::<_, String>("column_name"),
                    row.get::<_, String>("data_type"),
                )
            })
            .collect())
    }

    fn assume_routine_exists(&self) -> bool {
        self.assume_routine_exists
    }
}
