//! Port describing the table an upsert targets.

use super::define_port_error;

define_port_error! {
    /// Errors raised while describing a target table.
    pub enum TableContextError {
        /// Connection to the backing datastore failed.
        Connection {
            /// Driver detail.
            message: String
        } => "table context connection failed: {message}",
        /// Column introspection query failed.
        Query {
            /// Driver detail.
            message: String
        } => "table context query failed: {message}",
        /// The table has no visible columns.
        UnknownTable {
            /// Table that could not be found.
            table: String
        } => "table '{table}' not found",
    }
}

/// Column metadata reported by schema introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    /// Column name as stored in the catalogue.
    pub name: String,
    /// SQL type used to declare routine parameters.
    pub sql_type: String,
}

impl ColumnDefinition {
    /// Build a column definition.
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
        }
    }
}

/// Port exposing the target table's identity and columns.
#[cfg_attr(test, mockall::automock)]
pub trait TableContext: Send + Sync {
    /// Unquoted table name; part of the merge routine cache key.
    fn table_name(&self) -> String;

    /// Schema holding the table and its merge routines; `None` defers to
    /// the connection's default. Part of the merge routine cache key.
    fn schema_name(&self) -> Option<String>;

    /// Table name quoted for the SQL dialect.
    fn quoted_table_name(&self) -> String;

    /// Columns of the table in catalogue order.
    fn column_definitions(&self) -> Result<Vec<ColumnDefinition>, TableContextError>;

    /// Whether merge routines for this table already exist in the store.
    fn assume_routine_exists(&self) -> bool;
}

/// In-memory table description for tests and offline use.
#[derive(Debug, Clone, Default)]
pub struct FixtureTableContext {
    schema: Option<String>,
    table_name: String,
    columns: Vec<ColumnDefinition>,
    assume_routine_exists: bool,
}

impl FixtureTableContext {
    /// Describe `table_name` with `text`-typed columns.
    pub fn new<I, S>(table_name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema: None,
            table_name: table_name.into(),
            columns: columns
                .into_iter()
                .map(|name| ColumnDefinition::new(name, "text"))
                .collect(),
            assume_routine_exists: false,
        }
    }

    /// Place the table in `schema`.
    #[must_use]
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Mark routines for this table as already present.
    #[must_use]
    pub const fn assuming_routine_exists(mut self) -> Self {
        self.assume_routine_exists = true;
        self
    }
}

impl TableContext for FixtureTableContext {
    fn table_name(&self) -> String {
        self.table_name.clone()
    }

    fn schema_name(&self) -> Option<String> {
        self.schema.clone()
    }

    fn quoted_table_name(&self) -> String {
        let quote = |name: &str| format!("\"{}\"", name.replace('"', "\"\""));
        self.schema.as_deref().map_or_else(
            || quote(&self.table_name),
            |schema| format!("{}.{}", quote(schema), quote(&self.table_name)),
        )
    }

    fn column_definitions(&self) -> Result<Vec<ColumnDefinition>, TableContextError> {
        Ok(self.columns.clone())
    }

    fn assume_routine_exists(&self) -> bool {
        self.assume_routine_exists
    }
}
