//! Merge routine identity types.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use super::naming::generate_name;
use super::row::{Row, ignore_on_update_of};
use super::value::{OptionValue, Value};

/// Cache key identifying one merge routine shape.
///
/// Only the table, its schema when known, and the two key-sets take part;
/// values and options do not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MergeFunctionSignature {
    schema: Option<String>,
    table_name: String,
    selector_keys: Vec<String>,
    setter_keys: Vec<String>,
}

impl MergeFunctionSignature {
    /// Build a signature from its parts.
    pub fn new(
        table_name: impl Into<String>,
        selector_keys: Vec<String>,
        setter_keys: Vec<String>,
    ) -> Self {
        Self {
            schema: None,
            table_name: table_name.into(),
            selector_keys,
            setter_keys,
        }
    }

    /// Place the table, and the routine serving it, in `schema`.
    #[must_use]
    pub fn in_schema(mut self, schema: Option<String>) -> Self {
        self.schema = schema;
        self
    }

    /// Signature of `row` against `table_name`.
    pub fn for_row(table_name: impl Into<String>, row: &Row) -> Self {
        Self::new(table_name, row.selector_keys(), row.setter_keys())
    }

    /// Schema holding the table and its routine, if not the default.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Table the routine writes to.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Selector column names in ascending order.
    #[must_use]
    pub fn selector_keys(&self) -> &[String] {
        &self.selector_keys
    }

    /// Setter column names in ascending order.
    #[must_use]
    pub fn setter_keys(&self) -> &[String] {
        &self.setter_keys
    }
}

/// A merge routine bound to one signature.
///
/// Owned by the registry; callers hold shared references. The name is
/// derived on first use and then kept.
#[derive(Debug)]
pub struct MergeFunction {
    signature: MergeFunctionSignature,
    quoted_table_name: String,
    options: BTreeMap<String, OptionValue>,
    assume_exists: bool,
    name: OnceLock<String>,
}

impl MergeFunction {
    pub(crate) fn new(
        signature: MergeFunctionSignature,
        quoted_table_name: String,
        options: BTreeMap<String, OptionValue>,
        assume_exists: bool,
    ) -> Self {
        Self {
            signature,
            quoted_table_name,
            options,
            assume_exists,
            name: OnceLock::new(),
        }
    }

    /// Routine name, bounded by [`crate::domain::MAX_NAME_LENGTH`].
    pub fn name(&self) -> &str {
        self.name.get_or_init(|| {
            generate_name(
                self.signature.table_name(),
                self.signature.selector_keys(),
                self.signature.setter_keys(),
            )
        })
    }

    /// Signature this routine serves.
    #[must_use]
    pub const fn signature(&self) -> &MergeFunctionSignature {
        &self.signature
    }

    /// Unquoted table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        self.signature.table_name()
    }

    /// Schema the routine is created in; `None` leaves it to the search path.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.signature.schema()
    }

    /// Table name quoted for the SQL dialect.
    #[must_use]
    pub fn quoted_table_name(&self) -> &str {
        &self.quoted_table_name
    }

    /// Selector column names in parameter order.
    #[must_use]
    pub fn selector_keys(&self) -> &[String] {
        self.signature.selector_keys()
    }

    /// Setter column names in parameter order.
    #[must_use]
    pub fn setter_keys(&self) -> &[String] {
        self.signature.setter_keys()
    }

    /// Options of the first row that resolved this routine.
    #[must_use]
    pub const fn options(&self) -> &BTreeMap<String, OptionValue> {
        &self.options
    }

    /// Setter columns left untouched by the update branch.
    #[must_use]
    pub fn ignore_on_update(&self) -> BTreeSet<String> {
        ignore_on_update_of(&self.options)
    }

    /// Whether creation was skipped because the routine already exists.
    #[must_use]
    pub const fn assume_exists(&self) -> bool {
        self.assume_exists
    }

    /// Whether `row` has exactly this routine's key-sets.
    #[must_use]
    pub fn accepts(&self, row: &Row) -> bool {
        row.selector().keys().eq(self.selector_keys().iter())
            && row.setter().keys().eq(self.setter_keys().iter())
    }

    /// Arguments for `row` in this routine's parameter order.
    pub(crate) fn arguments_for(&self, row: &Row) -> RoutineArguments {
        RoutineArguments {
            selector: row.selector().values().cloned().collect(),
            setter: row.setter().values().cloned().collect(),
        }
    }
}

/// Ordered values passed to a merge routine.
///
/// Selector values follow `selector_keys`, setter values follow
/// `setter_keys`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineArguments {
    /// Values matched against the selector columns.
    pub selector: Vec<Value>,
    /// Values written to the setter columns.
    pub setter: Vec<Value>,
}

impl RoutineArguments {
    /// Selector values followed by setter values.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.selector.iter().chain(self.setter.iter())
    }

    /// Total number of routine parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selector.len() + self.setter.len()
    }

    /// Whether the routine takes no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selector.is_empty() && self.setter.is_empty()
    }
}
