//! Canonical row representation for one insert-or-update request.
//!
//! [`normalize_row`] turns caller input into a [`Row`] whose three mappings
//! are string-keyed and sorted, so key order, routine names and routine
//! arguments are identical for equal input regardless of how it was built.

use std::collections::{BTreeMap, BTreeSet};

use super::value::{ColumnKey, OptionValue, RawOption, RawValue, Value};

/// Option key listing setter columns that are written on insert only.
pub const IGNORE_ON_UPDATE: &str = "ignore_on_update";

/// A normalised insert-or-update request.
///
/// Every selector key is also a setter key, and all mappings iterate in
/// ascending key order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    selector: BTreeMap<String, Value>,
    setter: BTreeMap<String, Value>,
    options: BTreeMap<String, OptionValue>,
}

impl Row {
    /// Match columns and their values.
    #[must_use]
    pub const fn selector(&self) -> &BTreeMap<String, Value> {
        &self.selector
    }

    /// Columns to write and their values.
    #[must_use]
    pub const fn setter(&self) -> &BTreeMap<String, Value> {
        &self.setter
    }

    /// Normalised options, always including [`IGNORE_ON_UPDATE`].
    #[must_use]
    pub const fn options(&self) -> &BTreeMap<String, OptionValue> {
        &self.options
    }

    /// Selector column names in ascending order.
    #[must_use]
    pub fn selector_keys(&self) -> Vec<String> {
        self.selector.keys().cloned().collect()
    }

    /// Setter column names in ascending order.
    #[must_use]
    pub fn setter_keys(&self) -> Vec<String> {
        self.setter.keys().cloned().collect()
    }

    /// Columns excluded from the update branch.
    #[must_use]
    pub fn ignore_on_update(&self) -> BTreeSet<String> {
        ignore_on_update_of(&self.options)
    }
}

/// Read the ignore-on-update column set out of normalised options.
pub(crate) fn ignore_on_update_of(options: &BTreeMap<String, OptionValue>) -> BTreeSet<String> {
    match options.get(IGNORE_ON_UPDATE) {
        Some(OptionValue::Columns(columns)) => columns.clone(),
        Some(OptionValue::Text(column)) => BTreeSet::from([column.clone()]),
        None => BTreeSet::new(),
    }
}

/// Normalise selector, setter and option input into a [`Row`].
///
/// Selector entries missing from the setter are copied into it so an insert
/// always writes its own match columns.
///
/// # Examples
///
/// ```
/// use upsert::domain::{Value, normalize_row};
///
/// let row = normalize_row(
///     [("name", "Jerry")],
///     [("gender", "male")],
///     Vec::<(&str, upsert::domain::RawOption)>::new(),
/// );
///
/// assert_eq!(row.setter_keys(), vec!["gender", "name"]);
/// assert_eq!(row.setter()["name"], Value::Text("Jerry".to_owned()));
/// assert!(row.ignore_on_update().is_empty());
/// ```
pub fn normalize_row<S, SK, SV, T, TK, TV, O, OK, OV>(
    raw_selector: S,
    raw_setter: T,
    raw_options: O,
) -> Row
where
    S: IntoIterator<Item = (SK, SV)>,
    SK: Into<ColumnKey>,
    SV: Into<RawValue>,
    T: IntoIterator<Item = (TK, TV)>,
    TK: Into<ColumnKey>,
    TV: Into<RawValue>,
    O: IntoIterator<Item = (OK, OV)>,
    OK: Into<ColumnKey>,
    OV: Into<RawOption>,
{
    let selector = canonical_values(raw_selector);
    let mut setter = canonical_values(raw_setter);
    for (column, value) in &selector {
        setter
            .entry(column.clone())
            .or_insert_with(|| value.clone());
    }

    let mut options: BTreeMap<String, OptionValue> = raw_options
        .into_iter()
        .map(|(key, option)| {
            let name = key.into().into_name();
            let canonical = canonical_option(&name, option.into());
            (name, canonical)
        })
        .collect();
    options
        .entry(IGNORE_ON_UPDATE.to_owned())
        .or_insert_with(|| OptionValue::Columns(BTreeSet::new()));

    Row {
        selector,
        setter,
        options,
    }
}

fn canonical_values<I, K, V>(raw: I) -> BTreeMap<String, Value>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<ColumnKey>,
    V: Into<RawValue>,
{
    raw.into_iter()
        .map(|(key, value)| (key.into().into_name(), value.into().into_value()))
        .collect()
}

fn canonical_option(name: &str, option: RawOption) -> OptionValue {
    match option {
        RawOption::Columns(keys) => {
            OptionValue::Columns(keys.into_iter().map(ColumnKey::into_name).collect())
        }
        RawOption::Scalar(RawValue::Null) if name == IGNORE_ON_UPDATE => {
            OptionValue::Columns(BTreeSet::new())
        }
        RawOption::Scalar(value) if name == IGNORE_ON_UPDATE => {
            OptionValue::Columns(BTreeSet::from([value.into_value().to_string()]))
        }
        RawOption::Scalar(value) => OptionValue::Text(value.into_value().to_string()),
    }
}

#[cfg(test)]
#[path = "row_tests.rs"]
mod tests;
