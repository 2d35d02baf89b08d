//! Loosely-typed row input and its canonical forms.
//!
//! Callers hand rows over as symbol-or-string keys and scalar values. The
//! [`crate::domain::normalize_row`] boundary converts them once into string
//! column names and the closed [`Value`] set, so nothing past normalisation
//! deals with symbols.

use std::collections::BTreeSet;
use std::fmt;

/// A column reference as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    /// Plain string key.
    Text(String),
    /// Symbol-like key (an identifier token rather than free text).
    Symbol(String),
}

impl ColumnKey {
    /// Build a symbol-like key.
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// Coerce the key to its column name.
    #[must_use]
    pub fn into_name(self) -> String {
        match self {
            Self::Text(name) | Self::Symbol(name) => name,
        }
    }
}

impl From<&str> for ColumnKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ColumnKey {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ColumnKey {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

/// A value as supplied by the caller, before canonicalisation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// SQL `NULL`.
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Integer(i64),
    /// Floating point literal.
    Float(f64),
    /// String literal.
    Text(String),
    /// Symbol-like value such as `:male`; becomes [`Value::Text`].
    Symbol(String),
}

impl RawValue {
    /// Build a symbol-like value.
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// Coerce into the canonical value set.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(flag) => Value::Bool(flag),
            Self::Integer(number) => Value::Integer(number),
            Self::Float(number) => Value::Float(number),
            Self::Text(text) | Self::Symbol(text) => Value::Text(text),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T> From<Option<T>> for RawValue
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Canonical column value carried by a normalised row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL `NULL`.
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Integer(i64),
    /// Floating point literal.
    Float(f64),
    /// String literal.
    Text(String),
}

impl Value {
    /// Literal text handed to the SQL layer, `None` for `NULL`.
    #[must_use]
    pub fn to_sql_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Whether the value is SQL `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Integer(number) => write!(f, "{number}"),
            Self::Float(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// An option entry as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOption {
    /// A single scalar setting.
    Scalar(RawValue),
    /// A list of column references, e.g. `ignore_on_update`.
    Columns(Vec<ColumnKey>),
}

impl RawOption {
    /// Build a scalar option.
    pub fn scalar(value: impl Into<RawValue>) -> Self {
        Self::Scalar(value.into())
    }

    /// Build a column-list option from anything yielding column keys.
    pub fn columns<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<ColumnKey>,
    {
        Self::Columns(keys.into_iter().map(Into::into).collect())
    }
}

impl From<RawValue> for RawOption {
    fn from(value: RawValue) -> Self {
        Self::Scalar(value)
    }
}

/// A normalised option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Scalar setting in canonical string form.
    Text(String),
    /// Ordered, deduplicated column names.
    Columns(BTreeSet<String>),
}

#[cfg(test)]
mod tests {
    //! Coercion rules for keys, values and options.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ColumnKey::from("name"))]
    #[case(ColumnKey::symbol("name"))]
    #[case(ColumnKey::from(String::from("name")))]
    fn keys_coerce_to_their_name(#[case] key: ColumnKey) {
        assert_eq!(key.into_name(), "name");
    }

    #[rstest]
    fn symbol_values_become_text() {
        assert_eq!(
            RawValue::symbol("male").into_value(),
            Value::Text("male".to_owned())
        );
    }

    #[rstest]
    #[case(RawValue::Null, Value::Null)]
    #[case(RawValue::from(true), Value::Bool(true))]
    #[case(RawValue::from(4_i32), Value::Integer(4))]
    #[case(RawValue::from(2.5_f64), Value::Float(2.5))]
    #[case(RawValue::from(None::<&str>), Value::Null)]
    #[case(RawValue::from(Some("Inky")), Value::Text("Inky".to_owned()))]
    fn scalars_keep_their_kind(#[case] raw: RawValue, #[case] expected: Value) {
        assert_eq!(raw.into_value(), expected);
    }

    #[rstest]
    #[case(Value::Null, None)]
    #[case(Value::Bool(false), Some("false"))]
    #[case(Value::Integer(-7), Some("-7"))]
    #[case(Value::Float(2.0), Some("2"))]
    #[case(Value::Text("Jerry".to_owned()), Some("Jerry"))]
    fn sql_text_renders_literals(#[case] value: Value, #[case] expected: Option<&str>) {
        assert_eq!(value.to_sql_text().as_deref(), expected);
    }

    #[rstest]
    fn column_options_collect_keys() {
        let option = RawOption::columns(["created_at", "priority"]);
        assert_eq!(
            option,
            RawOption::Columns(vec![
                ColumnKey::from("created_at"),
                ColumnKey::from("priority"),
            ])
        );
    }
}
