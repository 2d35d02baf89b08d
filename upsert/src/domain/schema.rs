//! Column reference validation against a table's known columns.

use std::collections::BTreeSet;

use thiserror::Error;

/// Raised when a row references columns the table does not have.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid column(s): {}", quoted(.columns))]
pub struct InvalidColumnError {
    /// Offending column names, sorted and deduplicated.
    pub columns: Vec<String>,
}

fn quoted(columns: &[String]) -> String {
    columns
        .iter()
        .map(|column| format!("{column:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check that every referenced column is one of `possible_columns`.
///
/// # Errors
///
/// Returns [`InvalidColumnError`] listing the unknown names in ascending
/// order.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use upsert::domain::validate_columns;
///
/// let referenced = BTreeSet::from(["name".to_owned(), "colour".to_owned()]);
/// let err = validate_columns(&referenced, &["name".to_owned()]).unwrap_err();
/// assert_eq!(err.columns, vec!["colour"]);
/// ```
pub fn validate_columns(
    column_names: &BTreeSet<String>,
    possible_columns: &[String],
) -> Result<(), InvalidColumnError> {
    let possible: BTreeSet<&str> = possible_columns.iter().map(String::as_str).collect();
    let columns: Vec<String> = column_names
        .iter()
        .filter(|column| !possible.contains(column.as_str()))
        .cloned()
        .collect();

    if columns.is_empty() {
        Ok(())
    } else {
        Err(InvalidColumnError { columns })
    }
}

/// Union of selector, setter and ignore-on-update column names.
pub(crate) fn referenced_columns<'a, I>(groups: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    groups.into_iter().flatten().cloned().collect()
}

#[cfg(test)]
mod tests {
    //! Set-difference validation behaviour.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn pets_columns() -> Vec<String> {
        ["id", "name", "gender", "tag_number", "lovability"]
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    fn names(columns: &[&str]) -> BTreeSet<String> {
        columns.iter().map(|column| (*column).to_owned()).collect()
    }

    #[rstest]
    fn known_columns_pass(pets_columns: Vec<String>) {
        let referenced = names(&["name", "gender", "tag_number"]);
        assert_eq!(validate_columns(&referenced, &pets_columns), Ok(()));
    }

    #[rstest]
    fn empty_reference_set_passes(pets_columns: Vec<String>) {
        assert_eq!(validate_columns(&BTreeSet::new(), &pets_columns), Ok(()));
    }

    #[rstest]
    fn unknown_columns_are_reported_sorted(pets_columns: Vec<String>) {
        let referenced = names(&["zodiac", "name", "colour"]);
        let err = validate_columns(&referenced, &pets_columns).expect_err("unknown columns");
        assert_eq!(err.columns, vec!["colour", "zodiac"]);
        assert_eq!(err.to_string(), r#"invalid column(s): "colour", "zodiac""#);
    }

    #[rstest]
    fn matching_is_case_sensitive(pets_columns: Vec<String>) {
        let err = validate_columns(&names(&["Name"]), &pets_columns).expect_err("case differs");
        assert_eq!(err.columns, vec!["Name"]);
    }

    #[rstest]
    fn referenced_columns_deduplicate_groups() {
        let selector = vec!["id".to_owned()];
        let setter = vec!["id".to_owned(), "name".to_owned()];
        let ignored = vec!["created_at".to_owned()];
        let union = referenced_columns([selector.as_slice(), setter.as_slice(), ignored.as_slice()]);
        assert_eq!(union, names(&["created_at", "id", "name"]));
    }
}
