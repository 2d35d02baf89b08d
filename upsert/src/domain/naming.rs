//! Deterministic, length-bounded merge routine names.
//!
//! A name spells out its signature, e.g. `upsert_pets_SEL_name_SET_gender_A_name`.
//! Names longer than [`MAX_NAME_LENGTH`] bytes keep a readable prefix and end
//! in the decimal CRC-32 of the full untruncated name. Two long signatures
//! that share a prefix and collide on CRC-32 map to the same name; that
//! residual risk is accepted and not detected.

/// Upper bound, in bytes, for generated routine names.
pub const MAX_NAME_LENGTH: usize = 62;

/// Widest decimal rendering of a `u32` checksum.
const CHECKSUM_WIDTH: usize = 10;

const NAME_TAG: &str = "upsert";
const SELECTOR_TAG: &str = "SEL";
const SETTER_TAG: &str = "SET";
const SEGMENT_SEPARATOR: &str = "_";
const KEY_SEPARATOR: &str = "_A_";

/// Derive the merge routine name for a table and its selector/setter keys.
///
/// Keys are used in the order given; callers pass the sorted keys of a
/// normalised row.
///
/// # Examples
///
/// ```
/// use upsert::domain::generate_name;
///
/// let name = generate_name("pets", &["name"], &["gender", "name"]);
/// assert_eq!(name, "upsert_pets_SEL_name_SET_gender_A_name");
/// ```
#[must_use]
pub fn generate_name<S, T>(table_name: &str, selector_keys: &[S], setter_keys: &[T]) -> String
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    let selector = join_keys(selector_keys);
    let setter = join_keys(setter_keys);
    let candidate = [
        NAME_TAG,
        table_name,
        SELECTOR_TAG,
        selector.as_str(),
        SETTER_TAG,
        setter.as_str(),
    ]
    .join(SEGMENT_SEPARATOR);

    if candidate.len() <= MAX_NAME_LENGTH {
        return candidate;
    }

    let checksum = crc32fast::hash(candidate.as_bytes());
    let mut name =
        truncate_on_char_boundary(&candidate, MAX_NAME_LENGTH - CHECKSUM_WIDTH).to_owned();
    name.push_str(&checksum.to_string());
    name
}

fn join_keys<S: AsRef<str>>(keys: &[S]) -> String {
    keys.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(KEY_SEPARATOR)
}

fn truncate_on_char_boundary(text: &str, max_len: usize) -> &str {
    let end = text
        .char_indices()
        .map(|(index, ch)| index + ch.len_utf8())
        .take_while(|end| *end <= max_len)
        .last()
        .unwrap_or(0);
    text.get(..end).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    //! Name generation and truncation behaviour.
    use super::*;
    use rstest::rstest;

    fn long_keys(prefix: &str, count: usize) -> Vec<String> {
        (0..count).map(|index| format!("{prefix}_column_{index}")).collect()
    }

    #[rstest]
    fn short_names_are_returned_verbatim() {
        assert_eq!(
            generate_name("pets", &["name"], &["gender", "name"]),
            "upsert_pets_SEL_name_SET_gender_A_name"
        );
    }

    #[rstest]
    fn empty_segments_keep_their_tags() {
        let empty: [&str; 0] = [];
        assert_eq!(generate_name("pets", &empty, &empty), "upsert_pets_SEL__SET_");
    }

    #[rstest]
    fn generation_is_deterministic() {
        let selector = long_keys("selector", 4);
        let setter = long_keys("setter", 6);
        assert_eq!(
            generate_name("pets", &selector, &setter),
            generate_name("pets", &selector, &setter)
        );
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(12)]
    #[case(200)]
    fn names_never_exceed_the_bound(#[case] width: usize) {
        let selector = long_keys("s", width);
        let setter = long_keys("t", width);
        let name = generate_name("a_rather_long_table_name", &selector, &setter);
        assert!(name.len() <= MAX_NAME_LENGTH, "{name} is {} bytes", name.len());
    }

    #[rstest]
    fn long_names_end_in_checksum_of_full_candidate() {
        let selector = long_keys("selector", 3);
        let setter = long_keys("setter", 5);
        let candidate = format!(
            "upsert_tasks_SEL_{}_SET_{}",
            selector.join("_A_"),
            setter.join("_A_")
        );
        assert!(candidate.len() > MAX_NAME_LENGTH);

        let name = generate_name("tasks", &selector, &setter);
        let checksum = crc32fast::hash(candidate.as_bytes()).to_string();
        let prefix = candidate.get(..MAX_NAME_LENGTH - CHECKSUM_WIDTH).expect("ascii prefix");

        assert_eq!(name, format!("{prefix}{checksum}"));
    }

    #[rstest]
    fn shared_prefixes_diverge_in_their_suffix() {
        let mut first = long_keys("setter", 6);
        let mut second = first.clone();
        first.push("alpha".to_owned());
        second.push("omega".to_owned());

        let first_name = generate_name("tasks", &["id"], &first);
        let second_name = generate_name("tasks", &["id"], &second);

        assert_ne!(first_name, second_name);
        assert_eq!(
            first_name.get(..MAX_NAME_LENGTH - CHECKSUM_WIDTH),
            second_name.get(..MAX_NAME_LENGTH - CHECKSUM_WIDTH)
        );
    }

    #[rstest]
    fn truncation_respects_multibyte_characters() {
        let setter = vec!["ÿ".repeat(40)];
        let name = generate_name("pets", &["id"], &setter);
        assert!(name.len() <= MAX_NAME_LENGTH);
        assert!(name.starts_with("upsert_pets_SEL_id_SET_"));
    }

    #[rstest]
    fn known_checksum_matches_zlib_crc32() {
        // zlib.crc32(b"123456789") == 0xCBF43926
        assert_eq!(crc32fast::hash(b"123456789"), 0xCBF4_3926);
    }
}
