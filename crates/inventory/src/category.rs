//! Category index derived from item codes.
//!
//! A code such as `"AB12"` belongs to category `"AB"`: the longest run of
//! leading letters. Codes without leading letters (`"7X"`) fall into
//! [`OTHER_CATEGORY`]. The index is a view over the current record set and is
//! never stored.

use std::collections::BTreeSet;

/// Bucket label for codes that start with something other than a letter.
pub const OTHER_CATEGORY: &str = "other";

/// Longest leading run of letters in `code` (may be empty).
pub fn letter_prefix(code: &str) -> &str {
    let end = code
        .char_indices()
        .find(|(_, c)| !c.is_alphabetic())
        .map(|(idx, _)| idx)
        .unwrap_or(code.len());
    &code[..end]
}

/// Category label of a code: its letter prefix, or [`OTHER_CATEGORY`].
pub fn category_of(code: &str) -> &str {
    match letter_prefix(code) {
        "" => OTHER_CATEGORY,
        prefix => prefix,
    }
}

/// Distinct categories across `codes`, sorted.
pub fn category_index<'a>(codes: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    codes
        .into_iter()
        .map(|code| category_of(code).to_string())
        .collect()
}

/// Whether `code` is listed under `category`.
///
/// Plain prefixes match with `starts_with` (case-sensitive). The
/// [`OTHER_CATEGORY`] label selects the codes indexed under it.
pub fn matches_category(code: &str, category: &str) -> bool {
    if category == OTHER_CATEGORY {
        category_of(code) == OTHER_CATEGORY
    } else {
        code.starts_with(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn prefix_is_longest_leading_letter_run() {
        assert_eq!(letter_prefix("A1"), "A");
        assert_eq!(letter_prefix("AB12"), "AB");
        assert_eq!(letter_prefix("B1C2"), "B");
        assert_eq!(letter_prefix("ZZ"), "ZZ");
        assert_eq!(letter_prefix("7X"), "");
        assert_eq!(letter_prefix(""), "");
    }

    #[test]
    fn index_over_lettered_codes() {
        let index = category_index(["A1", "A2", "B1"]);
        assert_eq!(index.into_iter().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn codes_without_letters_go_to_other() {
        let index = category_index(["7X", "A1"]);
        assert!(index.contains(OTHER_CATEGORY));
        assert!(index.contains("A"));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        assert!(matches_category("A12", "A"));
        assert!(!matches_category("a12", "A"));
        assert!(matches_category("AB3", "A"));
    }

    #[test]
    fn other_label_selects_letterless_codes() {
        assert!(matches_category("7X", OTHER_CATEGORY));
        assert!(matches_category("-1", OTHER_CATEGORY));
        assert!(!matches_category("A1", OTHER_CATEGORY));
        assert!(!matches_category("others1", OTHER_CATEGORY));
    }

    proptest! {
        /// Property: the prefix is always a leading slice made only of letters,
        /// and the character right after it (if any) is not a letter.
        #[test]
        fn prefix_is_maximal_letter_run(code in "[A-Za-z0-9]{0,8}") {
            let prefix = letter_prefix(&code);
            prop_assert!(code.starts_with(prefix));
            prop_assert!(prefix.chars().all(char::is_alphabetic));
            if let Some(next) = code[prefix.len()..].chars().next() {
                prop_assert!(!next.is_alphabetic());
            }
        }

        /// Property: every code matches the category it is indexed under.
        #[test]
        fn code_matches_its_own_category(code in "[A-Za-z0-9]{1,6}") {
            prop_assert!(matches_category(&code, category_of(&code)));
        }
    }
}
