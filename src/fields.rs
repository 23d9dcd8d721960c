//! Field-validation collaborator interface.
//!
//! Rule sets live outside this crate; the contract is "raw OCR text plus an
//! expected value in, pass/fail out". A normalized-substring rule is provided
//! as the default, with an occurrence counter for duplicate-field checks
//! (e.g. the series number printed once per fraction).

use crate::ocr::normalize_text;

/// Pass/fail check of one expected field value against raw OCR text.
pub trait FieldRule {
    /// Returns whether `expected` is considered present in `raw_text`.
    fn passes(&self, raw_text: &str, expected: &str) -> bool;
}

/// Default rule: normalized containment.
#[derive(Clone, Copy, Debug, Default)]
pub struct SubstringRule;

impl FieldRule for SubstringRule {
    fn passes(&self, raw_text: &str, expected: &str) -> bool {
        let needle = normalize_text(expected);
        if needle.is_empty() {
            return false;
        }
        normalize_text(raw_text).contains(&needle)
    }
}

/// Counts non-overlapping normalized occurrences of `expected` in `raw_text`.
pub fn occurrences(raw_text: &str, expected: &str) -> usize {
    let haystack = normalize_text(raw_text);
    let needle = normalize_text(expected);
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(&needle).count()
}

/// Outcome of checking one named field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldStatus {
    /// Field name, e.g. `"serie"`.
    pub field: String,
    /// Whether the rule accepted the expected value.
    pub passed: bool,
    /// How many times the expected value occurs in the text.
    pub occurrences: usize,
}

/// Runs a rule over `(field, expected)` pairs.
pub fn check_fields<R: FieldRule>(
    rule: &R,
    raw_text: &str,
    expected: &[(&str, &str)],
) -> Vec<FieldStatus> {
    expected
        .iter()
        .map(|(field, value)| FieldStatus {
            field: field.to_string(),
            passed: rule.passes(raw_text, value),
            occurrences: occurrences(raw_text, value),
        })
        .collect()
}
