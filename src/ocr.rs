//! OCR collaborator interface and text normalization.
//!
//! Text extraction itself runs in an external service; this crate only fixes
//! the contract (ordered lines in reading order) and the normalization the
//! field checks expect.

use crate::image::ImageView;

/// Source of OCR text lines for an image.
///
/// Implementations wrap whatever backend performs the recognition; the only
/// guarantee consumers may rely on is reading order.
pub trait TextSource {
    /// Backend-specific failure type.
    type Error;

    /// Extracts text lines from the image, in reading order.
    fn text_lines(&self, image: ImageView<'_>) -> Result<Vec<String>, Self::Error>;
}

/// Normalizes raw OCR output for containment checks: lowercases, folds line
/// breaks into spaces, and collapses whitespace runs.
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.extend(ch.to_lowercase());
    }
    out
}

/// Joins OCR lines into one normalized haystack.
pub fn normalize_lines(lines: &[String]) -> String {
    normalize_text(&lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::{normalize_lines, normalize_text};

    #[test]
    fn lowercases_and_collapses_whitespace() {
        assert_eq!(
            normalize_text("SORTEO  Extraordinario\nNo. 2742\t "),
            "sorteo extraordinario no. 2742"
        );
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize_text("   \n \t"), "");
    }

    #[test]
    fn lines_join_with_single_spaces() {
        let lines = vec!["Premio Mayor".to_string(), "$ 15.000".to_string()];
        assert_eq!(normalize_lines(&lines), "premio mayor $ 15.000");
    }
}
