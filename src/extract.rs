//! Numeric score extraction from free-text model outputs.
//!
//! A numeric token is an optionally signed decimal (`-3.5`, `.75`) or
//! integer (`42`) literal. Digits are any Unicode decimal digit (`\p{Nd}`),
//! so `९०` and `８５` read as 90 and 85. Exponent notation is not
//! recognized: `1e2` yields the tokens `1` and `2`.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d*\.\d+|[-+]?\d+").expect("valid number pattern"));

static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d$").expect("valid digit pattern"));

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DIGIT.is_match(c.encode_utf8(&mut buf))
}

/// Value of a decimal digit in any script.
///
/// `\p{Nd}` characters come in contiguous runs of ten, each run ordered
/// from zero to nine, so a digit's value is its offset from the start of
/// its run of digits modulo ten.
fn digit_value(c: char) -> Option<u32> {
    if let Some(value) = c.to_digit(10) {
        return Some(value);
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let code = u32::from(c);
    let offset = (1..=code)
        .take_while(|k| char::from_u32(code - k).is_some_and(is_decimal_digit))
        .count() as u32;
    Some(offset % 10)
}

/// Rewrite a matched token with ASCII digits so it parses as a float.
fn to_ascii_digits(token: &str) -> String {
    token
        .chars()
        .map(|c| match digit_value(c) {
            Some(value) if !c.is_ascii_digit() => char::from_digit(value, 10).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Outcome of extracting one number per item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Extracted numbers, in the relative order of the items that produced one.
    pub values: Vec<f64>,
    /// Indices of items where no number was found at the requested position.
    pub dropped: Vec<usize>,
}

impl Extraction {
    /// Number of items processed.
    pub fn total(&self) -> usize {
        self.values.len() + self.dropped.len()
    }
}

/// Picks the `position`-th numeric token out of each text.
#[derive(Debug, Clone, Copy)]
pub struct NumberExtractor {
    position: usize,
}

impl Default for NumberExtractor {
    fn default() -> Self {
        Self::new(0)
    }
}

impl NumberExtractor {
    /// Create an extractor selecting the zero-based `position`-th token.
    pub fn new(position: usize) -> Self {
        Self { position }
    }

    /// Extract from one text, or `None` if it has too few numeric tokens.
    ///
    /// A token that parses to positive infinity becomes `0.0`; negative
    /// infinity is returned unchanged.
    pub fn extract_one(&self, text: &str) -> Option<f64> {
        let token = NUMBER.find_iter(text).nth(self.position)?;
        // Every match of the pattern is a valid float literal once its
        // digits are ASCII.
        let value: f64 = to_ascii_digits(token.as_str()).parse().ok()?;
        if value == f64::INFINITY {
            Some(0.0)
        } else {
            Some(value)
        }
    }

    /// Extract from a sequence of `(index, text)` items.
    ///
    /// Items without a number at the configured position contribute their
    /// index to `dropped` and nothing to `values`.
    pub fn extract<'a, I>(&self, items: I) -> Extraction
    where
        I: IntoIterator<Item = (usize, &'a str)>,
    {
        let mut out = Extraction::default();
        for (idx, text) in items {
            match self.extract_one(text) {
                Some(value) => out.values.push(value),
                None => out.dropped.push(idx),
            }
        }
        debug!(
            extracted = out.values.len(),
            dropped = out.dropped.len(),
            position = self.position,
            "extracted numbers"
        );
        out
    }
}

/// Extract from plain strings, indexing them by their position.
pub fn extract_numbers<S: AsRef<str>>(texts: &[S], position: usize) -> Extraction {
    NumberExtractor::new(position).extract(texts.iter().map(AsRef::as_ref).enumerate())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_items() {
        let out = extract_numbers(&["Score: 42", "no number here", "Score: -3.5"], 0);
        assert_eq!(out.values, vec![42.0, -3.5]);
        assert_eq!(out.dropped, vec![1]);
    }

    #[test]
    fn test_counts_add_up() {
        let texts = ["1", "", "a 2 b 3", "none", "+7", ".5"];
        for position in 0..3 {
            let out = extract_numbers(&texts, position);
            assert_eq!(out.total(), texts.len());
        }
    }

    #[test]
    fn test_position_selects_nth_token() {
        let extractor = NumberExtractor::new(1);
        assert_eq!(extractor.extract_one("between 10 and 20"), Some(20.0));
        assert_eq!(extractor.extract_one("just 10"), None);
    }

    #[test]
    fn test_token_grammar() {
        let ex = NumberExtractor::default();
        assert_eq!(ex.extract_one("+15 points"), Some(15.0));
        assert_eq!(ex.extract_one("about .75"), Some(0.75));
        assert_eq!(ex.extract_one("score=85/100"), Some(85.0));
        assert_eq!(ex.extract_one("{\"score\": 67.25}"), Some(67.25));
        // No exponent support.
        assert_eq!(ex.extract_one("1e2"), Some(1.0));
        assert_eq!(NumberExtractor::new(1).extract_one("1e2"), Some(2.0));
        // A trailing dot is not part of the token.
        assert_eq!(ex.extract_one("Score: 90."), Some(90.0));
    }

    #[test]
    fn test_native_script_digits() {
        let out = extract_numbers(&["गुण: ९०", "Score: ٧٥", "８５点", "Score: 42"], 0);
        assert_eq!(out.values, vec![90.0, 75.0, 85.0, 42.0]);
        assert!(out.dropped.is_empty());

        let ex = NumberExtractor::default();
        assert_eq!(ex.extract_one("ලකුණු: -৩.৫"), Some(-3.5));
        // Mixed scripts within one token.
        assert_eq!(ex.extract_one("1٠0"), Some(100.0));
    }

    #[test]
    fn test_digit_values_across_adjacent_runs() {
        // U+1D7CE..U+1D7FF holds five back-to-back runs of mathematical digits.
        assert_eq!(digit_value('\u{1D7CE}'), Some(0));
        assert_eq!(digit_value('\u{1D7D8}'), Some(0));
        assert_eq!(digit_value('\u{1D7DB}'), Some(3));
        assert_eq!(digit_value('\u{1D7FF}'), Some(9));
        assert_eq!(digit_value('९'), Some(9));
        assert_eq!(digit_value('x'), None);
        // Other numeric characters are not decimal digits.
        assert_eq!(digit_value('Ⅻ'), None);
        assert_eq!(NumberExtractor::default().extract_one("½"), None);
    }

    #[test]
    fn test_positive_infinity_becomes_zero() {
        let huge = "9".repeat(400);
        let ex = NumberExtractor::default();
        assert_eq!(ex.extract_one(&huge), Some(0.0));

        let negative = format!("-{}", huge);
        assert_eq!(ex.extract_one(&negative), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn test_dropped_uses_caller_indices() {
        let items = vec![(10, "7"), (11, "none"), (12, "8"), (13, "")];
        let out = NumberExtractor::default().extract(items);
        assert_eq!(out.values, vec![7.0, 8.0]);
        assert_eq!(out.dropped, vec![11, 13]);
    }

    #[test]
    fn test_deterministic() {
        let texts = ["Score: 1", "x", "2.5 and 3"];
        assert_eq!(extract_numbers(&texts, 0), extract_numbers(&texts, 0));
    }
}
