//! Locale-aware string ordering for timeline labels.
//!
//! Implements the subset of CLDR collation the dashboard labels need:
//! primary comparison by character class (whitespace, punctuation, digits,
//! letters), case-insensitive at the primary level with lowercase before
//! uppercase as a tie-break. The Hebrew locale reorders the Hebrew script
//! ahead of Latin.

use std::cmp::Ordering;

/// Locale the dashboard sorts labels with.
pub const HEBREW_LOCALE: &str = "he-IL";

/// Punctuation in CLDR root order; anything not listed sorts after, by code point.
const PUNCTUATION_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CharClass {
    Whitespace,
    Punctuation,
    Digit,
    FirstScript,
    SecondScript,
    Other,
}

/// String comparator parameterized by a locale identifier.
#[derive(Debug, Clone)]
pub struct Collator {
    locale: String,
    hebrew_first: bool,
}

impl Default for Collator {
    fn default() -> Self {
        Self::new(HEBREW_LOCALE)
    }
}

impl Collator {
    /// Create a collator for a BCP-47 locale such as `he-IL` or `en-US`.
    pub fn new(locale: &str) -> Self {
        let language = locale
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();

        Self {
            locale: locale.to_string(),
            // "iw" is the legacy code for Hebrew
            hebrew_first: language == "he" || language == "iw",
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Compare two strings: primary weights first, then case, then code points.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let primary = a
            .chars()
            .map(|c| self.primary_weight(c))
            .cmp(b.chars().map(|c| self.primary_weight(c)));

        primary
            .then_with(|| a.chars().map(case_weight).cmp(b.chars().map(case_weight)))
            .then_with(|| a.cmp(b))
    }

    fn primary_weight(&self, c: char) -> (CharClass, u32) {
        if c.is_whitespace() {
            return (CharClass::Whitespace, c as u32);
        }
        if let Some(pos) = PUNCTUATION_ORDER.find(c) {
            return (CharClass::Punctuation, pos as u32);
        }
        if c.is_ascii_punctuation() {
            return (CharClass::Punctuation, PUNCTUATION_ORDER.len() as u32 + c as u32);
        }
        if let Some(digit) = c.to_digit(10) {
            return (CharClass::Digit, digit);
        }
        if c.is_ascii_alphabetic() {
            let weight = c.to_ascii_lowercase() as u32;
            let class = if self.hebrew_first {
                CharClass::SecondScript
            } else {
                CharClass::FirstScript
            };
            return (class, weight);
        }
        if is_hebrew_letter(c) {
            let class = if self.hebrew_first {
                CharClass::FirstScript
            } else {
                CharClass::SecondScript
            };
            return (class, c as u32);
        }
        (CharClass::Other, c as u32)
    }
}

fn is_hebrew_letter(c: char) -> bool {
    ('\u{05D0}'..='\u{05EA}').contains(&c)
}

fn case_weight(c: char) -> u8 {
    u8::from(c.is_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeline_labels_order() {
        let collator = Collator::new(HEBREW_LOCALE);
        let mut labels = vec!["2024-3", "2024-10", "2023-12", "2024-1"];
        labels.sort_by(|a, b| collator.compare(a, b));

        // label order, not chronological order
        assert_eq!(labels, vec!["2023-12", "2024-1", "2024-10", "2024-3"]);
    }

    #[test]
    fn test_prefix_sorts_first() {
        let collator = Collator::default();
        assert_eq!(collator.compare("2024-3", "2024-3-W1"), Ordering::Less);
        assert_eq!(collator.compare("2024-3-W1", "2024-3-W1"), Ordering::Equal);
        assert_eq!(collator.compare("2024-3-W2", "2024-3-W1"), Ordering::Greater);
    }

    #[test]
    fn test_case_is_secondary() {
        let collator = Collator::new("en-US");
        assert_eq!(collator.compare("a", "B"), Ordering::Less);
        assert_eq!(collator.compare("a", "A"), Ordering::Less);
        assert_eq!(collator.compare("Ab", "aC"), Ordering::Less);
    }

    #[test]
    fn test_punctuation_before_digits_before_letters() {
        let collator = Collator::default();
        assert_eq!(collator.compare("-", "0"), Ordering::Less);
        assert_eq!(collator.compare("9", "a"), Ordering::Less);
        assert_eq!(collator.compare(" a", "-a"), Ordering::Less);
    }

    #[test]
    fn test_hebrew_reordered_before_latin() {
        let hebrew = Collator::new("he-IL");
        assert_eq!(hebrew.compare("א", "a"), Ordering::Less);
        assert_eq!(hebrew.compare("א", "ב"), Ordering::Less);

        let english = Collator::new("en");
        assert_eq!(english.compare("א", "a"), Ordering::Greater);
        assert_eq!(english.locale(), "en");
    }
}
