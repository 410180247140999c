use std::collections::HashSet;
use std::fmt;

pub const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";
/// Special characters used for separators, block patterns and digit+special suffixes.
pub const SPECIAL: &str = "!@#_-$";
/// Lowercase, uppercase, digits and `SPECIAL`, in that order.
pub const COMMON: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#_-$";

/// An ordered set of characters with no duplicates.
///
/// Insertion order is preserved: it decides the order in which the exhaustive
/// enumerators walk the set, never which characters are members.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Charset {
    chars: Vec<char>,
}

impl Charset {
    /// Builds a charset from the characters of `s`, keeping the first occurrence of each.
    pub fn new(s: &str) -> Self {
        s.chars().collect()
    }

    /// The default charset used whenever a class expression yields nothing usable.
    pub fn common() -> Self {
        Self::new(COMMON)
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    /// Characters of the set that are ASCII punctuation, in set order.
    pub fn punctuation(&self) -> Vec<char> {
        self.chars
            .iter()
            .copied()
            .filter(char::is_ascii_punctuation)
            .collect()
    }

    pub fn letter_count(&self) -> usize {
        self.chars.iter().filter(|c| c.is_ascii_alphabetic()).count()
    }

    /// A charset is word-like when letters make up more than half of it.
    pub fn is_word_like(&self) -> bool {
        self.letter_count() * 2 > self.len()
    }
}

impl FromIterator<char> for Charset {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        let mut seen = HashSet::new();
        let chars = iter.into_iter().filter(|c| seen.insert(*c)).collect();
        Self { chars }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.chars {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Expands the inner content of a bracket expression (`a-z0-9_`) into a charset.
///
/// A run `x-y` with `x <= y` (both ASCII) expands to every character in the
/// inclusive range. Anything else, including a trailing `-` or a descending
/// range, is taken literally. Empty input yields [`Charset::common`].
pub fn expand_class(expr: &str) -> Charset {
    let chars: Vec<char> = expr.chars().collect();
    if chars.is_empty() {
        return Charset::common();
    }

    let mut expanded = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if i + 2 < chars.len() && chars[i + 1] == '-' && is_ascii_range(chars[i], chars[i + 2]) {
            expanded.extend(chars[i]..=chars[i + 2]);
            i += 3;
        } else {
            expanded.push(chars[i]);
            i += 1;
        }
    }

    let charset: Charset = expanded.into_iter().collect();
    if charset.is_empty() {
        Charset::common()
    } else {
        charset
    }
}

fn is_ascii_range(lo: char, hi: char) -> bool {
    lo.is_ascii() && hi.is_ascii() && lo <= hi
}

/// Extracts one flat charset from a pattern, taking everything between the
/// first `[` and the last `]`.
///
/// Used by unstructured brute force, where the pattern only describes which
/// characters may appear. Patterns without a bracket pair yield [`Charset::common`].
pub fn charset_from_pattern(pattern: &str) -> Charset {
    let start = pattern.find('[').map(|i| i + 1);
    let end = pattern.rfind(']');
    match (start, end) {
        (Some(start), Some(end)) if start < end => expand_class(&pattern[start..end]),
        _ => Charset::common(),
    }
}

/// The charset "styles" drawn from by varied random generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharsetStyle {
    Lower,
    Digits,
    LowerDigits,
    UpperDigits,
    Alphanumeric,
    Common,
}

impl CharsetStyle {
    pub const ALL: [CharsetStyle; 6] = [
        CharsetStyle::Lower,
        CharsetStyle::Digits,
        CharsetStyle::LowerDigits,
        CharsetStyle::UpperDigits,
        CharsetStyle::Alphanumeric,
        CharsetStyle::Common,
    ];

    pub fn charset(self) -> Charset {
        match self {
            CharsetStyle::Lower => Charset::new(LOWER),
            CharsetStyle::Digits => Charset::new(DIGITS),
            CharsetStyle::LowerDigits => LOWER.chars().chain(DIGITS.chars()).collect(),
            CharsetStyle::UpperDigits => UPPER.chars().chain(DIGITS.chars()).collect(),
            CharsetStyle::Alphanumeric => LOWER
                .chars()
                .chain(UPPER.chars())
                .chain(DIGITS.chars())
                .collect(),
            CharsetStyle::Common => Charset::common(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_class_handles_single_range() {
        assert_eq!(expand_class("a-c").to_string(), "abc");
    }

    #[test]
    fn expand_class_keeps_range_order() {
        assert_eq!(expand_class("A-B0-1").to_string(), "AB01");
    }

    #[test]
    fn expand_class_takes_plain_characters_literally() {
        assert_eq!(expand_class("#_").to_string(), "#_");
    }

    #[test]
    fn expand_class_treats_trailing_dash_as_literal() {
        let expanded = expand_class("a-zA-Z0-9!@#_-");
        assert_eq!(
            expanded.to_string(),
            "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#_-"
        );
    }

    #[test]
    fn expand_class_deduplicates_keeping_first_occurrence() {
        assert_eq!(expand_class("cba-c").to_string(), "cba");
        assert_eq!(expand_class("0-30-5").to_string(), "012345");
    }

    #[test]
    fn expand_class_treats_descending_range_literally() {
        assert_eq!(expand_class("z-a").to_string(), "z-a");
    }

    #[test]
    fn expand_class_falls_back_to_common_on_empty_input() {
        assert_eq!(expand_class(""), Charset::common());
    }

    #[test]
    fn charset_from_pattern_spans_first_to_last_bracket() {
        assert_eq!(charset_from_pattern("[a-c]").to_string(), "abc");
        assert_eq!(charset_from_pattern("[0-2]{4}").to_string(), "012");
        assert_eq!(charset_from_pattern("no brackets"), Charset::common());
        assert_eq!(charset_from_pattern(""), Charset::common());
        assert_eq!(charset_from_pattern("]["), Charset::common());
    }

    #[test]
    fn word_likeness_requires_letter_majority() {
        assert!(Charset::new("abc1").is_word_like());
        assert!(!Charset::new("ab12").is_word_like());
        assert!(!Charset::new(DIGITS).is_word_like());
        assert!(Charset::common().is_word_like());
        assert!(!Charset::default().is_word_like());
    }

    #[test]
    fn punctuation_lists_only_symbols_in_order() {
        let charset = expand_class("a-c_#1");
        assert_eq!(charset.punctuation(), vec!['_', '#']);
    }

    #[test]
    fn styles_build_deduplicated_sets() {
        assert_eq!(CharsetStyle::Lower.charset().len(), 26);
        assert_eq!(CharsetStyle::LowerDigits.charset().len(), 36);
        assert_eq!(CharsetStyle::Alphanumeric.charset().len(), 62);
        assert_eq!(CharsetStyle::Common.charset().len(), COMMON.len());
        for style in CharsetStyle::ALL {
            assert!(!style.charset().is_empty(), "{style:?} should not be empty");
        }
    }
}
