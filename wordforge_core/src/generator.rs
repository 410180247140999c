//! Randomized candidate generators.
//!
//! Every generator takes its random source as an explicit parameter. Callers
//! producing real candidates pass [`crate::rng::secure_rng`]; tests pass a
//! seeded generator.

use crate::charset::{Charset, CharsetStyle, DIGITS, LOWER, SPECIAL, UPPER};
use crate::pattern::Segment;
use rand::Rng;
use thiserror::Error;

/// Probability that a word-like class receiving seed material also gets a separator.
const SEPARATOR_PROBABILITY: f64 = 0.4;

/// Errors raised by random candidate generation.
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// The operating system entropy source could not seed the generator.
    /// Retrying a broken entropy source is unsafe, so this is never retried.
    #[error("Secure entropy source unavailable: {0}")]
    Entropy(#[from] rand_core::OsError),

    /// No acceptable candidate was produced within the attempt budget.
    #[error("No acceptable candidate after {attempts} attempts")]
    RetryBudgetExhausted { attempts: usize },
}

/// Picks a length uniformly in `min_len..=max_len`, then each character uniformly from `charset`.
pub fn random_from_charset<R: Rng + ?Sized>(
    charset: &Charset,
    min_len: usize,
    max_len: usize,
    rng: &mut R,
) -> String {
    if charset.is_empty() {
        return String::new();
    }
    let len = if max_len > min_len {
        rng.random_range(min_len..=max_len)
    } else {
        min_len
    };
    let chars = charset.chars();
    (0..len)
        .map(|_| chars[rng.random_range(0..chars.len())])
        .collect()
}

/// Chooses one of the [`CharsetStyle`]s uniformly and samples from it.
pub fn random_varied<R: Rng + ?Sized>(min_len: usize, max_len: usize, rng: &mut R) -> String {
    let style = CharsetStyle::ALL[rng.random_range(0..CharsetStyle::ALL.len())];
    random_from_charset(&style.charset(), min_len, max_len, rng)
}

/// Concatenates `min_blocks..=max_blocks` blocks of lower, upper, digit, special.
pub fn random_block_pattern<R: Rng + ?Sized>(
    min_blocks: usize,
    max_blocks: usize,
    rng: &mut R,
) -> String {
    let blocks = if max_blocks > min_blocks {
        rng.random_range(min_blocks..=max_blocks)
    } else {
        min_blocks
    };
    let mut out = String::with_capacity(blocks * 4);
    for _ in 0..blocks {
        for alphabet in [LOWER, UPPER, DIGITS, SPECIAL] {
            out.push(random_char(alphabet, rng));
        }
    }
    out
}

fn random_char<R: Rng + ?Sized>(alphabet: &str, rng: &mut R) -> char {
    let bytes = alphabet.as_bytes();
    bytes[rng.random_range(0..bytes.len())] as char
}

/// One random string matching a single segment.
pub fn random_segment<R: Rng + ?Sized>(segment: &Segment, rng: &mut R) -> String {
    match segment {
        Segment::CharClass { charset, min, max } => random_from_charset(charset, *min, *max, rng),
        Segment::Literal { text } => text.clone(),
        Segment::Alternation { variants } => {
            if variants.is_empty() {
                return String::new();
            }
            random_segment(&variants[rng.random_range(0..variants.len())], rng)
        }
    }
}

/// One random string matching every segment in order.
pub fn random_from_segments<R: Rng + ?Sized>(segments: &[Segment], rng: &mut R) -> String {
    segments.iter().map(|s| random_segment(s, rng)).collect()
}

/// Random casing: 30% lower, 30% title, 10% upper, 30% per-letter coin flips.
pub fn randomize_case<R: Rng + ?Sized>(s: &str, rng: &mut R) -> String {
    match rng.random_range(0..10) {
        0..=2 => s.to_lowercase(),
        3..=5 => {
            let mut chars = s.chars();
            match chars.next() {
                Some(first) => {
                    let rest = chars.as_str().to_lowercase();
                    first.to_uppercase().chain(rest.chars()).collect()
                }
                None => String::new(),
            }
        }
        6 => s.to_uppercase(),
        _ => s
            .chars()
            .map(|c| {
                if !c.is_ascii_alphabetic() {
                    c
                } else if rng.random_bool(0.5) {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect(),
    }
}

/// Random string over `segments` with one seed woven into the word-like segments.
///
/// A seed is picked uniformly and recased with [`randomize_case`]. Walking the
/// segments left to right, a literal is replaced by whatever seed material is
/// left, and a word-like class takes a prefix of it sized to the class: the
/// whole remainder when the class can be longer than two characters, otherwise
/// up to its maximum. A class with spare room may then receive one punctuation
/// separator from its own charset, and is topped up with random draws when the
/// seed ran short of its minimum. Everything else is generated normally, and
/// seed material left over at the end is prepended.
pub fn random_from_segments_with_seed<R: Rng + ?Sized>(
    segments: &[Segment],
    seeds: &[String],
    rng: &mut R,
) -> String {
    if seeds.is_empty() {
        return random_from_segments(segments, rng);
    }
    let seed = &seeds[rng.random_range(0..seeds.len())];
    let cased: Vec<char> = randomize_case(seed, rng).chars().collect();
    let mut remaining: &[char] = &cased;
    let mut out = String::new();

    for segment in segments {
        if remaining.is_empty() || !segment.is_word_like() {
            out.push_str(&random_segment(segment, rng));
            continue;
        }
        match segment {
            Segment::CharClass { charset, min, max } => {
                let (min, max) = (*min, *max);
                let wanted = if max > min {
                    if max > 2 { remaining.len() } else { max }
                } else {
                    min
                };
                let taken = wanted.min(remaining.len());
                out.extend(&remaining[..taken]);
                remaining = &remaining[taken..];

                let mut produced = taken;
                if produced < max {
                    let separators = charset.punctuation();
                    if !separators.is_empty() && rng.random_bool(SEPARATOR_PROBABILITY) {
                        out.push(separators[rng.random_range(0..separators.len())]);
                        produced += 1;
                    }
                }
                if produced < min {
                    let fill = min - produced;
                    out.push_str(&random_from_charset(charset, fill, fill, rng));
                }
            }
            Segment::Literal { .. } => {
                out.extend(remaining);
                remaining = &[];
            }
            Segment::Alternation { .. } => out.push_str(&random_segment(segment, rng)),
        }
    }

    if remaining.is_empty() {
        out
    } else {
        remaining.iter().collect::<String>() + &out
    }
}
