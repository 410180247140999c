use crate::charset::{Charset, DIGITS, SPECIAL};
use crate::generator::random_from_charset;
use log::warn;
use rand::Rng;

/// Defines how many times a mutation is re-rolled when it reproduces the seed unchanged.
pub const DEFAULT_MAX_MUTATION_RETRIES: usize = 16;
/// Defines the probability that a letter has its case toggled by [`Mutation::ToggleCase`].
const CASE_TOGGLE_PROBABILITY: f64 = 0.2;
/// Defines the probability that an eligible letter is replaced by [`Mutation::Leetspeak`].
const LEET_PROBABILITY: f64 = 0.5;

const COMMON_SUFFIXES: [&str; 24] = [
    "123", "2010", "2011", "2012", "2013", "2014", "2015", "2016", "2017", "2018", "2019", "2020",
    "2021", "2022", "2023", "2024", "2025", "2026", "3125", "5213", "!", "!!", "@", "1",
];
const LEGACY_YEARS: [&str; 13] = [
    "1998", "1999", "2000", "2001", "2002", "2003", "2004", "2005", "2006", "2007", "2008", "2009",
    "2010",
];
const PADDINGS: [&str; 4] = ["---", "___", "...", "!!!"];
const LEET_TABLE: [(char, char); 6] = [
    ('a', '4'),
    ('e', '3'),
    ('i', '1'),
    ('o', '0'),
    ('s', '5'),
    ('t', '7'),
];

/// A `Mutator` derives a new candidate from a seed string.
///
/// # Type Parameters
/// * `R`: The type of random number generator used for mutation decisions.
pub trait Mutator<R: Rng + ?Sized> {
    /// Produces a candidate derived from `seed`.
    fn mutate(&mut self, seed: &str, rng: &mut R) -> String;
}

/// The catalog of human-style edits applied to seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Toggles the case of each letter with 20% probability.
    ToggleCase,
    PrependDigit,
    /// Appends a common suffix such as a recent year or `!!`.
    AppendCommonSuffix,
    InsertUnderscore,
    /// Replaces `a/e/i/o/s/t` with `4/3/1/0/5/7`, each with 50% probability.
    Leetspeak,
    CapitalizeFirst,
    AppendDigit,
    /// Uppercases one letter after the first position.
    CapitalizeInner,
    AppendDigitSpecial,
    /// Appends a year from 1998 to 2010, common on older devices.
    AppendLegacyYear,
    /// Wraps the seed in the same padding token on both sides.
    WrapPadding,
}

impl Mutation {
    pub const ALL: [Mutation; 11] = [
        Mutation::ToggleCase,
        Mutation::PrependDigit,
        Mutation::AppendCommonSuffix,
        Mutation::InsertUnderscore,
        Mutation::Leetspeak,
        Mutation::CapitalizeFirst,
        Mutation::AppendDigit,
        Mutation::CapitalizeInner,
        Mutation::AppendDigitSpecial,
        Mutation::AppendLegacyYear,
        Mutation::WrapPadding,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Applies this edit to `buf` in place.
    pub fn apply<R: Rng + ?Sized>(self, buf: &mut Vec<char>, rng: &mut R) {
        match self {
            Mutation::ToggleCase => {
                for c in buf.iter_mut() {
                    if c.is_ascii_alphabetic() && rng.random_bool(CASE_TOGGLE_PROBABILITY) {
                        *c = toggle_ascii_case(*c);
                    }
                }
            }
            Mutation::PrependDigit => buf.insert(0, pick_char(DIGITS, rng)),
            Mutation::AppendCommonSuffix => buf.extend(pick(&COMMON_SUFFIXES, rng).chars()),
            Mutation::InsertUnderscore => {
                let pos = rng.random_range(0..=buf.len());
                buf.insert(pos, '_');
            }
            Mutation::Leetspeak => {
                for c in buf.iter_mut() {
                    if let Some(&(_, leet)) = LEET_TABLE.iter().find(|(plain, _)| *plain == *c) {
                        if rng.random_bool(LEET_PROBABILITY) {
                            *c = leet;
                        }
                    }
                }
            }
            Mutation::CapitalizeFirst => {
                if let Some(first) = buf.first_mut() {
                    *first = first.to_ascii_uppercase();
                }
            }
            Mutation::AppendDigit => buf.push(pick_char(DIGITS, rng)),
            Mutation::CapitalizeInner => {
                if buf.len() > 1 {
                    let pos = rng.random_range(1..buf.len());
                    buf[pos] = buf[pos].to_ascii_uppercase();
                }
            }
            Mutation::AppendDigitSpecial => {
                buf.push(pick_char(DIGITS, rng));
                buf.push(pick_char(SPECIAL, rng));
            }
            Mutation::AppendLegacyYear => buf.extend(pick(&LEGACY_YEARS, rng).chars()),
            Mutation::WrapPadding => {
                let padding = pick(&PADDINGS, rng);
                let mut wrapped: Vec<char> = padding.chars().collect();
                wrapped.append(buf);
                wrapped.extend(padding.chars());
                *buf = wrapped;
            }
        }
    }
}

fn toggle_ascii_case(c: char) -> char {
    if c.is_ascii_lowercase() {
        c.to_ascii_uppercase()
    } else {
        c.to_ascii_lowercase()
    }
}

fn pick<'a, R: Rng + ?Sized>(options: &[&'a str], rng: &mut R) -> &'a str {
    options[rng.random_range(0..options.len())]
}

fn pick_char<R: Rng + ?Sized>(alphabet: &str, rng: &mut R) -> char {
    let bytes = alphabet.as_bytes();
    bytes[rng.random_range(0..bytes.len())] as char
}

/// Mutates seeds with 1-3 random [`Mutation`]s and repairs the result into
/// `min_len..=max_len`.
///
/// A result identical to a non-empty seed is re-rolled from scratch up to
/// `max_retries` times. If every attempt reproduces the seed, the last attempt
/// is returned anyway so the length bounds still hold.
#[derive(Debug, Clone)]
pub struct SeedMutator {
    min_len: usize,
    max_len: usize,
    max_retries: usize,
    fill: Charset,
}

impl SeedMutator {
    pub fn new(min_len: usize, max_len: usize) -> Self {
        Self {
            min_len,
            max_len: max_len.max(min_len),
            max_retries: DEFAULT_MAX_MUTATION_RETRIES,
            fill: Charset::common(),
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn bounds(&self) -> (usize, usize) {
        (self.min_len, self.max_len)
    }

    fn mutate_once<R: Rng + ?Sized>(&self, seed: &str, rng: &mut R) -> String {
        let mut buf: Vec<char> = seed.chars().collect();
        let rounds = rng.random_range(1..=3);
        for _ in 0..rounds {
            Mutation::random(rng).apply(&mut buf, rng);
        }
        self.repair_length(&mut buf, rng);
        buf.into_iter().collect()
    }

    /// Pads with common characters up to `min_len`, or truncates from a random
    /// side down to `max_len`.
    fn repair_length<R: Rng + ?Sized>(&self, buf: &mut Vec<char>, rng: &mut R) {
        if buf.len() < self.min_len {
            let missing = self.min_len - buf.len();
            buf.extend(random_from_charset(&self.fill, missing, missing, rng).chars());
        }
        if buf.len() > self.max_len {
            let excess = buf.len() - self.max_len;
            if rng.random_bool(0.5) {
                buf.truncate(self.max_len);
            } else {
                buf.drain(..excess);
            }
        }
    }
}

impl<R: Rng + ?Sized> Mutator<R> for SeedMutator {
    fn mutate(&mut self, seed: &str, rng: &mut R) -> String {
        if seed.is_empty() {
            return random_from_charset(&self.fill, self.min_len, self.max_len, rng);
        }
        let mut candidate = String::new();
        for _ in 0..self.max_retries {
            candidate = self.mutate_once(seed, rng);
            if candidate != seed {
                return candidate;
            }
        }
        warn!(
            "Mutation of {seed:?} reproduced the seed {} times, keeping the unchanged result",
            self.max_retries
        );
        candidate
    }
}

/// Mutates `seed` once with a [`SeedMutator`] bounded to `min_len..=max_len`.
pub fn mutate<R: Rng + ?Sized>(seed: &str, min_len: usize, max_len: usize, rng: &mut R) -> String {
    SeedMutator::new(min_len, max_len).mutate(seed, rng)
}
