//! Exhaustive, resumable enumerators.
//!
//! Every enumerator is a pull-based [`Iterator`]: `Some(candidate)` means the
//! walk continues, `None` means it is exhausted. Dropping an enumerator halfway
//! is the only form of cancellation.

use crate::charset::Charset;
use crate::pattern::Segment;
use std::iter::FusedIterator;

/// Odometer over a single charset whose length grows from `min_len` to `max_len`.
///
/// Produces every string of every length in range, shortest first, each length
/// in charset order.
#[derive(Debug, Clone)]
pub struct SequentialEnumerator {
    charset: Vec<char>,
    indices: Vec<usize>,
    max_len: usize,
    done: bool,
}

impl SequentialEnumerator {
    pub fn new(charset: &Charset, min_len: usize, max_len: usize) -> Self {
        // Without characters only the empty string can be produced.
        let done = min_len > max_len || (charset.is_empty() && min_len > 0);
        Self {
            charset: charset.chars().to_vec(),
            indices: vec![0; min_len],
            max_len,
            done,
        }
    }

    /// Length of the strings currently being produced.
    pub fn current_len(&self) -> usize {
        self.indices.len()
    }

    fn advance(&mut self) {
        let mut pos = self.indices.len();
        loop {
            if pos == 0 {
                if self.indices.len() < self.max_len && !self.charset.is_empty() {
                    self.indices = vec![0; self.indices.len() + 1];
                } else {
                    self.done = true;
                }
                return;
            }
            pos -= 1;
            self.indices[pos] += 1;
            if self.indices[pos] < self.charset.len() {
                return;
            }
            self.indices[pos] = 0;
        }
    }
}

impl Iterator for SequentialEnumerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        let current = self.indices.iter().map(|&i| self.charset[i]).collect();
        self.advance();
        Some(current)
    }
}

impl FusedIterator for SequentialEnumerator {}

/// Fixed-length odometer where position `i` draws from its own charset.
#[derive(Debug, Clone)]
pub struct PositionalEnumerator {
    charsets: Vec<Vec<char>>,
    indices: Vec<usize>,
    done: bool,
}

impl PositionalEnumerator {
    pub fn new(charsets: &[Charset]) -> Self {
        Self {
            charsets: charsets.iter().map(|c| c.chars().to_vec()).collect(),
            indices: vec![0; charsets.len()],
            done: charsets.iter().any(Charset::is_empty),
        }
    }

    fn advance(&mut self) {
        let mut pos = self.indices.len();
        loop {
            if pos == 0 {
                self.done = true;
                return;
            }
            pos -= 1;
            self.indices[pos] += 1;
            if self.indices[pos] < self.charsets[pos].len() {
                return;
            }
            self.indices[pos] = 0;
        }
    }
}

impl Iterator for PositionalEnumerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        let current = self
            .indices
            .iter()
            .zip(&self.charsets)
            .map(|(&i, charset)| charset[i])
            .collect();
        self.advance();
        Some(current)
    }
}

impl FusedIterator for PositionalEnumerator {}

impl Segment {
    /// Every string this segment can produce.
    ///
    /// A class yields every string of every length in `min..=max` (via
    /// [`SequentialEnumerator`]), a literal yields itself, an alternation the
    /// concatenated expansions of its variants.
    pub fn expand(&self) -> Vec<String> {
        match self {
            Segment::CharClass { charset, min, max } => (*min..=*max)
                .flat_map(|len| SequentialEnumerator::new(charset, len, len))
                .collect(),
            Segment::Literal { text } => vec![text.clone()],
            Segment::Alternation { variants } => {
                variants.iter().flat_map(Segment::expand).collect()
            }
        }
    }
}

/// Cartesian product over the expansions of a segment list.
///
/// Every segment is expanded up front, so the cost is exponential in the
/// number of segments. Meant for small, deliberately bounded patterns.
#[derive(Debug, Clone)]
pub struct SegmentedEnumerator {
    outputs: Vec<Vec<String>>,
    indices: Vec<usize>,
    prefix: String,
    limit: Option<usize>,
    emitted: usize,
    done: bool,
}

impl SegmentedEnumerator {
    pub fn new(segments: &[Segment]) -> Self {
        let outputs: Vec<Vec<String>> = segments.iter().map(Segment::expand).collect();
        let done = outputs.iter().any(Vec::is_empty);
        Self {
            indices: vec![0; outputs.len()],
            outputs,
            prefix: String::new(),
            limit: None,
            emitted: 0,
            done,
        }
    }

    /// Prepends `prefix` to every candidate.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Stops after `limit` candidates. Zero means no ceiling.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = (limit > 0).then_some(limit);
        self
    }

    /// Size of the full cross product, saturating at `u128::MAX`.
    pub fn total_combinations(&self) -> u128 {
        self.outputs
            .iter()
            .fold(1u128, |acc, o| acc.saturating_mul(o.len() as u128))
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn advance(&mut self) {
        let mut pos = self.indices.len();
        loop {
            if pos == 0 {
                self.done = true;
                return;
            }
            pos -= 1;
            self.indices[pos] += 1;
            if self.indices[pos] < self.outputs[pos].len() {
                return;
            }
            self.indices[pos] = 0;
        }
    }
}

impl Iterator for SegmentedEnumerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done || self.limit.is_some_and(|limit| self.emitted >= limit) {
            return None;
        }
        let mut current = self.prefix.clone();
        for (output, &i) in self.outputs.iter().zip(&self.indices) {
            current.push_str(&output[i]);
        }
        self.emitted += 1;
        self.advance();
        Some(current)
    }
}

impl FusedIterator for SegmentedEnumerator {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_grows_length_shortest_first() {
        let produced: Vec<String> =
            SequentialEnumerator::new(&Charset::new("ab"), 1, 2).collect();
        assert_eq!(produced, vec!["a", "b", "aa", "ab", "ba", "bb"]);
    }

    #[test]
    fn sequential_signals_exhaustion_repeatedly() {
        let mut enumerator = SequentialEnumerator::new(&Charset::new("x"), 1, 1);
        assert_eq!(enumerator.next().as_deref(), Some("x"));
        assert_eq!(enumerator.next(), None);
        assert_eq!(enumerator.next(), None);
    }

    #[test]
    fn sequential_covers_every_string_in_range() {
        let count = SequentialEnumerator::new(&Charset::new("abc"), 2, 3).count();
        assert_eq!(count, 9 + 27);
    }

    #[test]
    fn sequential_starts_with_empty_string_for_zero_min() {
        let produced: Vec<String> = SequentialEnumerator::new(&Charset::new("01"), 0, 1).collect();
        assert_eq!(produced, vec!["", "0", "1"]);
    }

    #[test]
    fn sequential_handles_degenerate_input() {
        assert_eq!(SequentialEnumerator::new(&Charset::new("ab"), 3, 2).count(), 0);
        assert_eq!(SequentialEnumerator::new(&Charset::default(), 1, 3).count(), 0);
        let only_empty: Vec<String> =
            SequentialEnumerator::new(&Charset::default(), 0, 3).collect();
        assert_eq!(only_empty, vec![""]);
    }

    #[test]
    fn sequential_is_resumable_after_interruption() {
        let mut enumerator = SequentialEnumerator::new(&Charset::new("ab"), 1, 2);
        let head: Vec<String> = enumerator.by_ref().take(3).collect();
        assert_eq!(head, vec!["a", "b", "aa"]);
        assert_eq!(enumerator.current_len(), 2);
        let tail: Vec<String> = enumerator.collect();
        assert_eq!(tail, vec!["ab", "ba", "bb"]);
    }

    #[test]
    fn positional_uses_charset_per_position() {
        let charsets = [Charset::new("ab"), Charset::new("01")];
        let produced: Vec<String> = PositionalEnumerator::new(&charsets).collect();
        assert_eq!(produced, vec!["a0", "a1", "b0", "b1"]);
    }

    #[test]
    fn positional_with_empty_position_produces_nothing() {
        let charsets = [Charset::new("ab"), Charset::default()];
        assert_eq!(PositionalEnumerator::new(&charsets).count(), 0);
    }

    #[test]
    fn segment_expansion_by_kind() {
        let class = Segment::char_class(Charset::new("ab"), 0, 1);
        assert_eq!(class.expand(), vec!["", "a", "b"]);
        assert_eq!(Segment::literal("hi").expand(), vec!["hi"]);
        let alternation = Segment::Alternation {
            variants: vec![Segment::literal("x"), Segment::char_class(Charset::new("12"), 1, 1)],
        };
        assert_eq!(alternation.expand(), vec!["x", "1", "2"]);
    }

    #[test]
    fn segmented_walks_cross_product_in_order() {
        let segments = [
            Segment::literal("x"),
            Segment::char_class(Charset::new("01"), 1, 1),
        ];
        for limit in [0, 2, 5] {
            let produced: Vec<String> =
                SegmentedEnumerator::new(&segments).with_limit(limit).collect();
            assert_eq!(produced, vec!["x0", "x1"], "limit {limit}");
        }
    }

    #[test]
    fn segmented_respects_limit_and_prefix() {
        let segments = [
            Segment::char_class(Charset::new("ab"), 1, 1),
            Segment::char_class(Charset::new("01"), 1, 1),
        ];
        let mut enumerator = SegmentedEnumerator::new(&segments)
            .with_prefix("pre-")
            .with_limit(3);
        assert_eq!(enumerator.total_combinations(), 4);
        let produced: Vec<String> = enumerator.by_ref().collect();
        assert_eq!(produced, vec!["pre-a0", "pre-a1", "pre-b0"]);
        assert_eq!(enumerator.emitted(), 3);
    }

    #[test]
    fn segmented_expands_alternation_variants() {
        let segments = [
            Segment::Alternation {
                variants: vec![Segment::literal("admin"), Segment::literal("root")],
            },
            Segment::char_class(Charset::new("12"), 1, 1),
        ];
        let produced: Vec<String> = SegmentedEnumerator::new(&segments).collect();
        assert_eq!(produced, vec!["admin1", "admin2", "root1", "root2"]);
    }

    #[test]
    fn segmented_without_segments_emits_prefix_once() {
        let produced: Vec<String> = SegmentedEnumerator::new(&[]).with_prefix("p").collect();
        assert_eq!(produced, vec!["p"]);
    }

    #[test]
    fn segmented_with_empty_alternation_produces_nothing() {
        let segments = [Segment::Alternation { variants: vec![] }];
        assert_eq!(SegmentedEnumerator::new(&segments).count(), 0);
    }
}
