//! Compiler for the candidate pattern language.
//!
//! The language is a small ASCII subset of regular-expression syntax:
//! bracket classes `[a-z0-9_]`, groups `(...)` with optional `|` alternatives,
//! the quantifiers `+`, `*`, `{m}`, `{m,n}` and `{m,}` directly after a class or
//! group, and an optional trailing global length clause `{m,n}` / `[m,n]`.
//!
//! Compilation never fails. Constructs that cannot be understood degrade to
//! inert text, which the scanner skips, or to a literal of the raw group text.

use crate::charset::{Charset, expand_class};
use log::debug;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

/// Upper bound given to `+` and `*`.
pub const DEFAULT_REPEAT_CAP: usize = 8;
/// Upper bound given to the open range quantifier `{m,}`.
pub const DEFAULT_OPEN_RANGE_CAP: usize = 12;
/// Length bounds reported for a pattern that yields no segments and no length clause.
pub const FALLBACK_LENGTH_BOUNDS: (usize, usize) = (6, 12);

static LENGTH_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\[\{](\d+)[-,\s](\d+)[\]\}]$").expect("length clause regex is valid")
});

/// Caps applied to unbounded quantifiers so exhaustive expansion stays finite.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct CompileLimits {
    #[serde(default = "default_repeat_cap")]
    pub repeat_cap: usize,
    #[serde(default = "default_open_range_cap")]
    pub open_range_cap: usize,
}

fn default_repeat_cap() -> usize {
    DEFAULT_REPEAT_CAP
}

fn default_open_range_cap() -> usize {
    DEFAULT_OPEN_RANGE_CAP
}

impl Default for CompileLimits {
    fn default() -> Self {
        Self {
            repeat_cap: default_repeat_cap(),
            open_range_cap: default_open_range_cap(),
        }
    }
}

/// One constrained unit of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A run of `min..=max` characters drawn from `charset`.
    CharClass {
        charset: Charset,
        min: usize,
        max: usize,
    },
    /// Exactly `text`.
    Literal { text: String },
    /// Exactly one of `variants`.
    Alternation { variants: Vec<Segment> },
}

impl Segment {
    pub fn char_class(charset: Charset, min: usize, max: usize) -> Self {
        Segment::CharClass {
            charset,
            min,
            max: max.max(min),
        }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Segment::Literal { text: text.into() }
    }

    /// Shortest and longest string this segment can produce, in characters.
    pub fn bounds(&self) -> (usize, usize) {
        match self {
            Segment::CharClass { min, max, .. } => (*min, *max),
            Segment::Literal { text } => {
                let len = text.chars().count();
                (len, len)
            }
            Segment::Alternation { variants } => {
                let mut bounds = variants.iter().map(Segment::bounds);
                let Some(first) = bounds.next() else {
                    return (0, 0);
                };
                bounds.fold(first, |(lo, hi), (min, max)| (lo.min(min), hi.max(max)))
            }
        }
    }

    /// Whether the segment resembles natural-language text and may receive
    /// injected seed material. Literals always do; a class does when letters
    /// make up more than half its charset; alternations never do.
    pub fn is_word_like(&self) -> bool {
        match self {
            Segment::Literal { .. } => true,
            Segment::CharClass { charset, .. } => charset.is_word_like(),
            Segment::Alternation { .. } => false,
        }
    }

    fn apply_quantifier(&mut self, quantifier: (usize, usize)) {
        match self {
            Segment::CharClass { min, max, .. } => {
                *min = quantifier.0;
                *max = quantifier.1.max(quantifier.0);
            }
            Segment::Literal { .. } | Segment::Alternation { .. } => {
                debug!(
                    "Quantifier {{{},{}}} on a literal or alternation group is ignored",
                    quantifier.0, quantifier.1
                );
            }
        }
    }
}

/// A compiled pattern: the ordered segments plus the optional global length clause.
///
/// Immutable once compiled. The source text and caps are kept so callers can
/// read quantifiers the segment list does not carry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pattern {
    source: String,
    limits: CompileLimits,
    segments: Vec<Segment>,
    length_override: Option<(usize, usize)>,
}

impl Pattern {
    pub fn compile(source: &str) -> Self {
        Self::compile_with(source, &CompileLimits::default())
    }

    pub fn compile_with(source: &str, limits: &CompileLimits) -> Self {
        let (_, length_override) = split_length_clause(source);
        let segments = compile_body(source, limits);
        if segments.is_empty() && !source.is_empty() {
            debug!("Pattern {source:?} compiled to no segments");
        }
        Self {
            source: source.to_string(),
            limits: *limits,
            segments,
            length_override,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    pub fn length_override(&self) -> Option<(usize, usize)> {
        self.length_override
    }

    /// An empty pattern places no constraint on generation.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The quantifier written directly after the first occurrence of
    /// `construct` in the source, e.g. `{4}` after a group.
    pub fn quantifier_after(&self, construct: &str) -> Option<(usize, usize)> {
        let start = self.source.find(construct)?;
        let mut parser = Parser::new(&self.source, &self.limits);
        parser.pos = start + construct.len();
        parser.parse_quantifier()
    }

    /// Total length bounds: the global clause if present, otherwise the sum of
    /// the segment bounds, otherwise [`FALLBACK_LENGTH_BOUNDS`].
    pub fn length_bounds(&self) -> (usize, usize) {
        if let Some(bounds) = self.length_override {
            return bounds;
        }
        if self.segments.is_empty() {
            return FALLBACK_LENGTH_BOUNDS;
        }
        self.segments
            .iter()
            .map(Segment::bounds)
            .fold((0, 0), |(lo, hi), (min, max)| {
                (lo.saturating_add(min), hi.saturating_add(max))
            })
    }
}

/// Compiles `pattern` with the default quantifier caps.
pub fn compile(pattern: &str) -> Vec<Segment> {
    Pattern::compile(pattern).into_segments()
}

/// Length bounds of `pattern` with the default quantifier caps.
pub fn parse_length_bounds(pattern: &str) -> (usize, usize) {
    Pattern::compile(pattern).length_bounds()
}

/// Strips the global clause and any enclosing parens, then scans the rest.
/// Group bodies and class alternatives go through here as well.
fn compile_body(source: &str, limits: &CompileLimits) -> Vec<Segment> {
    let (body, _) = split_length_clause(source);
    let body = strip_wrapping_parens(body);
    Parser::new(body, limits).parse()
}

/// Splits a trailing `{m,n}` / `[m,n]` clause (separator `,`, `-` or whitespace)
/// off the pattern.
fn split_length_clause(source: &str) -> (&str, Option<(usize, usize)>) {
    let Some(captures) = LENGTH_CLAUSE.captures(source) else {
        return (source, None);
    };
    let (Some(whole), Some(min), Some(max)) = (captures.get(0), captures.get(1), captures.get(2))
    else {
        return (source, None);
    };
    match (min.as_str().parse::<usize>(), max.as_str().parse::<usize>()) {
        (Ok(min), Ok(max)) => (&source[..whole.start()], Some((min, max.max(min)))),
        _ => {
            debug!("Length clause in {source:?} is out of range, ignoring it");
            (source, None)
        }
    }
}

/// Unwraps `(...)` enclosing the whole body. An alternation inside loses its
/// group and its `|` become inert text.
fn strip_wrapping_parens(body: &str) -> &str {
    if body.starts_with('(') && find_closing_paren(body, 0) == Some(body.len() - 1) {
        return &body[1..body.len() - 1];
    }
    body
}

/// Index of the `)` matching the `(` at `open`, accounting for nesting.
fn find_closing_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in s.bytes().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits on `|` that sit outside any nested group or bracket class.
fn split_top_level_alternatives(body: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_class = false;
    let mut start = 0;
    for (i, b) in body.bytes().enumerate() {
        match b {
            b'[' if !in_class => in_class = true,
            b']' if in_class => in_class = false,
            b'(' if !in_class => depth += 1,
            b')' if !in_class => depth = depth.saturating_sub(1),
            b'|' if !in_class && depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if parts.is_empty() {
        return None;
    }
    parts.push(&body[start..]);
    Some(parts)
}

/// Recursive-descent scanner over one pattern body.
struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    limits: &'a CompileLimits,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, limits: &'a CompileLimits) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            limits,
        }
    }

    fn parse(mut self) -> Vec<Segment> {
        let mut segments = Vec::new();
        while self.pos < self.bytes.len() {
            let segment = match self.bytes[self.pos] {
                b'[' => self.parse_class(),
                b'(' => self.parse_group(),
                _ => None,
            };
            match segment {
                Some(mut segment) => {
                    if let Some(quantifier) = self.parse_quantifier() {
                        segment.apply_quantifier(quantifier);
                    }
                    segments.push(segment);
                }
                // Bare characters and unterminated constructs are inert.
                None => self.pos += 1,
            }
        }
        segments
    }

    fn parse_class(&mut self) -> Option<Segment> {
        let close = self.pos + self.src[self.pos..].find(']')?;
        let charset = expand_class(&self.src[self.pos + 1..close]);
        self.pos = close + 1;
        Some(Segment::char_class(charset, 1, 1))
    }

    fn parse_group(&mut self) -> Option<Segment> {
        let close = find_closing_paren(self.src, self.pos)?;
        let body = &self.src[self.pos + 1..close];
        self.pos = close + 1;
        Some(self.compile_group(body))
    }

    fn compile_group(&self, body: &str) -> Segment {
        if let Some(alternatives) = split_top_level_alternatives(body) {
            let variants = alternatives
                .into_iter()
                .filter_map(|alternative| {
                    if alternative.starts_with('[') {
                        compile_body(alternative, self.limits).into_iter().next()
                    } else {
                        Some(Segment::literal(alternative))
                    }
                })
                .collect();
            return Segment::Alternation { variants };
        }

        let mut inner = compile_body(body, self.limits);
        if inner.len() == 1 {
            return inner.remove(0);
        }
        // Multi-segment groups without alternation are not expanded.
        debug!("Group ({body}) holds {} segments, kept as literal", inner.len());
        Segment::literal(body)
    }

    /// Reads `+`, `*`, `{n}`, `{m,n}` or `{m,}` at the current position.
    fn parse_quantifier(&mut self) -> Option<(usize, usize)> {
        match self.bytes.get(self.pos)? {
            b'+' => {
                self.pos += 1;
                Some((1, self.limits.repeat_cap))
            }
            b'*' => {
                self.pos += 1;
                Some((0, self.limits.repeat_cap))
            }
            b'{' => {
                let close = self.pos + self.src[self.pos..].find('}')?;
                let inner = &self.src[self.pos + 1..close];
                self.pos = close + 1;
                Some(self.parse_braces(inner))
            }
            _ => None,
        }
    }

    fn parse_braces(&self, inner: &str) -> (usize, usize) {
        let parse_count = |s: &str| s.trim().parse::<usize>().unwrap_or(0);
        let mut parts = inner.splitn(2, ',');
        let first = parts.next().unwrap_or_default();
        match parts.next() {
            Some(second) => {
                let min = parse_count(first);
                let max = if second.trim().is_empty() {
                    self.limits.open_range_cap
                } else {
                    parse_count(second)
                };
                (min, max.max(min))
            }
            None => {
                let n = parse_count(first);
                (n, n)
            }
        }
    }
}
