//! Candidate pipeline: one generator feeding a chain of filters.
//!
//! [`CandidateGenerator`] produces raw candidates for a [`GenerationMode`].
//! [`CandidatePipeline`] deduplicates them, applies any extra filters, bounds
//! the number of draws and orders the finished batch weakest first.

use crate::charset::Charset;
use crate::filter::{CandidateFilter, UniqueCandidateFilter};
use crate::generator::{
    GeneratorError, random_block_pattern, random_from_charset, random_from_segments,
    random_from_segments_with_seed, random_varied,
};
use crate::mutator::{Mutator, SeedMutator};
use crate::pattern::{Pattern, Segment};
use crate::scoring::{complexity_score, sort_by_complexity};
use crate::seeds::SeedSet;
use log::{debug, warn};
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;

/// Pattern group that selects the block generator.
pub const BLOCK_GROUP: &str = "([a-z][A-Z][0-9][_])";

/// Block count used when a block pattern carries no global length clause.
pub const DEFAULT_BLOCK_BOUNDS: (usize, usize) = (6, 6);

pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// How random candidates are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationMode {
    /// Uniform draws from the common charset.
    Common,
    /// Uniform draws from a randomly chosen charset style.
    Varied,
    /// Lower/upper/digit/special blocks; length bounds count blocks.
    Blocks,
    /// Walks the compiled pattern, weaving in a seed when seeds are present.
    Pattern,
    /// Mutates a randomly selected seed.
    Mutate,
}

/// Picks a mode for `source`, already compiled into `pattern`.
///
/// The block group selects [`GenerationMode::Blocks`]. A pattern with segments
/// and no global length clause selects [`GenerationMode::Pattern`]; a global
/// clause describes the total length rather than the structure, so those
/// patterns, like empty ones, use [`GenerationMode::Varied`].
pub fn detect_mode(pattern: &Pattern, source: &str) -> GenerationMode {
    if source.contains(BLOCK_GROUP) {
        GenerationMode::Blocks
    } else if !pattern.is_empty() && pattern.length_override().is_none() {
        GenerationMode::Pattern
    } else {
        GenerationMode::Varied
    }
}

/// Length bounds for `mode`, with explicit values taking precedence.
///
/// Block mode reads the block count from the quantifier on [`BLOCK_GROUP`],
/// then from the global clause, and otherwise uses [`DEFAULT_BLOCK_BOUNDS`].
/// Every other mode uses the pattern's length bounds.
pub fn resolve_length_bounds(
    mode: GenerationMode,
    pattern: &Pattern,
    min_len: Option<usize>,
    max_len: Option<usize>,
) -> (usize, usize) {
    let (base_min, base_max) = match mode {
        GenerationMode::Blocks => pattern
            .quantifier_after(BLOCK_GROUP)
            .or(pattern.length_override())
            .unwrap_or(DEFAULT_BLOCK_BOUNDS),
        _ => pattern.length_bounds(),
    };
    let min = min_len.unwrap_or(base_min);
    let max = max_len.unwrap_or(base_max).max(min);
    (min, max)
}

/// Produces one raw candidate per call for a fixed mode.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    mode: GenerationMode,
    min_len: usize,
    max_len: usize,
    segments: Vec<Segment>,
    seeds: SeedSet,
    common: Charset,
    mutator: SeedMutator,
}

impl CandidateGenerator {
    pub fn new(mode: GenerationMode, min_len: usize, max_len: usize) -> Self {
        let max_len = max_len.max(min_len);
        Self {
            mode,
            min_len,
            max_len,
            segments: Vec::new(),
            seeds: SeedSet::new(),
            common: Charset::common(),
            mutator: SeedMutator::new(min_len, max_len),
        }
    }

    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.segments = pattern.into_segments();
        self
    }

    pub fn with_seeds(mut self, seeds: SeedSet) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub fn bounds(&self) -> (usize, usize) {
        (self.min_len, self.max_len)
    }

    pub fn seeds(&self) -> &SeedSet {
        &self.seeds
    }

    pub fn next_candidate<R: Rng>(&mut self, rng: &mut R) -> String {
        match self.mode {
            GenerationMode::Common => {
                random_from_charset(&self.common, self.min_len, self.max_len, rng)
            }
            GenerationMode::Varied => random_varied(self.min_len, self.max_len, rng),
            GenerationMode::Blocks => random_block_pattern(self.min_len, self.max_len, rng),
            GenerationMode::Pattern if self.segments.is_empty() => {
                random_varied(self.min_len, self.max_len, rng)
            }
            GenerationMode::Pattern if self.seeds.is_empty() => {
                random_from_segments(&self.segments, rng)
            }
            GenerationMode::Pattern => {
                random_from_segments_with_seed(&self.segments, self.seeds.as_slice(), rng)
            }
            GenerationMode::Mutate => {
                let seed = self
                    .seeds
                    .random_select(&mut *rng)
                    .map_or("", |(_, word)| word);
                self.mutator.mutate(seed, rng)
            }
        }
    }
}

/// A candidate as written to structured output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateRecord {
    pub candidate: String,
    pub complexity: usize,
}

impl From<String> for CandidateRecord {
    fn from(candidate: String) -> Self {
        let complexity = complexity_score(&candidate);
        Self {
            candidate,
            complexity,
        }
    }
}

/// Draws candidates from a [`CandidateGenerator`] until a batch is full.
///
/// Deduplication runs first and always; the extra filters run in the order
/// they were added. The emitted set persists across [`CandidatePipeline::generate`]
/// calls, so a pipeline never emits the same string twice.
pub struct CandidatePipeline {
    generator: CandidateGenerator,
    unique: UniqueCandidateFilter,
    filters: Vec<Box<dyn CandidateFilter>>,
    max_attempts: usize,
    sort: bool,
}

impl CandidatePipeline {
    pub fn new(generator: CandidateGenerator) -> Self {
        Self {
            generator,
            unique: UniqueCandidateFilter::new(),
            filters: Vec::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            sort: true,
        }
    }

    pub fn with_filter(mut self, filter: Box<dyn CandidateFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Total draws allowed per [`CandidatePipeline::generate`] call. At least one.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_sorting(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    /// Treats every string in `known` as already emitted.
    pub fn with_known(mut self, known: HashSet<String>) -> Self {
        self.unique = UniqueCandidateFilter::with_known(known);
        self
    }

    pub fn generator(&self) -> &CandidateGenerator {
        &self.generator
    }

    pub fn emitted(&self) -> &UniqueCandidateFilter {
        &self.unique
    }

    pub fn into_known(self) -> HashSet<String> {
        self.unique.into_known()
    }

    /// Produces up to `count` new candidates.
    ///
    /// Fails with [`GeneratorError::RetryBudgetExhausted`] only if the attempt
    /// budget ran out before a single candidate was accepted; a short batch is
    /// returned with a warning.
    pub fn generate<R: Rng>(
        &mut self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<String>, GeneratorError> {
        let mut batch = Vec::with_capacity(count);
        let mut attempts = 0;
        while batch.len() < count && attempts < self.max_attempts {
            attempts += 1;
            let candidate = self.generator.next_candidate(rng);
            if !self.unique.is_interesting(&candidate) {
                continue;
            }
            if !self.passes_filters(&candidate) {
                continue;
            }
            self.unique.report_interesting(&candidate);
            for filter in &mut self.filters {
                filter.report_interesting(&candidate);
            }
            batch.push(candidate);
        }

        if count > 0 && batch.is_empty() {
            return Err(GeneratorError::RetryBudgetExhausted { attempts });
        }
        if batch.len() < count {
            warn!(
                "Produced {} of {} candidates before the budget of {} attempts ran out",
                batch.len(),
                count,
                self.max_attempts
            );
        }
        debug!(
            "{:?} batch: {} candidates from {} attempts",
            self.generator.mode(),
            batch.len(),
            attempts
        );
        if self.sort {
            sort_by_complexity(&mut batch);
        }
        Ok(batch)
    }

    fn passes_filters(&mut self, candidate: &str) -> bool {
        for filter in &mut self.filters {
            if !filter.is_interesting(candidate) {
                debug!("{} rejected {:?}", filter.name(), candidate);
                return false;
            }
        }
        true
    }
}
