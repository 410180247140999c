use crate::scoring::trigram_similarity;
use std::collections::HashSet;

/// Decides whether a freshly generated candidate should be emitted.
///
/// The pipeline asks every filter in turn through `is_interesting`; only when
/// all of them accept is `report_interesting` called, so stateful filters
/// record exactly the candidates that were emitted.
pub trait CandidateFilter: Send {
    fn name(&self) -> &'static str;
    fn is_interesting(&mut self, candidate: &str) -> bool;
    fn report_interesting(&mut self, candidate: &str);
}

/// Rejects any candidate already emitted, by exact string equality.
#[derive(Debug, Default, Clone)]
pub struct UniqueCandidateFilter {
    known: HashSet<String>,
}

impl UniqueCandidateFilter {
    pub fn new() -> Self {
        Self {
            known: HashSet::new(),
        }
    }

    /// Starts from an existing set of emitted candidates.
    pub fn with_known(known: HashSet<String>) -> Self {
        Self { known }
    }

    /// Marks `candidate` as emitted. Returns `false` if it already was.
    pub fn add_known(&mut self, candidate: &str) -> bool {
        self.known.insert(candidate.to_string())
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.known.contains(candidate)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    pub fn into_known(self) -> HashSet<String> {
        self.known
    }
}

impl CandidateFilter for UniqueCandidateFilter {
    fn name(&self) -> &'static str {
        "UniqueCandidateFilter"
    }

    fn is_interesting(&mut self, candidate: &str) -> bool {
        !self.known.contains(candidate)
    }

    fn report_interesting(&mut self, candidate: &str) {
        self.add_known(candidate);
    }
}

/// Keeps candidates whose trigram similarity to at least one seed reaches `threshold`.
///
/// With no seeds there is nothing to compare against and every candidate passes.
#[derive(Debug, Clone)]
pub struct SimilarityFilter {
    seeds: Vec<String>,
    threshold: f64,
}

impl SimilarityFilter {
    pub fn new(seeds: Vec<String>, threshold: f64) -> Self {
        Self { seeds, threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Highest similarity of `candidate` to any seed, or `None` without seeds.
    pub fn best_similarity(&self, candidate: &str) -> Option<f64> {
        self.seeds
            .iter()
            .map(|seed| trigram_similarity(candidate, seed))
            .reduce(f64::max)
    }
}

impl CandidateFilter for SimilarityFilter {
    fn name(&self) -> &'static str {
        "SimilarityFilter"
    }

    fn is_interesting(&mut self, candidate: &str) -> bool {
        self.best_similarity(candidate)
            .is_none_or(|best| best >= self.threshold)
    }

    fn report_interesting(&mut self, _candidate: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_candidate_filter_works() {
        let mut filter = UniqueCandidateFilter::new();
        assert!(filter.is_empty());

        assert!(filter.is_interesting("hunter2"));
        filter.report_interesting("hunter2");
        assert_eq!(filter.len(), 1);
        assert!(!filter.is_interesting("hunter2"));

        assert!(filter.is_interesting("Hunter2"), "dedup must be case-sensitive");
        filter.report_interesting("Hunter2");
        assert_eq!(filter.len(), 2);

        filter.report_interesting("hunter2");
        assert_eq!(filter.len(), 2);
        assert!(!filter.add_known("Hunter2"));
        assert!(filter.contains("Hunter2"));
    }

    #[test]
    fn unique_candidate_filter_resumes_from_known_set() {
        let known: HashSet<String> = ["a".to_string(), "b".to_string()].into();
        let mut filter = UniqueCandidateFilter::with_known(known);
        assert!(!filter.is_interesting("a"));
        assert!(filter.is_interesting("c"));
        filter.report_interesting("c");
        assert_eq!(filter.into_known().len(), 3);
    }

    #[test]
    fn similarity_filter_keeps_close_candidates() {
        let mut filter = SimilarityFilter::new(vec!["baseball".to_string()], 0.3);
        assert!(filter.is_interesting("Baseball12"));
        assert!(filter.is_interesting("baseball"));
        assert!(!filter.is_interesting("qwerty"));
        assert_eq!(filter.threshold(), 0.3);
    }

    #[test]
    fn similarity_filter_matches_any_seed() {
        let mut filter =
            SimilarityFilter::new(vec!["dragon".to_string(), "monkey".to_string()], 0.5);
        assert!(filter.is_interesting("monkey1"));
        assert!(filter.is_interesting("Dragon"));
        assert!(!filter.is_interesting("zzzzzz"));
    }

    #[test]
    fn similarity_filter_without_seeds_keeps_everything() {
        let mut filter = SimilarityFilter::new(Vec::new(), 0.99);
        assert!(filter.best_similarity("anything").is_none());
        assert!(filter.is_interesting("anything"));
    }
}
