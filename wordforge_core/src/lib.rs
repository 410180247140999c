pub mod charset;
pub mod config;
pub mod enumerator;
pub mod filter;
pub mod generator;
pub mod mutator;
pub mod pattern;
pub mod pipeline;
pub mod rng;
pub mod scoring;
pub mod seeds;

pub use charset::{Charset, CharsetStyle, charset_from_pattern, expand_class};
pub use config::{ModeSetting, OutputFormat, WordforgeConfig};
pub use enumerator::{PositionalEnumerator, SegmentedEnumerator, SequentialEnumerator};
pub use filter::{CandidateFilter, SimilarityFilter, UniqueCandidateFilter};
pub use generator::{
    GeneratorError, random_block_pattern, random_from_charset, random_from_segments,
    random_from_segments_with_seed, random_varied, randomize_case,
};
pub use mutator::{Mutation, Mutator, SeedMutator, mutate};
pub use pattern::{CompileLimits, Pattern, Segment, compile, parse_length_bounds};
pub use pipeline::{
    CandidateGenerator, CandidatePipeline, CandidateRecord, GenerationMode, detect_mode,
    resolve_length_bounds,
};
pub use rng::{SecureRng, secure_rng};
pub use scoring::{complexity_score, sort_by_complexity, trigram_similarity};
pub use seeds::{SeedError, SeedSet};
