use wordforge_core::charset::charset_from_pattern;
use wordforge_core::config::{ModeSetting, OutputFormat, WordforgeConfig};
use wordforge_core::enumerator::{SegmentedEnumerator, SequentialEnumerator};
use wordforge_core::filter::{CandidateFilter, SimilarityFilter, UniqueCandidateFilter};
use wordforge_core::pattern::Pattern;
use wordforge_core::pipeline::{
    CandidateGenerator, CandidatePipeline, CandidateRecord, GenerationMode,
    resolve_length_bounds,
};
use wordforge_core::rng::secure_rng;
use wordforge_core::seeds::SeedSet;

use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

const DEFAULT_CONFIG_FILE: &str = "wordforge.toml";
const PROGRESS_INTERVAL: usize = 100_000;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(short, long, value_parser)]
    config_file: Option<PathBuf>,
    /// Candidate pattern, e.g. "[a-z]{4,8}[0-9]{2}" or "(admin|root)[0-9]+".
    #[clap(short, long)]
    pattern: Option<String>,
    /// Number of candidates; for segmented mode the enumeration ceiling (0 = all).
    #[clap(short = 'n', long)]
    count: Option<usize>,
    #[clap(short, long)]
    mode: Option<CliMode>,
    #[clap(long)]
    min_len: Option<usize>,
    #[clap(long)]
    max_len: Option<usize>,
    /// Seed word; may be repeated.
    #[clap(short, long = "seed")]
    seeds: Vec<String>,
    /// Seed list file or directory; may be repeated.
    #[clap(long = "seed-file", value_parser)]
    seed_files: Vec<PathBuf>,
    /// Minimum trigram similarity to at least one seed.
    #[clap(long)]
    similarity: Option<f64>,
    #[clap(short, long, value_parser)]
    output: Option<PathBuf>,
    /// Write one JSON object per line instead of plain lines.
    #[clap(long)]
    json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum CliMode {
    Auto,
    Common,
    Varied,
    Blocks,
    Pattern,
    Mutate,
    Sequential,
    Segmented,
}

impl From<CliMode> for ModeSetting {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Auto => ModeSetting::Auto,
            CliMode::Common => ModeSetting::Common,
            CliMode::Varied => ModeSetting::Varied,
            CliMode::Blocks => ModeSetting::Blocks,
            CliMode::Pattern => ModeSetting::Pattern,
            CliMode::Mutate => ModeSetting::Mutate,
            CliMode::Sequential => ModeSetting::Sequential,
            CliMode::Segmented => ModeSetting::Segmented,
        }
    }
}

fn load_config(config_file: Option<&PathBuf>) -> Result<WordforgeConfig, anyhow::Error> {
    match config_file {
        Some(config_path) => {
            info!("Loading configuration from specified path: {config_path:?}");
            WordforgeConfig::load_from_file(config_path)
        }
        None => {
            let default_config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_config_path.exists() {
                info!("No config file specified, loading default: {default_config_path:?}");
                WordforgeConfig::load_from_file(&default_config_path)
            } else {
                debug!(
                    "No config file specified and default '{DEFAULT_CONFIG_FILE}' not found, using built-in defaults."
                );
                Ok(WordforgeConfig::default())
            }
        }
    }
}

fn apply_overrides(config: &mut WordforgeConfig, cli: Cli) {
    if let Some(pattern) = cli.pattern {
        config.generator.pattern = Some(pattern);
    }
    if let Some(count) = cli.count {
        config.generator.count = count;
    }
    if let Some(mode) = cli.mode {
        config.generator.mode = mode.into();
    }
    if cli.min_len.is_some() {
        config.generator.min_len = cli.min_len;
    }
    if cli.max_len.is_some() {
        config.generator.max_len = cli.max_len;
    }
    if cli.similarity.is_some() {
        config.generator.similarity_threshold = cli.similarity;
    }
    config.seeds.words.extend(cli.seeds);
    config.seeds.paths.extend(cli.seed_files);
    if cli.output.is_some() {
        config.output.path = cli.output;
    }
    if cli.json {
        config.output.format = OutputFormat::Json;
    }
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>, anyhow::Error> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| anyhow::anyhow!("Failed to create output file {:?}: {}", path, e))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn write_candidate(
    out: &mut dyn Write,
    candidate: String,
    format: OutputFormat,
) -> Result<(), anyhow::Error> {
    match format {
        OutputFormat::Plain => writeln!(out, "{candidate}")?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, &CandidateRecord::from(candidate))?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Streams an exhaustive enumeration, skipping repeats.
fn write_stream(
    candidates: impl Iterator<Item = String>,
    out: &mut dyn Write,
    format: OutputFormat,
) -> Result<usize, anyhow::Error> {
    let mut unique = UniqueCandidateFilter::new();
    let mut written = 0;
    for candidate in candidates {
        if !unique.is_interesting(&candidate) {
            continue;
        }
        unique.report_interesting(&candidate);
        write_candidate(out, candidate, format)?;
        written += 1;
        if written % PROGRESS_INTERVAL == 0 {
            info!("{written} candidates written...");
        }
    }
    Ok(written)
}

fn run_random(
    config: &WordforgeConfig,
    mode: GenerationMode,
    pattern: Pattern,
    seeds: SeedSet,
    out: &mut dyn Write,
) -> Result<usize, anyhow::Error> {
    let (min_len, max_len) = resolve_length_bounds(
        mode,
        &pattern,
        config.generator.min_len,
        config.generator.max_len,
    );
    if mode == GenerationMode::Mutate && seeds.is_empty() {
        warn!("Mutate mode without seeds, falling back to random common-charset candidates");
    }
    info!(
        "Generating {} candidates in {mode:?} mode (bounds {min_len}-{max_len}, {} seeds)",
        config.generator.count,
        seeds.len()
    );

    let similarity_seeds = seeds.as_slice().to_vec();
    let generator = CandidateGenerator::new(mode, min_len, max_len)
        .with_pattern(pattern)
        .with_seeds(seeds);
    let mut pipeline = CandidatePipeline::new(generator)
        .with_max_attempts(config.generator.max_attempts)
        .with_sorting(config.output.sort);
    if let Some(threshold) = config.generator.similarity_threshold {
        if similarity_seeds.is_empty() {
            warn!("Similarity threshold {threshold} set without seeds, no candidate is filtered");
        }
        pipeline = pipeline.with_filter(Box::new(SimilarityFilter::new(similarity_seeds, threshold)));
    }

    let mut rng = secure_rng()?;
    let batch = pipeline.generate(config.generator.count, &mut rng)?;
    let written = batch.len();
    for candidate in batch {
        write_candidate(out, candidate, config.output.format)?;
    }
    Ok(written)
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = load_config(cli.config_file.as_ref())?;
    apply_overrides(&mut config, cli);
    debug!("Effective configuration: {config:#?}");

    let source = config.generator.pattern_source().to_string();
    let pattern = config.compile_pattern();
    let mode = config.generator.mode.resolve(&pattern, &source);
    debug!(
        "Pattern {source:?} compiled to {} segments, mode {mode:?}",
        pattern.segments().len()
    );

    let seeds = config.seeds.load()?;
    let mut out = open_output(config.output.path.as_ref())?;
    let format = config.output.format;
    let start_time = Instant::now();

    let written = match mode {
        ModeSetting::Sequential => {
            let charset = charset_from_pattern(&source);
            let (min_len, max_len) = resolve_length_bounds(
                GenerationMode::Common,
                &pattern,
                config.generator.min_len,
                config.generator.max_len,
            );
            info!(
                "Enumerating lengths {min_len}-{max_len} over {} characters",
                charset.len()
            );
            write_stream(
                SequentialEnumerator::new(&charset, min_len, max_len),
                out.as_mut(),
                format,
            )?
        }
        ModeSetting::Segmented => {
            let enumerator =
                SegmentedEnumerator::new(pattern.segments()).with_limit(config.generator.count);
            info!(
                "Enumerating {} combinations over {} segments",
                enumerator.total_combinations(),
                pattern.segments().len()
            );
            write_stream(enumerator, out.as_mut(), format)?
        }
        other => {
            let generation_mode = other
                .generation_mode()
                .ok_or_else(|| anyhow::anyhow!("Mode {other:?} is not a generation mode"))?;
            run_random(&config, generation_mode, pattern, seeds, out.as_mut())?
        }
    };
    out.flush()?;

    info!(
        "Wrote {written} candidates in {:.2?}.",
        start_time.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config_values() {
        let cli = Cli::parse_from([
            "wordforge",
            "-p",
            "[a-z]{4}",
            "-n",
            "3",
            "-m",
            "mutate",
            "--min-len",
            "6",
            "-s",
            "dragon",
            "-s",
            "falcon",
            "--similarity",
            "0.5",
            "--json",
        ]);
        let mut config = WordforgeConfig::default();
        config.seeds.words.push("monkey".to_string());
        apply_overrides(&mut config, cli);

        assert_eq!(config.generator.pattern.as_deref(), Some("[a-z]{4}"));
        assert_eq!(config.generator.count, 3);
        assert_eq!(config.generator.mode, ModeSetting::Mutate);
        assert_eq!(config.generator.min_len, Some(6));
        assert_eq!(config.generator.max_len, None);
        assert_eq!(config.generator.similarity_threshold, Some(0.5));
        assert_eq!(config.seeds.words, vec!["monkey", "dragon", "falcon"]);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn absent_flags_keep_config_values() {
        let cli = Cli::parse_from(["wordforge"]);
        let mut config = WordforgeConfig::default();
        config.generator.count = 42;
        apply_overrides(&mut config, cli);
        assert_eq!(config.generator.count, 42);
        assert_eq!(config.generator.mode, ModeSetting::Auto);
        assert_eq!(config.output.format, OutputFormat::Plain);
    }

    #[test]
    fn stream_output_skips_repeats() {
        let mut out = Vec::new();
        let candidates = ["a", "b", "a", "c"].into_iter().map(str::to_string);
        let written = write_stream(candidates, &mut out, OutputFormat::Plain).unwrap();
        assert_eq!(written, 3);
        assert_eq!(String::from_utf8(out).unwrap(), "a\nb\nc\n");
    }

    #[test]
    fn json_output_is_one_record_per_line() {
        let mut out = Vec::new();
        write_candidate(&mut out, "Abc1".to_string(), OutputFormat::Json).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"candidate\":\"Abc1\",\"complexity\":16}\n"
        );
    }
}
