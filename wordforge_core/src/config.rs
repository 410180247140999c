use crate::pattern::{CompileLimits, Pattern};
use crate::pipeline::{DEFAULT_MAX_ATTEMPTS, GenerationMode, detect_mode};
use crate::seeds::{SeedError, SeedSet};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ModeSetting {
    /// Chosen from the pattern with [`detect_mode`].
    #[default]
    Auto,
    Common,
    Varied,
    Blocks,
    Pattern,
    Mutate,
    /// Exhaustive walk over the pattern's flat charset with growing length.
    Sequential,
    /// Exhaustive walk over the cross product of the compiled segments.
    Segmented,
}

impl ModeSetting {
    /// Replaces `Auto` with the mode detected for `source`.
    pub fn resolve(self, pattern: &Pattern, source: &str) -> ModeSetting {
        match self {
            ModeSetting::Auto => detect_mode(pattern, source).into(),
            other => other,
        }
    }

    /// The random generation mode, or `None` for exhaustive and unresolved settings.
    pub fn generation_mode(self) -> Option<GenerationMode> {
        match self {
            ModeSetting::Common => Some(GenerationMode::Common),
            ModeSetting::Varied => Some(GenerationMode::Varied),
            ModeSetting::Blocks => Some(GenerationMode::Blocks),
            ModeSetting::Pattern => Some(GenerationMode::Pattern),
            ModeSetting::Mutate => Some(GenerationMode::Mutate),
            ModeSetting::Auto | ModeSetting::Sequential | ModeSetting::Segmented => None,
        }
    }

    pub fn is_exhaustive(self) -> bool {
        matches!(self, ModeSetting::Sequential | ModeSetting::Segmented)
    }
}

impl From<GenerationMode> for ModeSetting {
    fn from(mode: GenerationMode) -> Self {
        match mode {
            GenerationMode::Common => ModeSetting::Common,
            GenerationMode::Varied => ModeSetting::Varied,
            GenerationMode::Blocks => ModeSetting::Blocks,
            GenerationMode::Pattern => ModeSetting::Pattern,
            GenerationMode::Mutate => ModeSetting::Mutate,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct GeneratorSettings {
    #[serde(default)]
    pub mode: ModeSetting,
    pub pattern: Option<String>,
    #[serde(default = "default_count")]
    pub count: usize,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    pub similarity_threshold: Option<f64>,
}

pub fn default_count() -> usize {
    10
}

pub fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

impl GeneratorSettings {
    pub fn pattern_source(&self) -> &str {
        self.pattern.as_deref().unwrap_or_default()
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            mode: ModeSetting::default(),
            pattern: None,
            count: default_count(),
            min_len: None,
            max_len: None,
            max_attempts: default_max_attempts(),
            similarity_threshold: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct SeedSettings {
    #[serde(default)]
    pub words: Vec<String>,
    #[serde(default)]
    pub paths: Vec<PathBuf>,
}

impl SeedSettings {
    /// Inline words first, then the contents of every seed path.
    pub fn load(&self) -> Result<SeedSet, SeedError> {
        let mut seeds: SeedSet = self.words.iter().collect();
        seeds.load_from_paths(&self.paths)?;
        Ok(seeds)
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Plain,
    /// One JSON object per line.
    Json,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct OutputSettings {
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_sort")]
    pub sort: bool,
}

fn default_sort() -> bool {
    true
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            path: None,
            format: OutputFormat::default(),
            sort: default_sort(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct WordforgeConfig {
    #[serde(default)]
    pub generator: GeneratorSettings,
    #[serde(default)]
    pub seeds: SeedSettings,
    #[serde(default)]
    pub limits: CompileLimits,
    #[serde(default)]
    pub output: OutputSettings,
}

impl WordforgeConfig {
    pub fn load_from_file(path: &PathBuf) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file at {:?}: {}", path, e))?;

        let config: WordforgeConfig = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse TOML from config file {:?}: {}", path, e)
        })?;

        Ok(config)
    }

    /// The configured pattern compiled with the configured limits.
    pub fn compile_pattern(&self) -> Pattern {
        Pattern::compile_with(self.generator.pattern_source(), &self.limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_documented_values() {
        let config = WordforgeConfig::default();
        assert_eq!(config.generator.mode, ModeSetting::Auto);
        assert_eq!(config.generator.count, 10);
        assert_eq!(config.generator.max_attempts, 10_000);
        assert!(config.generator.pattern.is_none());
        assert_eq!(config.limits, CompileLimits::default());
        assert_eq!(config.output.format, OutputFormat::Plain);
        assert!(config.output.sort);
        assert!(config.seeds.words.is_empty());
    }

    #[test]
    fn load_full_config_from_file() -> Result<(), anyhow::Error> {
        let dir = tempdir()?;
        let path = dir.path().join("wordforge.toml");
        fs::write(
            &path,
            r#"
[generator]
mode = "pattern"
pattern = "[a-z]+[0-9]{2}"
count = 25
min-len = 6
max-attempts = 500
similarity-threshold = 0.4

[seeds]
words = ["dragon", "falcon"]

[limits]
repeat-cap = 4

[output]
format = "json"
sort = false
"#,
        )?;

        let config = WordforgeConfig::load_from_file(&path)?;
        assert_eq!(config.generator.mode, ModeSetting::Pattern);
        assert_eq!(config.generator.count, 25);
        assert_eq!(config.generator.min_len, Some(6));
        assert_eq!(config.generator.max_len, None);
        assert_eq!(config.generator.max_attempts, 500);
        assert_eq!(config.generator.similarity_threshold, Some(0.4));
        assert_eq!(config.seeds.words, vec!["dragon", "falcon"]);
        assert_eq!(config.limits.repeat_cap, 4);
        assert_eq!(config.limits.open_range_cap, 12);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(!config.output.sort);

        assert_eq!(config.compile_pattern().length_bounds(), (3, 6));
        Ok(())
    }

    #[test]
    fn empty_file_yields_defaults() -> Result<(), anyhow::Error> {
        let dir = tempdir()?;
        let path = dir.path().join("empty.toml");
        fs::write(&path, "")?;
        let config = WordforgeConfig::load_from_file(&path)?;
        assert_eq!(config.generator.count, default_count());
        assert_eq!(config.generator.pattern_source(), "");
        Ok(())
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[generator]\ncolour = \"blue\"\n").unwrap();
        let err = WordforgeConfig::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = WordforgeConfig::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn seed_settings_combine_words_and_files() -> Result<(), anyhow::Error> {
        let dir = tempdir()?;
        let list = dir.path().join("seeds.txt");
        fs::write(&list, "monkey\n\nshadow\n")?;
        let settings = SeedSettings {
            words: vec!["dragon".to_string()],
            paths: vec![list],
        };
        let seeds = settings.load()?;
        assert_eq!(seeds.iter().collect::<Vec<_>>(), vec!["dragon", "monkey", "shadow"]);
        Ok(())
    }

    #[test]
    fn auto_mode_resolves_from_pattern() {
        let source = "([a-z][A-Z][0-9][_]){2,3}";
        let pattern = Pattern::compile(source);
        assert_eq!(ModeSetting::Auto.resolve(&pattern, source), ModeSetting::Blocks);
        assert_eq!(ModeSetting::Segmented.resolve(&pattern, source), ModeSetting::Segmented);
        assert_eq!(ModeSetting::Blocks.generation_mode(), Some(GenerationMode::Blocks));
        assert!(ModeSetting::Sequential.generation_mode().is_none());
        assert!(ModeSetting::Sequential.is_exhaustive());
        assert!(!ModeSetting::Mutate.is_exhaustive());
    }
}
