use log::debug;
use rand_core::RngCore;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading seed words.
#[derive(Error, Debug)]
pub enum SeedError {
    /// A seed file or directory could not be read.
    /// Contains a string describing the underlying I/O error.
    #[error("Seed I/O error: {0}")]
    Io(String),

    /// A seed path exists but is neither a regular file nor a directory.
    #[error("Seed path {0:?} is not a file or directory")]
    UnsupportedPath(PathBuf),
}

impl From<std::io::Error> for SeedError {
    fn from(err: std::io::Error) -> Self {
        SeedError::Io(err.to_string())
    }
}

/// Ordered collection of seed words used by seeded generation and mutation.
///
/// Words are kept in insertion order and addressed by the index returned from
/// [`SeedSet::add`]. Duplicates are allowed; a word listed twice is simply
/// twice as likely to be selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSet {
    words: Vec<String>,
}

impl SeedSet {
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Appends `word` and returns its id. Surrounding whitespace is trimmed.
    pub fn add(&mut self, word: impl AsRef<str>) -> usize {
        let id = self.words.len();
        self.words.push(word.as_ref().trim().to_string());
        id
    }

    pub fn get(&self, id: usize) -> Option<&str> {
        self.words.get(id).map(String::as_str)
    }

    /// Picks one seed uniformly, or `None` when the set is empty.
    pub fn random_select(&self, rng: &mut dyn RngCore) -> Option<(usize, &str)> {
        if self.words.is_empty() {
            return None;
        }
        let index = rng.next_u64() as usize % self.words.len();
        self.get(index).map(|word| (index, word))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.words
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Loads seed words from files and directories of word lists.
    ///
    /// A file is read as one word per line, trimmed, with blank lines skipped.
    /// A directory contributes every regular, non-hidden file directly inside
    /// it (no recursion), in file-name order. Returns how many words were added.
    pub fn load_from_paths(&mut self, seed_paths: &[PathBuf]) -> Result<usize, SeedError> {
        let mut loaded_count = 0;
        for path_buf in seed_paths {
            let path_ref = path_buf.as_path();
            if path_ref.is_file() {
                loaded_count += self.load_file(path_ref)?;
            } else if path_ref.is_dir() {
                let mut files = Vec::new();
                for entry_result in fs::read_dir(path_ref).map_err(|e| {
                    SeedError::Io(format!(
                        "Failed to read seed directory {:?}: {}",
                        path_ref, e
                    ))
                })? {
                    let entry = entry_result.map_err(|e| {
                        SeedError::Io(format!("Error reading entry in {:?}: {}", path_ref, e))
                    })?;
                    let file_path_in_dir = entry.path();
                    let hidden = file_path_in_dir
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.starts_with('.'));
                    if file_path_in_dir.is_file() && !hidden {
                        files.push(file_path_in_dir);
                    }
                }
                files.sort();
                for file in &files {
                    loaded_count += self.load_file(file)?;
                }
            } else if path_ref.exists() {
                return Err(SeedError::UnsupportedPath(path_buf.clone()));
            } else {
                return Err(SeedError::Io(format!(
                    "Seed path {:?} does not exist",
                    path_ref
                )));
            }
        }
        debug!("Loaded {} seed words from {} paths", loaded_count, seed_paths.len());
        Ok(loaded_count)
    }

    fn load_file(&mut self, path: &Path) -> Result<usize, SeedError> {
        let words = read_seed_list(path)?;
        let count = words.len();
        self.words.extend(words);
        Ok(count)
    }
}

impl From<Vec<String>> for SeedSet {
    fn from(words: Vec<String>) -> Self {
        words.into_iter().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SeedSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = SeedSet::new();
        for word in iter {
            if !word.as_ref().trim().is_empty() {
                set.add(word);
            }
        }
        set
    }
}

/// Reads a newline-separated word list: lines are trimmed and blank lines dropped.
pub fn read_seed_list(path: &Path) -> Result<Vec<String>, SeedError> {
    let content = fs::read_to_string(path)
        .map_err(|e| SeedError::Io(format!("Failed to read seed file {:?}: {}", path, e)))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
