use std::collections::HashSet;

/// Trigram similarity of `a` and `b` in `[0, 1]`, after lower-casing both.
///
/// Each string is padded with two leading spaces and one trailing space before
/// its 3-character windows are collected; the score is the Jaccard index of the
/// two trigram sets. Identical strings score 1.0.
pub fn trigram_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a == b {
        return 1.0;
    }

    let left = trigrams(&a);
    let right = trigrams(&b);
    if left.is_empty() && right.is_empty() {
        return 1.0;
    }
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let common = left.intersection(&right).count();
    let union = left.len() + right.len() - common;
    common as f64 / union as f64
}

fn trigrams(s: &str) -> HashSet<[char; 3]> {
    let padded: Vec<char> = "  ".chars().chain(s.chars()).chain(" ".chars()).collect();
    padded
        .windows(3)
        .map(|w| [w[0], w[1], w[2]])
        .collect()
}

/// Heuristic structural strength of a candidate; higher is stronger.
///
/// Starts at the length, then adds 1 for a leading uppercase letter, 1 for a
/// trailing digit, 5 for mixed case, 5 for any digit and 10 for any symbol.
pub fn complexity_score(candidate: &str) -> usize {
    let mut score = candidate.chars().count();
    if candidate.starts_with(|c: char| c.is_ascii_uppercase()) {
        score += 1;
    }
    if candidate.ends_with(|c: char| c.is_ascii_digit()) {
        score += 1;
    }

    let has_upper = candidate.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = candidate.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = candidate.chars().any(|c| c.is_ascii_digit());
    let has_symbol = candidate.chars().any(|c| !c.is_ascii_alphanumeric());

    if has_upper && has_lower {
        score += 5;
    }
    if has_digit {
        score += 5;
    }
    if has_symbol {
        score += 10;
    }
    score
}

/// Orders candidates weakest first. Equal scores keep their relative order.
pub fn sort_by_complexity(candidates: &mut [String]) {
    candidates.sort_by_cached_key(|c| complexity_score(c));
}
