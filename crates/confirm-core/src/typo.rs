//! Fuzzy name matching for typo suggestions.
//!
//! Similarity is the classic sequence-matching ratio `2 * M / T`, where `M`
//! is the number of characters covered by recursively found longest common
//! blocks and `T` is the combined length of both strings.

/// Minimum similarity for a name to be suggested as a typo.
pub const DEFAULT_TYPO_RATIO: f64 = 0.7;

/// Similarity of two strings, from 0.0 (nothing in common) to 1.0 (equal).
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matched_chars(&a, &b, 0, a.len(), 0, b.len());
    2.0 * matched as f64 / total as f64
}

/// Find the candidate most similar to `target`, if any reaches `ratio`.
///
/// Ties go to the candidate that sorts last, so the result does not depend
/// on iteration order.
pub fn closest_match<'a, I>(target: &str, candidates: I, ratio: f64) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(f64, &str)> = None;
    for candidate in candidates {
        let score = similarity(candidate, target);
        if score < ratio {
            continue;
        }
        best = match best {
            Some((best_score, best_name))
                if best_score > score || (best_score == score && best_name >= candidate) =>
            {
                Some((best_score, best_name))
            }
            _ => Some((score, candidate)),
        };
    }
    best.map(|(_, name)| name.to_string())
}

/// Count characters covered by matching blocks in `a[alo..ahi]` and `b[blo..bhi]`.
fn matched_chars(a: &[char], b: &[char], alo: usize, ahi: usize, blo: usize, bhi: usize) -> usize {
    let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
    if size == 0 {
        return 0;
    }
    let mut total = size;
    if alo < i && blo < j {
        total += matched_chars(a, b, alo, i, blo, j);
    }
    if i + size < ahi && j + size < bhi {
        total += matched_chars(a, b, i + size, ahi, j + size, bhi);
    }
    total
}

/// Longest common block, earliest in `a` then earliest in `b` on ties.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // prev[k] = length of the match ending at a[i - 1], b[blo + k - 1]
    let mut prev = vec![0usize; bhi - blo + 1];
    for i in alo..ahi {
        let mut run = vec![0usize; bhi - blo + 1];
        for j in blo..bhi {
            if a[i] != b[j] {
                continue;
            }
            let k = prev[j - blo] + 1;
            run[j - blo + 1] = k;
            if k > best_size {
                best_i = i + 1 - k;
                best_j = j + 1 - k;
                best_size = k;
            }
        }
        prev = run;
    }
    (best_i, best_j, best_size)
}
