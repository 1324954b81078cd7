//! Edit-distance matching between local and reference identifiers.

/// Candidates must score strictly above this to count as a match.
pub const MATCH_THRESHOLD: f64 = 0.6;

/// Levenshtein distance over Unicode scalar values.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Two rolling rows of the edit matrix.
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0usize; b_chars.len() + 1];

    for (i, a_ch) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, b_ch) in b_chars.iter().enumerate() {
            let cost = usize::from(a_ch != b_ch);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Normalized similarity in `[0, 1]`: `1 - distance / longer length`.
#[allow(clippy::cast_precision_loss)]
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// Best candidate for `local_id`, with its similarity.
///
/// An exact key match wins outright. Otherwise the highest similarity above
/// [`MATCH_THRESHOLD`] wins, and ties go to the earliest candidate.
pub fn find_best_match<'a, T, F>(local_id: &str, candidates: &'a [T], key: F) -> Option<(&'a T, f64)>
where
    F: Fn(&T) -> &str,
{
    if let Some(exact) = candidates.iter().find(|c| key(c) == local_id) {
        return Some((exact, 1.0));
    }

    let mut best: Option<(&T, f64)> = None;
    for candidate in candidates {
        let score = similarity(local_id, key(candidate));
        if score <= MATCH_THRESHOLD {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }
    best
}
