use std::collections::BTreeMap;

const MAX_SUGGESTIONS: usize = 3;
const CUTOFF: f64 = 0.6;

/// Up to three candidates closest to `word`, compared case-insensitively
/// and returned with their original spelling, best first.
pub fn close_matches_icase<'c>(word: &str, candidates: impl IntoIterator<Item = &'c str>) -> Vec<String> {
    let word = word.to_lowercase();
    let mut lowered = BTreeMap::new();
    for candidate in candidates {
        lowered.entry(candidate.to_lowercase()).or_insert(candidate);
    }

    let mut scored = lowered
        .into_iter()
        .map(|(lower, original)| (strsim::normalized_damerau_levenshtein(&word, &lower), original))
        .filter(|(score, _)| *score >= CUTOFF)
        .collect::<Vec<_>>();
    scored.sort_by(|(left_score, left), (right_score, right)| {
        right_score.total_cmp(left_score).then_with(|| left.cmp(right))
    });
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, original)| original.to_string())
        .collect()
}
