//! Weighted user scoring.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{CandidateUser, MatchedInterest, RecommendedUser};

/// Scores each candidate by the summed weight of its matched interests.
///
/// Interests without a weight are dropped from the output entirely. Users with a
/// score of zero or less are discarded. The result is sorted best first, keeps
/// store order on ties and holds at most `limit` users.
pub fn score_candidates(
    weights: &HashMap<String, f64>,
    candidates: Vec<CandidateUser>,
    limit: usize,
) -> Vec<RecommendedUser> {
    let mut scored: Vec<RecommendedUser> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let matched: Vec<MatchedInterest> = candidate
                .interests
                .into_iter()
                .filter(|i| weights.contains_key(&i.interest_id))
                .collect();
            let score: f64 = matched
                .iter()
                .filter_map(|i| weights.get(&i.interest_id))
                .sum();

            (score > 0.0).then_some(RecommendedUser {
                user_id: candidate.user_id,
                user_name: candidate.user_name,
                score,
                matched_interests: matched,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(limit);
    scored
}
