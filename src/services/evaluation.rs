//! Offline ranking quality metrics.
//!
//! Compares the ordered ids a match run returned against a hand-labelled set
//! of relevant ids. All metrics lie in `[0, 1]`.

use crate::core::MatchResult;
use crate::models::MatchDirection;
use std::collections::HashSet;
use std::hash::Hash;

/// Ids of the ranked counterparts, best first
pub fn ranked_ids(result: &MatchResult) -> Vec<&str> {
    result
        .matches
        .iter()
        .map(|m| match result.direction {
            MatchDirection::NeedToProviders => m.provider_id.as_str(),
            MatchDirection::ProviderToNeeds => m.need_id.as_str(),
        })
        .collect()
}

fn relevant_in_top<T: Eq + Hash>(predicted: &[T], relevant: &[T], k: usize) -> usize {
    let relevant: HashSet<&T> = relevant.iter().collect();
    let top: HashSet<&T> = predicted.iter().take(k).collect();
    top.intersection(&relevant).count()
}

/// Share of the first `k` slots holding a relevant id.
///
/// Divides by `k` even when fewer than `k` ids were returned.
pub fn precision_at_k<T: Eq + Hash>(predicted: &[T], relevant: &[T], k: usize) -> f64 {
    if k == 0 || predicted.is_empty() {
        return 0.0;
    }
    relevant_in_top(predicted, relevant, k) as f64 / k as f64
}

/// Share of the relevant ids found in the first `k` slots
pub fn recall_at_k<T: Eq + Hash>(predicted: &[T], relevant: &[T], k: usize) -> f64 {
    let expected: HashSet<&T> = relevant.iter().collect();
    if expected.is_empty() {
        return 0.0;
    }
    relevant_in_top(predicted, relevant, k) as f64 / expected.len() as f64
}

/// Mean of the precision at each relevant hit, over all relevant ids.
///
/// `k` truncates the prediction list; `None` keeps all of it.
pub fn average_precision<T: Eq + Hash>(predicted: &[T], relevant: &[T], k: Option<usize>) -> f64 {
    let expected: HashSet<&T> = relevant.iter().collect();
    if expected.is_empty() {
        return 0.0;
    }

    let limit = k.unwrap_or(predicted.len());
    let mut hits = 0usize;
    let mut sum = 0.0;
    for (index, id) in predicted.iter().take(limit).enumerate() {
        if expected.contains(id) {
            hits += 1;
            sum += hits as f64 / (index + 1) as f64;
        }
    }

    sum / expected.len() as f64
}

/// Average precision averaged over queries given as `(predicted, relevant)` pairs
pub fn mean_average_precision<T: Eq + Hash>(queries: &[(Vec<T>, Vec<T>)], k: Option<usize>) -> f64 {
    if queries.is_empty() {
        return 0.0;
    }
    let total: f64 = queries
        .iter()
        .map(|(predicted, relevant)| average_precision(predicted, relevant, k))
        .sum();
    total / queries.len() as f64
}

/// `1 / rank` of the first relevant id, 0 when none was returned
pub fn reciprocal_rank<T: Eq + Hash>(predicted: &[T], relevant: &[T]) -> f64 {
    let expected: HashSet<&T> = relevant.iter().collect();
    predicted
        .iter()
        .position(|id| expected.contains(id))
        .map_or(0.0, |index| 1.0 / (index + 1) as f64)
}

/// Binary-relevance nDCG over the first `k` slots
pub fn ndcg_at_k<T: Eq + Hash>(predicted: &[T], relevant: &[T], k: usize) -> f64 {
    let expected: HashSet<&T> = relevant.iter().collect();
    if expected.is_empty() {
        return 0.0;
    }

    let discount = |index: usize| 1.0 / ((index + 2) as f64).log2();

    let dcg: f64 = predicted
        .iter()
        .take(k)
        .enumerate()
        .filter(|(_, id)| expected.contains(id))
        .map(|(index, _)| discount(index))
        .sum();
    let ideal: f64 = (0..expected.len().min(k)).map(discount).sum();

    if ideal == 0.0 {
        return 0.0;
    }
    dcg / ideal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Confidence, ImpactLevel, MatchOutcome};
    use crate::models::MatchCandidate;

    const EPS: f64 = 1e-9;

    fn candidate(need_id: &str, provider_id: &str) -> MatchCandidate {
        MatchCandidate {
            need_id: need_id.to_string(),
            provider_id: provider_id.to_string(),
            company_name: String::new(),
            impact_level: ImpactLevel::Local,
            score_emb: 0.8,
            distance_km: None,
            score_geo: None,
            score_final: 0.8,
            confidence: Confidence::from_score(0.8),
        }
    }

    fn result(direction: MatchDirection, matches: Vec<MatchCandidate>) -> MatchResult {
        MatchResult {
            direction,
            query_id: "q".to_string(),
            total_candidates: matches.len(),
            matches,
            outcome: MatchOutcome::Matched,
            rejected: vec![],
            unclassified_pairs: 0,
            domain_filtered: 0,
        }
    }

    #[test]
    fn test_ranked_ids_follow_direction() {
        let matches = vec![candidate("n1", "p1"), candidate("n2", "p2")];

        let forward = result(MatchDirection::NeedToProviders, matches.clone());
        assert_eq!(ranked_ids(&forward), vec!["p1", "p2"]);

        let reverse = result(MatchDirection::ProviderToNeeds, matches);
        assert_eq!(ranked_ids(&reverse), vec!["n1", "n2"]);
    }

    #[test]
    fn test_precision_divides_by_k() {
        let predicted = ["a", "b"];
        let relevant = ["a", "c"];

        assert!((precision_at_k(&predicted, &relevant, 1) - 1.0).abs() < EPS);
        // Only two returned, still divided by 5
        assert!((precision_at_k(&predicted, &relevant, 5) - 0.2).abs() < EPS);
        assert_eq!(precision_at_k(&predicted, &relevant, 0), 0.0);
        assert_eq!(precision_at_k::<&str>(&[], &relevant, 3), 0.0);
    }

    #[test]
    fn test_recall_counts_found_relevant() {
        let predicted = ["a", "x", "c", "y"];
        let relevant = ["a", "b", "c", "d"];

        assert!((recall_at_k(&predicted, &relevant, 2) - 0.25).abs() < EPS);
        assert!((recall_at_k(&predicted, &relevant, 4) - 0.5).abs() < EPS);
        assert_eq!(recall_at_k(&predicted, &[], 4), 0.0);
    }

    #[test]
    fn test_average_precision() {
        let predicted = ["a", "x", "b"];
        let relevant = ["a", "b"];

        // (1/1 + 2/3) / 2
        let ap = average_precision(&predicted, &relevant, None);
        assert!((ap - 5.0 / 6.0).abs() < EPS);

        // Truncated to one slot: 1/1 over two relevant ids
        let truncated = average_precision(&predicted, &relevant, Some(1));
        assert!((truncated - 0.5).abs() < EPS);

        assert_eq!(average_precision(&["x", "y"], &relevant, None), 0.0);
    }

    #[test]
    fn test_mean_average_precision() {
        let queries = vec![
            (vec!["a", "b"], vec!["a"]),
            (vec!["x", "b"], vec!["b"]),
        ];
        // (1.0 + 0.5) / 2
        assert!((mean_average_precision(&queries, None) - 0.75).abs() < EPS);
        assert_eq!(mean_average_precision::<&str>(&[], None), 0.0);
    }

    #[test]
    fn test_reciprocal_rank() {
        assert_eq!(reciprocal_rank(&["a", "b"], &["a"]), 1.0);
        assert!((reciprocal_rank(&["x", "y", "b"], &["b", "c"]) - 1.0 / 3.0).abs() < EPS);
        assert_eq!(reciprocal_rank(&["x"], &["b"]), 0.0);
    }

    #[test]
    fn test_ndcg() {
        let relevant = ["a", "b"];

        assert!((ndcg_at_k(&["a", "b", "x"], &relevant, 3) - 1.0).abs() < EPS);

        // Hit at rank 2 only: (1/log2 3) / (1 + 1/log2 3)
        let expected = (1.0 / 3f64.log2()) / (1.0 + 1.0 / 3f64.log2());
        assert!((ndcg_at_k(&["x", "a"], &relevant, 2) - expected).abs() < EPS);

        assert_eq!(ndcg_at_k(&["a"], &relevant, 0), 0.0);
        assert_eq!(ndcg_at_k(&["a"], &[], 3), 0.0);
    }
}
