use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::core::error::ConfigurationError;
use crate::models::MatchCandidate;

pub const DEFAULT_MIN_SCORE: f64 = 0.30;
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Threshold and size of a shortlist
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingSettings {
    min_score: f64,
    max_results: usize,
}

impl RankingSettings {
    pub fn new(min_score: f64, max_results: usize) -> Result<Self, ConfigurationError> {
        if !(0.0..=1.0).contains(&min_score) {
            return Err(ConfigurationError::InvalidThreshold(min_score));
        }
        if max_results == 0 {
            return Err(ConfigurationError::ZeroMaxResults);
        }
        Ok(Self {
            min_score,
            max_results,
        })
    }

    pub fn min_score(&self) -> f64 {
        self.min_score
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Same threshold with a smaller cap; never grows past the configured size
    pub fn with_limit(self, limit: usize) -> Self {
        Self {
            max_results: limit.clamp(1, self.max_results),
            ..self
        }
    }
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// Why a shortlist looks the way it does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// At least one candidate cleared the threshold
    Matched,
    /// Nothing to score against
    NoCandidates,
    /// Candidates were scored but none cleared the threshold
    BelowThreshold,
    /// Candidates existed but every one was excluded for invalid collaborator input
    AllRejected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub matches: Vec<MatchCandidate>,
    pub outcome: MatchOutcome,
}

/// Order by score descending, then by provider id and need id ascending.
///
/// In either query direction one of the two ids is fixed, so ties resolve on
/// the counterpart's identifier.
fn compare_candidates(a: &MatchCandidate, b: &MatchCandidate) -> Ordering {
    b.score_final
        .partial_cmp(&a.score_final)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.provider_id.cmp(&b.provider_id))
        .then_with(|| a.need_id.cmp(&b.need_id))
}

/// Filter, sort and truncate scored candidates into a shortlist.
///
/// Candidates below `min_score` are dropped outright. Sorting is stable, so
/// fully identical keys keep their input order.
pub fn rank(candidates: Vec<MatchCandidate>, settings: &RankingSettings) -> Ranking {
    if candidates.is_empty() {
        return Ranking {
            matches: Vec::new(),
            outcome: MatchOutcome::NoCandidates,
        };
    }

    let mut survivors: Vec<MatchCandidate> = candidates
        .into_iter()
        .filter(|candidate| candidate.score_final >= settings.min_score)
        .collect();

    if survivors.is_empty() {
        return Ranking {
            matches: survivors,
            outcome: MatchOutcome::BelowThreshold,
        };
    }

    survivors.sort_by(compare_candidates);
    survivors.truncate(settings.max_results);

    Ranking {
        matches: survivors,
        outcome: MatchOutcome::Matched,
    }
}
