use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::{
    collaborators::{GeoService, SimilarityService},
    domain_filter::{DomainCriteria, DomainFilter},
    error::ContractViolation,
    geo::{geo_score, DecayConstants},
    impact::{normalize_label, Classification, ImpactClassifier, ImpactLevel},
    ranker::{rank, MatchOutcome, RankingSettings},
    scoring::{combine, validate_semantic_score, Confidence},
    weights::WeightPolicy,
};
use crate::models::{MatchCandidate, MatchDirection, Need, Provider};

/// Validated scoring policy, built once before any query runs
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoringConfig {
    pub weights: WeightPolicy,
    pub decay: DecayConstants,
    pub ranking: RankingSettings,
}

/// A pair left out of ranking because a collaborator broke its contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedCandidate {
    #[serde(rename = "needId")]
    pub need_id: String,
    #[serde(rename = "providerId")]
    pub provider_id: String,
    pub reason: String,
}

/// Result of one matching query
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub direction: MatchDirection,
    /// Need id or provider id the query was run for
    pub query_id: String,
    pub matches: Vec<MatchCandidate>,
    pub outcome: MatchOutcome,
    pub total_candidates: usize,
    pub rejected: Vec<RejectedCandidate>,
    /// Pairs whose impact level came from the classifier default
    pub unclassified_pairs: usize,
    /// Counterparts removed by the domain pre-filter before scoring
    pub domain_filtered: usize,
}

impl MatchResult {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Scoring and ranking orchestrator.
///
/// # Pipeline
/// 1. Impact classification from the need's category pair
/// 2. Semantic similarity and distance from the collaborators
/// 3. Geo decay and weighted combination
/// 4. Threshold, sort and top-K
///
/// The classifier and policy are read-only and shared through `Arc`, so a
/// single query fans out over the catalogue without locking.
#[derive(Clone)]
pub struct Matcher {
    config: ScoringConfig,
    classifier: Arc<ImpactClassifier>,
    geo: Arc<dyn GeoService>,
    similarity: Arc<dyn SimilarityService>,
    domain_filter: Option<Arc<DomainFilter>>,
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("config", &self.config)
            .field("impact_entries", &self.classifier.len())
            .field("domain_filter", &self.domain_filter.is_some())
            .finish_non_exhaustive()
    }
}

impl Matcher {
    pub fn new(
        config: ScoringConfig,
        classifier: Arc<ImpactClassifier>,
        geo: Arc<dyn GeoService>,
        similarity: Arc<dyn SimilarityService>,
    ) -> Self {
        Self {
            config,
            classifier,
            geo,
            similarity,
            domain_filter: None,
        }
    }

    /// Narrow candidates by expertise domain before scoring.
    ///
    /// When no candidate survives the filter the full set is scored instead.
    pub fn with_domain_filter(mut self, filter: Arc<DomainFilter>) -> Self {
        self.domain_filter = Some(filter);
        self
    }

    pub fn domain_filter(&self) -> Option<&DomainFilter> {
        self.domain_filter.as_deref()
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn classifier(&self) -> &ImpactClassifier {
        &self.classifier
    }

    /// Impact level for a need, normalizing its labels first.
    ///
    /// A miss falls back to the classifier default and is logged.
    pub fn classify_need(&self, need: &Need) -> Classification {
        let major = normalize_label(&need.major_category);
        let sub = normalize_label(&need.sub_category);
        let classification = self.classifier.classify(&major, &sub);

        if classification.is_default() {
            tracing::warn!(
                "Unclassified category pair ({:?}, {:?}) for need {}, using default impact level {}",
                need.major_category,
                need.sub_category,
                need.id,
                classification.level
            );
        }

        classification
    }

    fn domain_criteria(&self, need: &Need) -> Option<DomainCriteria> {
        self.domain_filter
            .as_ref()?
            .criteria(&need.major_category, &need.sub_category)
    }

    fn providers_in_domain<'a>(&self, need: &Need, providers: &'a [Provider]) -> (Vec<&'a Provider>, usize) {
        let Some(criteria) = self.domain_criteria(need) else {
            return (providers.iter().collect(), 0);
        };

        let kept: Vec<&Provider> = providers
            .iter()
            .filter(|provider| criteria.accepts(&provider.expertise_domains))
            .collect();

        if kept.is_empty() && !providers.is_empty() {
            tracing::warn!(
                "No provider matches the expertise domains of need {}, scoring all {} providers",
                need.id,
                providers.len()
            );
            return (providers.iter().collect(), 0);
        }

        let filtered = providers.len() - kept.len();
        tracing::debug!(
            "Domain filter for need {}: {} -> {} providers",
            need.id,
            providers.len(),
            kept.len()
        );
        (kept, filtered)
    }

    fn needs_in_domain<'a>(&self, provider: &Provider, needs: &'a [Need]) -> (Vec<&'a Need>, usize) {
        if self.domain_filter.is_none() {
            return (needs.iter().collect(), 0);
        }

        let kept: Vec<&Need> = needs
            .iter()
            .filter(|need| {
                self.domain_criteria(need)
                    .map_or(true, |criteria| criteria.accepts(&provider.expertise_domains))
            })
            .collect();

        if kept.is_empty() && !needs.is_empty() {
            tracing::warn!(
                "Provider {} matches the expertise domains of no need, scoring all {} needs",
                provider.id,
                needs.len()
            );
            return (needs.iter().collect(), 0);
        }

        let filtered = needs.len() - kept.len();
        (kept, filtered)
    }

    fn resolve_distance(&self, need: &Need, provider: &Provider) -> Option<f64> {
        match (need.resolved_city(), provider.resolved_city()) {
            (Some(from), Some(to)) => self.geo.distance_km(from, to),
            _ => None,
        }
    }

    /// Score a single pair under an already computed classification
    pub fn score_pair(
        &self,
        need: &Need,
        provider: &Provider,
        classification: Classification,
    ) -> Result<MatchCandidate, ContractViolation> {
        let level = classification.level;
        let score_emb = validate_semantic_score(self.similarity.similarity(need, provider)?)?;

        // Geography is irrelevant at the remote level, skip the lookup
        let distance_km = match level {
            ImpactLevel::Remote => None,
            ImpactLevel::Local | ImpactLevel::Critical => self.resolve_distance(need, provider),
        };

        let score_geo = geo_score(distance_km, level, &self.config.decay)?;
        let score_final = combine(score_emb, score_geo, level, &self.config.weights)?;

        Ok(MatchCandidate {
            need_id: need.id.clone(),
            provider_id: provider.id.clone(),
            company_name: provider.company_name.clone(),
            impact_level: level,
            score_emb,
            distance_km,
            score_geo: score_geo.value(),
            score_final,
            confidence: Confidence::from_score(score_final),
        })
    }

    /// Shortlist providers for one need with the configured ranking settings
    pub fn find_providers(&self, need: &Need, providers: &[Provider]) -> MatchResult {
        self.find_providers_with(need, providers, &self.config.ranking)
    }

    pub fn find_providers_with(
        &self,
        need: &Need,
        providers: &[Provider],
        ranking: &RankingSettings,
    ) -> MatchResult {
        let classification = self.classify_need(need);
        let (pool, domain_filtered) = self.providers_in_domain(need, providers);

        let scored: Vec<ScoredPair<'_>> = pool
            .par_iter()
            .map(|&provider| ScoredPair {
                need_id: &need.id,
                provider_id: &provider.id,
                from_default: classification.is_default(),
                result: self.score_pair(need, provider, classification),
            })
            .collect();

        assemble(MatchDirection::NeedToProviders, &need.id, scored, domain_filtered, ranking)
    }

    /// Shortlist needs for one provider.
    ///
    /// Each need is classified from its own category pair.
    pub fn find_needs(&self, provider: &Provider, needs: &[Need]) -> MatchResult {
        self.find_needs_with(provider, needs, &self.config.ranking)
    }

    pub fn find_needs_with(
        &self,
        provider: &Provider,
        needs: &[Need],
        ranking: &RankingSettings,
    ) -> MatchResult {
        let (pool, domain_filtered) = self.needs_in_domain(provider, needs);

        let scored: Vec<ScoredPair<'_>> = pool
            .par_iter()
            .map(|&need| {
                let classification = self.classify_need(need);
                ScoredPair {
                    need_id: &need.id,
                    provider_id: &provider.id,
                    from_default: classification.is_default(),
                    result: self.score_pair(need, provider, classification),
                }
            })
            .collect();

        assemble(MatchDirection::ProviderToNeeds, &provider.id, scored, domain_filtered, ranking)
    }

    /// Match every need against the whole provider catalogue.
    ///
    /// Results come back in the order of `needs`.
    pub fn batch_match(&self, needs: &[Need], providers: &[Provider]) -> Vec<MatchResult> {
        let results: Vec<MatchResult> = needs
            .par_iter()
            .map(|need| self.find_providers(need, providers))
            .collect();

        let matched = results.iter().filter(|r| !r.is_empty()).count();
        tracing::info!(
            "Batch matched {} of {} needs against {} providers",
            matched,
            needs.len(),
            providers.len()
        );

        results
    }
}

struct ScoredPair<'a> {
    need_id: &'a str,
    provider_id: &'a str,
    from_default: bool,
    result: Result<MatchCandidate, ContractViolation>,
}

fn assemble(
    direction: MatchDirection,
    query_id: &str,
    scored: Vec<ScoredPair<'_>>,
    domain_filtered: usize,
    ranking: &RankingSettings,
) -> MatchResult {
    let total_candidates = scored.len();
    let unclassified_pairs = scored.iter().filter(|pair| pair.from_default).count();

    let mut candidates = Vec::with_capacity(total_candidates);
    let mut rejected = Vec::new();

    for pair in scored {
        match pair.result {
            Ok(candidate) => candidates.push(candidate),
            Err(violation) => {
                tracing::warn!(
                    "Excluding pair (need {}, provider {}): {}",
                    pair.need_id,
                    pair.provider_id,
                    violation
                );
                rejected.push(RejectedCandidate {
                    need_id: pair.need_id.to_string(),
                    provider_id: pair.provider_id.to_string(),
                    reason: violation.to_string(),
                });
            }
        }
    }

    let mut ranking = rank(candidates, ranking);
    if ranking.outcome == MatchOutcome::NoCandidates && total_candidates > 0 {
        ranking.outcome = MatchOutcome::AllRejected;
    }

    tracing::debug!(
        "Query {} ({:?}): {} candidates, {} rejected, {} ranked, outcome {:?}",
        query_id,
        direction,
        total_candidates,
        rejected.len(),
        ranking.matches.len(),
        ranking.outcome
    );

    MatchResult {
        direction,
        query_id: query_id.to_string(),
        matches: ranking.matches,
        outcome: ranking.outcome,
        total_candidates,
        rejected,
        unclassified_pairs,
        domain_filtered,
    }
}
