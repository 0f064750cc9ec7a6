// Core algorithm exports
pub mod collaborators;
pub mod domain_filter;
pub mod error;
pub mod geo;
pub mod impact;
pub mod matcher;
pub mod ranker;
pub mod scoring;
pub mod weights;

pub use collaborators::{GeoService, SimilarityService};
pub use domain_filter::{DomainCriteria, DomainFilter, DomainRulesError};
pub use error::{ConfigurationError, ContractViolation, InvalidImpactLevel};
pub use geo::{geo_score, DecayConstants, GeoScore};
pub use impact::{normalize_label, Classification, ClassificationSource, ImpactClassifier, ImpactGeoEntry, ImpactLevel};
pub use matcher::{MatchResult, Matcher, RejectedCandidate, ScoringConfig};
pub use ranker::{rank, MatchOutcome, Ranking, RankingSettings};
pub use scoring::{combine, Confidence};
pub use weights::{WeightPair, WeightPolicy};
