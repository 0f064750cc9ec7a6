use thiserror::Error;

/// Raised when a numeric value does not name one of the three impact levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("impact level {0} is not one of 0, 1, 2")]
pub struct InvalidImpactLevel(pub i64);

/// Setup problems that must abort a run before any scoring happens
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("no weight pair configured for impact level {0}")]
    MissingWeights(u8),

    #[error("weight table key '{0}' is not an impact level")]
    UnknownWeightLevel(String),

    #[error("weights for impact level {level} sum to {sum}, expected 1")]
    WeightsDoNotSumToOne { level: u8, sum: f64 },

    #[error("weight {value} for impact level {level} is outside [0, 1]")]
    WeightOutOfRange { level: u8, value: f64 },

    #[error("impact level 0 must carry a zero geo weight, found {0}")]
    GeoWeightOnRemoteLevel(f64),

    #[error("impact level {0} must carry a positive geo weight")]
    MissingGeoWeight(u8),

    #[error("decay constant for impact level {level} must be positive and finite, got {value}")]
    InvalidDecay { level: u8, value: f64 },

    #[error("level 2 decay ({level2}) must be sharper than level 1 decay ({level1})")]
    DecayNotOrdered { level1: f64, level2: f64 },

    #[error("minimum score {0} is outside [0, 1]")]
    InvalidThreshold(f64),

    #[error("max_results must be at least 1")]
    ZeroMaxResults,

    #[error("invalid default impact level: {0}")]
    InvalidDefaultLevel(#[from] InvalidImpactLevel),

    #[error("impact table: {0}")]
    ImpactTable(#[from] crate::core::impact::ImpactTableError),

    #[error("domain rules: {0}")]
    DomainRules(#[from] crate::core::domain_filter::DomainRulesError),
}

/// A collaborator handed the core a value outside its documented range.
///
/// These are isolated per candidate: the offending pair is logged and
/// excluded, the rest of the query carries on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractViolation {
    #[error("semantic score {0} is outside [0, 1]")]
    SemanticScoreOutOfRange(f64),

    #[error("distance {0} km is negative or not finite")]
    InvalidDistance(f64),

    #[error("embedding dimensions differ: need has {need}, provider has {provider}")]
    EmbeddingDimensionMismatch { need: usize, provider: usize },

    #[error("embedding vector is empty")]
    EmptyEmbedding,
}
