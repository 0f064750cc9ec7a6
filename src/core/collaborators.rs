//! Seams to the services that feed the scoring core.
//!
//! The core never geocodes or embeds anything itself; it asks these traits for
//! already-resolved signals. Implementations must be shareable across the
//! worker threads of a parallel sweep.

use crate::core::error::ContractViolation;
use crate::models::{Need, Provider};

/// Distance between two resolved city names
pub trait GeoService: Send + Sync {
    /// Kilometers between the two cities, `None` when either cannot be resolved
    fn distance_km(&self, from_city: &str, to_city: &str) -> Option<f64>;
}

/// Semantic similarity between a need and a provider
pub trait SimilarityService: Send + Sync {
    /// Similarity in [0, 1]
    fn similarity(&self, need: &Need, provider: &Provider) -> Result<f64, ContractViolation>;
}
