//! Provider Match - need-to-provider matching service
//!
//! Shortlists service providers for a user need (and needs for a provider) by
//! blending semantic similarity with geographic proximity. How much distance
//! matters is decided per need from its impact level.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{ImpactClassifier, ImpactLevel, MatchResult, Matcher, ScoringConfig};
pub use models::{MatchCandidate, Need, Provider};
pub use services::{Catalogue, CityGazetteer, CosineSimilarity};
