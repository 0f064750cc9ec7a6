use serde::{Deserialize, Serialize};

use crate::core::error::ContractViolation;
use crate::core::geo::GeoScore;
use crate::core::impact::ImpactLevel;
use crate::core::weights::WeightPolicy;

/// Rounding slack allowed on collaborator scores before they count as out of range
pub const SCORE_TOLERANCE: f64 = 1e-9;

/// Check a semantic score and clamp away rounding noise at the bounds
#[inline]
pub fn validate_semantic_score(score_emb: f64) -> Result<f64, ContractViolation> {
    if score_emb.is_nan() || score_emb < -SCORE_TOLERANCE || score_emb > 1.0 + SCORE_TOLERANCE {
        return Err(ContractViolation::SemanticScoreOutOfRange(score_emb));
    }
    Ok(score_emb.clamp(0.0, 1.0))
}

/// Blend a semantic score with a proximity score.
///
/// Formula:
/// ```text
/// score_final = w_emb * score_emb + w_geo * score_geo   (geography applicable)
/// score_final = score_emb                               (geography not applicable)
/// ```
/// Weights come from the policy entry for `level`. The result is a convex
/// combination of two values in [0, 1] and stays in [0, 1].
#[inline]
pub fn combine(
    score_emb: f64,
    score_geo: GeoScore,
    level: ImpactLevel,
    policy: &WeightPolicy,
) -> Result<f64, ContractViolation> {
    let score_emb = validate_semantic_score(score_emb)?;

    match score_geo {
        GeoScore::NotApplicable => Ok(score_emb),
        GeoScore::Proximity(score_geo) => {
            let score_geo = score_geo.clamp(0.0, 1.0);
            let weights = policy.weights_for(level);
            let blended = weights.semantic * score_emb + weights.geo * score_geo;
            Ok(blended.clamp(0.0, 1.0))
        }
    }
}

/// Coarse confidence label attached to ranked results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    VeryRelevant,
    Relevant,
    Approximate,
    ToVerify,
}

impl Confidence {
    pub fn from_score(score_final: f64) -> Self {
        if score_final >= 0.85 {
            Confidence::VeryRelevant
        } else if score_final >= 0.70 {
            Confidence::Relevant
        } else if score_final >= 0.50 {
            Confidence::Approximate
        } else {
            Confidence::ToVerify
        }
    }
}
