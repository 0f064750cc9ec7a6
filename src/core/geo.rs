use crate::core::error::{ConfigurationError, ContractViolation};
use crate::core::impact::ImpactLevel;

/// Default decay for local services: 50% at ~46 km, 10% at ~154 km
pub const DEFAULT_LEVEL1_ALPHA: f64 = 0.015;

/// Default decay for proximity-critical services: 50% at ~14 km, 10% at ~46 km
pub const DEFAULT_LEVEL2_ALPHA: f64 = 0.05;

/// Per-kilometer exponential decay constants for the levels that use geography
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayConstants {
    level1_alpha: f64,
    level2_alpha: f64,
}

impl DecayConstants {
    /// Both constants must be positive and finite, and level 2 must decay
    /// faster than level 1.
    pub fn new(level1_alpha: f64, level2_alpha: f64) -> Result<Self, ConfigurationError> {
        for (level, value) in [(1, level1_alpha), (2, level2_alpha)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigurationError::InvalidDecay { level, value });
            }
        }
        if level2_alpha <= level1_alpha {
            return Err(ConfigurationError::DecayNotOrdered {
                level1: level1_alpha,
                level2: level2_alpha,
            });
        }
        Ok(Self {
            level1_alpha,
            level2_alpha,
        })
    }

    pub fn level1_alpha(&self) -> f64 {
        self.level1_alpha
    }

    pub fn level2_alpha(&self) -> f64 {
        self.level2_alpha
    }

    /// Decay constant for a level, `None` for the level that ignores distance
    #[inline]
    pub fn alpha_for(&self, level: ImpactLevel) -> Option<f64> {
        match level {
            ImpactLevel::Remote => None,
            ImpactLevel::Local => Some(self.level1_alpha),
            ImpactLevel::Critical => Some(self.level2_alpha),
        }
    }
}

impl Default for DecayConstants {
    fn default() -> Self {
        Self {
            level1_alpha: DEFAULT_LEVEL1_ALPHA,
            level2_alpha: DEFAULT_LEVEL2_ALPHA,
        }
    }
}

/// Proximity signal for one pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeoScore {
    /// Geography plays no part: remote level or distance unknown
    NotApplicable,
    /// `exp(-alpha * distance)`, in (0, 1]
    Proximity(f64),
}

impl GeoScore {
    pub fn value(&self) -> Option<f64> {
        match self {
            GeoScore::NotApplicable => None,
            GeoScore::Proximity(score) => Some(*score),
        }
    }
}

/// Check a collaborator-supplied distance
#[inline]
pub fn validate_distance(distance_km: f64) -> Result<f64, ContractViolation> {
    if distance_km.is_finite() && distance_km >= 0.0 {
        Ok(distance_km)
    } else {
        Err(ContractViolation::InvalidDistance(distance_km))
    }
}

/// Convert a distance into a proximity score.
///
/// `None` distance means at least one side has no resolved city; like the
/// remote level, that makes geography not applicable rather than a penalty.
#[inline]
pub fn geo_score(
    distance_km: Option<f64>,
    level: ImpactLevel,
    decay: &DecayConstants,
) -> Result<GeoScore, ContractViolation> {
    let Some(alpha) = decay.alpha_for(level) else {
        return Ok(GeoScore::NotApplicable);
    };
    let Some(distance_km) = distance_km else {
        return Ok(GeoScore::NotApplicable);
    };

    let distance_km = validate_distance(distance_km)?;

    // exp(-x) underflows to 0.0 for very large x; keep the score strictly positive
    let score = (-alpha * distance_km).exp().clamp(f64::MIN_POSITIVE, 1.0);
    Ok(GeoScore::Proximity(score))
}
