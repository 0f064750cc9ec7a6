use serde::{Deserialize, Serialize};

use crate::core::error::{ConfigurationError, InvalidImpactLevel};
use crate::core::impact::ImpactLevel;

/// Tolerance for the "weights sum to one" check
pub const WEIGHT_SUM_EPSILON: f64 = 1e-9;

/// Semantic and geographic share of a final score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightPair {
    pub semantic: f64,
    pub geo: f64,
}

impl WeightPair {
    pub const fn new(semantic: f64, geo: f64) -> Self {
        Self { semantic, geo }
    }

    #[inline]
    pub fn sum(&self) -> f64 {
        self.semantic + self.geo
    }
}

/// Impact level → weight pair.
///
/// Total over the three levels by construction; every pair is validated
/// when the policy is built, so lookups cannot fail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightPolicy {
    pairs: [WeightPair; 3],
}

impl WeightPolicy {
    pub fn new(remote: WeightPair, local: WeightPair, critical: WeightPair) -> Result<Self, ConfigurationError> {
        let policy = Self {
            pairs: [remote, local, critical],
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Build from `(level, pair)` rows, rejecting unknown or missing levels
    pub fn from_entries<I>(entries: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (u8, WeightPair)>,
    {
        let mut slots: [Option<WeightPair>; 3] = [None; 3];
        for (raw_level, pair) in entries {
            let level = ImpactLevel::try_from(raw_level)
                .map_err(|InvalidImpactLevel(level)| ConfigurationError::UnknownWeightLevel(level.to_string()))?;
            slots[level.index()] = Some(pair);
        }

        let mut pairs = [WeightPair::new(0.0, 0.0); 3];
        for level in ImpactLevel::ALL {
            pairs[level.index()] = slots[level.index()].ok_or(ConfigurationError::MissingWeights(level.as_u8()))?;
        }

        let policy = Self { pairs };
        policy.validate()?;
        Ok(policy)
    }

    #[inline]
    pub fn weights_for(&self, level: ImpactLevel) -> WeightPair {
        self.pairs[level.index()]
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        for level in ImpactLevel::ALL {
            let pair = self.weights_for(level);
            let raw = level.as_u8();

            for value in [pair.semantic, pair.geo] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigurationError::WeightOutOfRange { level: raw, value });
                }
            }

            let sum = pair.sum();
            if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
                return Err(ConfigurationError::WeightsDoNotSumToOne { level: raw, sum });
            }

            match level {
                ImpactLevel::Remote if pair.geo != 0.0 => {
                    return Err(ConfigurationError::GeoWeightOnRemoteLevel(pair.geo));
                }
                ImpactLevel::Local | ImpactLevel::Critical if pair.geo <= 0.0 => {
                    return Err(ConfigurationError::MissingGeoWeight(raw));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl Default for WeightPolicy {
    fn default() -> Self {
        Self {
            pairs: [
                WeightPair::new(1.0, 0.0),
                WeightPair::new(0.65, 0.35),
                WeightPair::new(0.45, 0.55),
            ],
        }
    }
}
