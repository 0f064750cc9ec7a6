use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::core::{
    geo::{DEFAULT_LEVEL1_ALPHA, DEFAULT_LEVEL2_ALPHA},
    ranker::{DEFAULT_MAX_RESULTS, DEFAULT_MIN_SCORE},
    ConfigurationError, DecayConstants, DomainFilter, ImpactClassifier, ImpactLevel, RankingSettings, ScoringConfig,
    WeightPair, WeightPolicy,
};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    #[serde(default = "default_catalogue_path")]
    pub catalogue_path: String,
    /// Built-in table when unset
    pub impact_table_path: Option<String>,
    /// Built-in gazetteer when unset
    pub gazetteer_path: Option<String>,
    /// Built-in expertise-domain rules when unset
    pub domain_rules_path: Option<String>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            catalogue_path: default_catalogue_path(),
            impact_table_path: None,
            gazetteer_path: None,
            domain_rules_path: None,
        }
    }
}

fn default_catalogue_path() -> String { "data/catalogue.json".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Level for category pairs missing from the impact table
    pub default_impact_level: Option<u8>,
    /// Pre-filter providers by expertise domain before scoring
    #[serde(default)]
    pub domain_filter: bool,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            max_results: default_max_results(),
            default_impact_level: None,
            domain_filter: false,
        }
    }
}

fn default_min_score() -> f64 { DEFAULT_MIN_SCORE }
fn default_max_results() -> usize { DEFAULT_MAX_RESULTS }

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    /// Keyed by impact level: "0", "1", "2"
    #[serde(default = "default_weights")]
    pub weights: BTreeMap<String, WeightsConfig>,
    #[serde(default)]
    pub decay: DecayConfig,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            weights: default_weights(),
            decay: DecayConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WeightsConfig {
    pub semantic: f64,
    pub geo: f64,
}

fn default_weights() -> BTreeMap<String, WeightsConfig> {
    let policy = WeightPolicy::default();
    ImpactLevel::ALL
        .iter()
        .map(|&level| {
            let pair = policy.weights_for(level);
            (
                level.to_string(),
                WeightsConfig {
                    semantic: pair.semantic,
                    geo: pair.geo,
                },
            )
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DecayConfig {
    #[serde(default = "default_level1_alpha")]
    pub level1_alpha: f64,
    #[serde(default = "default_level2_alpha")]
    pub level2_alpha: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            level1_alpha: default_level1_alpha(),
            level2_alpha: default_level2_alpha(),
        }
    }
}

fn default_level1_alpha() -> f64 { DEFAULT_LEVEL1_ALPHA }
fn default_level2_alpha() -> f64 { DEFAULT_LEVEL2_ALPHA }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with MATCH)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., MATCH__MATCHING__MIN_SCORE -> matching.min_score
            .add_source(
                Environment::with_prefix("MATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("MATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Validate the scoring sections into core types.
    ///
    /// Any failure here must stop the run before a single pair is scored.
    pub fn scoring_config(&self) -> Result<ScoringConfig, ConfigurationError> {
        let entries = self
            .scoring
            .weights
            .iter()
            .map(|(key, pair)| {
                key.trim()
                    .parse::<u8>()
                    .map(|level| (level, WeightPair::new(pair.semantic, pair.geo)))
                    .map_err(|_| ConfigurationError::UnknownWeightLevel(key.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ScoringConfig {
            weights: WeightPolicy::from_entries(entries)?,
            decay: DecayConstants::new(self.scoring.decay.level1_alpha, self.scoring.decay.level2_alpha)?,
            ranking: RankingSettings::new(self.matching.min_score, self.matching.max_results)?,
        })
    }

    /// Load the impact table named in the settings, or the built-in one
    pub fn impact_classifier(&self) -> Result<Arc<ImpactClassifier>, ConfigurationError> {
        let classifier = match &self.data.impact_table_path {
            Some(path) => ImpactClassifier::load(path)?,
            None => ImpactClassifier::builtin()?,
        };

        let classifier = match self.matching.default_impact_level {
            Some(raw) => classifier.with_default_level(ImpactLevel::try_from(raw)?),
            None => classifier,
        };

        Ok(Arc::new(classifier))
    }

    /// Domain rules when the pre-filter is enabled, `None` otherwise
    pub fn domain_filter(&self) -> Result<Option<Arc<DomainFilter>>, ConfigurationError> {
        if !self.matching.domain_filter {
            return Ok(None);
        }

        let filter = match &self.data.domain_rules_path {
            Some(path) => DomainFilter::load(path)?,
            None => DomainFilter::builtin()?,
        };
        Ok(Some(Arc::new(filter)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scoring_config_is_valid() {
        let settings = Settings::default();
        let config = settings.scoring_config().unwrap();
        assert_eq!(config, ScoringConfig::default());
    }

    #[test]
    fn test_default_matching() {
        let matching = MatchingSettings::default();
        assert_eq!(matching.min_score, 0.30);
        assert_eq!(matching.max_results, 5);
    }

    #[test]
    fn test_default_decay() {
        let decay = DecayConfig::default();
        assert_eq!(decay.level1_alpha, 0.015);
        assert_eq!(decay.level2_alpha, 0.05);
    }

    #[test]
    fn test_missing_weight_level_is_fatal() {
        let mut settings = Settings::default();
        settings.scoring.weights.remove("2");
        assert!(matches!(
            settings.scoring_config(),
            Err(ConfigurationError::MissingWeights(2))
        ));
    }

    #[test]
    fn test_bad_weight_key_is_fatal() {
        let mut settings = Settings::default();
        settings
            .scoring
            .weights
            .insert("urgent".to_string(), WeightsConfig { semantic: 0.5, geo: 0.5 });
        assert!(matches!(
            settings.scoring_config(),
            Err(ConfigurationError::UnknownWeightLevel(_))
        ));
    }

    #[test]
    fn test_unordered_decay_is_fatal() {
        let mut settings = Settings::default();
        settings.scoring.decay.level2_alpha = 0.01;
        assert!(matches!(
            settings.scoring_config(),
            Err(ConfigurationError::DecayNotOrdered { .. })
        ));
    }

    #[test]
    fn test_invalid_default_impact_level() {
        let mut settings = Settings::default();
        settings.matching.default_impact_level = Some(4);
        assert!(matches!(
            settings.impact_classifier(),
            Err(ConfigurationError::InvalidDefaultLevel(_))
        ));
    }

    #[test]
    fn test_builtin_classifier_with_override() {
        let mut settings = Settings::default();
        settings.matching.default_impact_level = Some(0);
        let classifier = settings.impact_classifier().unwrap();
        assert_eq!(classifier.default_level(), ImpactLevel::Remote);
    }

    #[test]
    fn test_domain_filter_disabled_by_default() {
        let settings = Settings::default();
        assert!(!settings.matching.domain_filter);
        assert!(settings.domain_filter().unwrap().is_none());
    }

    #[test]
    fn test_domain_filter_enabled_uses_builtin_rules() {
        let mut settings = Settings::default();
        settings.matching.domain_filter = true;
        let filter = settings.domain_filter().unwrap().unwrap();
        assert!(filter.criteria("Famille", "Garde d'enfant").is_some());
    }

    #[test]
    fn test_missing_domain_rules_file_is_fatal() {
        let mut settings = Settings::default();
        settings.matching.domain_filter = true;
        settings.data.domain_rules_path = Some("does/not/exist.toml".to_string());
        assert!(matches!(
            settings.domain_filter(),
            Err(ConfigurationError::DomainRules(_))
        ));
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "compact");
    }
}
