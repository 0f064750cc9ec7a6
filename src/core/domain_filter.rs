//! Optional expertise-domain pre-filter.
//!
//! Narrows the provider pool for a need before scoring, using the need's
//! sub-category to pick required keywords and incompatible domain fragments.
//! Providers are kept when their expertise domains contain no excluded
//! fragment and enough required keywords.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

const BUILTIN_DOMAIN_RULES: &str = include_str!("../../data/domain_rules.toml");

/// Fallback keywords must be longer than this many characters
const MIN_FALLBACK_KEYWORD_CHARS: usize = 4;

#[derive(Debug, Error)]
pub enum DomainRulesError {
    #[error("failed to read domain rules {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse domain rules: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("domain rule has an empty sub-category or trigger")]
    EmptyKey,
}

#[derive(Debug, Deserialize)]
struct DomainRulesFile {
    #[serde(default)]
    strict_triggers: Vec<String>,
    #[serde(default)]
    required: Vec<RequiredRecord>,
    #[serde(default)]
    incompatible: Vec<IncompatibleRecord>,
}

#[derive(Debug, Deserialize)]
struct RequiredRecord {
    subcategory: String,
    keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct IncompatibleRecord {
    trigger: String,
    excluded: Vec<String>,
}

#[derive(Debug, Clone)]
struct KeyedRule {
    /// Folded with [`fold_label`]
    key: String,
    /// Lowercased
    words: Vec<String>,
}

/// Lowercase and strip diacritics, so "Prêt" and "pret" compare equal
pub fn fold_label(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// What a provider's expertise domains must satisfy for one need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainCriteria {
    keywords: BTreeSet<String>,
    exclusions: BTreeSet<String>,
    min_matches: usize,
}

impl DomainCriteria {
    pub fn keywords(&self) -> &BTreeSet<String> {
        &self.keywords
    }

    pub fn exclusions(&self) -> &BTreeSet<String> {
        &self.exclusions
    }

    pub fn min_matches(&self) -> usize {
        self.min_matches
    }

    /// Exclusions block outright; otherwise count keyword hits.
    ///
    /// Matching is substring-based on the lowercased domains, so a short
    /// fragment like "électri" covers every variant.
    pub fn accepts(&self, expertise_domains: &[String]) -> bool {
        let domains = expertise_domains.join(", ").to_lowercase();

        if self.exclusions.iter().any(|fragment| domains.contains(fragment.as_str())) {
            return false;
        }

        let hits = self
            .keywords
            .iter()
            .filter(|keyword| domains.contains(keyword.as_str()))
            .count();
        hits >= self.min_matches
    }
}

/// Immutable keyword and exclusion tables for the pre-filter
#[derive(Debug, Clone)]
pub struct DomainFilter {
    required: Vec<KeyedRule>,
    incompatible: Vec<KeyedRule>,
    strict_triggers: Vec<String>,
}

impl DomainFilter {
    pub fn from_toml_str(source: &str) -> Result<Self, DomainRulesError> {
        let file: DomainRulesFile = toml::from_str(source)?;

        let keyed = |key: &str, words: Vec<String>| -> Result<KeyedRule, DomainRulesError> {
            let key = fold_label(key);
            if key.is_empty() {
                return Err(DomainRulesError::EmptyKey);
            }
            Ok(KeyedRule {
                key,
                words: words.iter().map(|w| w.trim().to_lowercase()).filter(|w| !w.is_empty()).collect(),
            })
        };

        let required = file
            .required
            .into_iter()
            .map(|r| keyed(&r.subcategory, r.keywords))
            .collect::<Result<Vec<_>, _>>()?;
        let incompatible = file
            .incompatible
            .into_iter()
            .map(|r| keyed(&r.trigger, r.excluded))
            .collect::<Result<Vec<_>, _>>()?;
        let strict_triggers = file
            .strict_triggers
            .iter()
            .map(|t| fold_label(t))
            .filter(|t| !t.is_empty())
            .collect();

        Ok(Self {
            required,
            incompatible,
            strict_triggers,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DomainRulesError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| DomainRulesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Rules shipped with the crate
    pub fn builtin() -> Result<Self, DomainRulesError> {
        Self::from_toml_str(BUILTIN_DOMAIN_RULES)
    }

    /// Criteria for a need, or `None` when no keyword can be derived and
    /// every provider stays in the pool.
    pub fn criteria(&self, major_category: &str, sub_category: &str) -> Option<DomainCriteria> {
        let sub = fold_label(sub_category);

        // First rule whose key and the sub-category contain one another
        let mut keywords: BTreeSet<String> = if sub.is_empty() {
            BTreeSet::new()
        } else {
            self.required
                .iter()
                .find(|rule| sub.contains(rule.key.as_str()) || rule.key.contains(sub.as_str()))
                .map(|rule| rule.words.iter().cloned().collect())
                .unwrap_or_default()
        };

        if keywords.is_empty() {
            keywords = long_words(sub_category);
        }
        if keywords.is_empty() {
            keywords = long_words(major_category);
        }
        if keywords.is_empty() {
            return None;
        }

        let exclusions = self
            .incompatible
            .iter()
            .filter(|rule| sub.contains(rule.key.as_str()))
            .flat_map(|rule| rule.words.iter().cloned())
            .collect();

        let strict = self.strict_triggers.iter().any(|t| sub.contains(t.as_str()));

        Some(DomainCriteria {
            keywords,
            exclusions,
            min_matches: if strict { 2 } else { 1 },
        })
    }
}

fn long_words(label: &str) -> BTreeSet<String> {
    label
        .split_whitespace()
        .filter(|word| word.chars().count() > MIN_FALLBACK_KEYWORD_CHARS)
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains(list: &[&str]) -> Vec<String> {
        list.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_fold_label_strips_accents() {
        assert_eq!(fold_label(" Prêt Immobilier "), "pret immobilier");
        assert_eq!(fold_label("Électroménager"), "electromenager");
    }

    #[test]
    fn test_builtin_rules_load() {
        let filter = DomainFilter::builtin().unwrap();
        assert_eq!(filter.required.len(), 50);
        assert_eq!(filter.incompatible.len(), 19);
    }

    #[test]
    fn test_incompatible_domain_excluded() {
        let filter = DomainFilter::builtin().unwrap();
        let criteria = filter.criteria("Famille", "Garde d'enfant").unwrap();

        assert!(criteria.accepts(&domains(&["Garde d'enfants", "Babysitting"])));
        // Keyword hit, but plumbing is incompatible with childcare
        assert!(!criteria.accepts(&domains(&["Plomberie", "Garde d'enfants"])));
        assert!(!criteria.accepts(&domains(&["Assurance"])));
    }

    #[test]
    fn test_strict_sub_category_needs_two_keywords() {
        let filter = DomainFilter::builtin().unwrap();
        let criteria = filter.criteria("Logement et Installation", "Location meublée").unwrap();

        assert_eq!(criteria.min_matches(), 2);
        assert!(!criteria.accepts(&domains(&["Location"])));
        assert!(criteria.accepts(&domains(&["Location", "Immobilier"])));
        // "auto" is excluded for rentals even with enough keywords
        assert!(!criteria.accepts(&domains(&["Location", "Immobilier", "Automobile"])));
    }

    #[test]
    fn test_accented_and_plain_sub_categories_match_same_rule() {
        let filter = DomainFilter::builtin().unwrap();
        let accented = filter.criteria("Banque", "Prêt immobilier").unwrap();
        let plain = filter.criteria("Banque", "pret immobilier").unwrap();

        assert_eq!(accented, plain);
        assert_eq!(accented.min_matches(), 2);
    }

    #[test]
    fn test_unknown_sub_category_uses_long_words() {
        let filter = DomainFilter::builtin().unwrap();
        let criteria = filter.criteria("Divers", "Cours de piano").unwrap();

        assert!(criteria.keywords().contains("piano"));
        assert!(criteria.keywords().contains("cours"));
        assert!(!criteria.keywords().contains("de"));
        assert_eq!(criteria.min_matches(), 1);
    }

    #[test]
    fn test_no_keywords_means_no_filtering() {
        let filter = DomainFilter::builtin().unwrap();
        assert_eq!(filter.criteria("Aide", "Vélo"), None);
    }

    #[test]
    fn test_empty_rule_key_rejected() {
        let result = DomainFilter::from_toml_str(
            r#"
            [[required]]
            subcategory = "  "
            keywords = ["x"]
            "#,
        );
        assert!(matches!(result, Err(DomainRulesError::EmptyKey)));
    }
}
