use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::error::InvalidImpactLevel;

/// Table compiled into the binary, used when no table path is configured
const BUILTIN_IMPACT_TABLE: &str = include_str!("../../data/impact_geo.toml");

/// How much geography should influence matching for a service category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ImpactLevel {
    /// Remote or administrative services, distance is irrelevant
    Remote = 0,
    /// Local services where proximity matters moderately
    Local = 1,
    /// Urgent or proximity-critical services
    Critical = 2,
}

impl ImpactLevel {
    pub const ALL: [ImpactLevel; 3] = [ImpactLevel::Remote, ImpactLevel::Local, ImpactLevel::Critical];

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for ImpactLevel {
    type Error = InvalidImpactLevel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Remote),
            1 => Ok(Self::Local),
            2 => Ok(Self::Critical),
            other => Err(InvalidImpactLevel(i64::from(other))),
        }
    }
}

impl From<ImpactLevel> for u8 {
    fn from(level: ImpactLevel) -> Self {
        level.as_u8()
    }
}

impl std::fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Errors raised while building an impact table
#[derive(Debug, Error)]
pub enum ImpactTableError {
    #[error("failed to read impact table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse impact table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("conflicting levels for ({category}, {subcategory}): {first} and {second}")]
    Conflict {
        category: String,
        subcategory: String,
        first: ImpactLevel,
        second: ImpactLevel,
    },

    #[error("impact table entry has an empty category or sub-category")]
    EmptyLabel,
}

/// One row of the (major category, sub-category) → impact level table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactGeoEntry {
    pub category: String,
    pub subcategory: String,
    pub level: ImpactLevel,
}

#[derive(Debug, Deserialize)]
struct ImpactTableFile {
    #[serde(default = "default_impact_level")]
    default_level: ImpactLevel,
    #[serde(default)]
    entries: Vec<ImpactGeoEntry>,
}

fn default_impact_level() -> ImpactLevel {
    ImpactLevel::Local
}

/// Where a classification came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    Table,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub level: ImpactLevel,
    pub source: ClassificationSource,
}

impl Classification {
    pub fn is_default(&self) -> bool {
        self.source == ClassificationSource::Default
    }
}

/// Canonical form for category labels: trimmed, inner whitespace collapsed,
/// lowercased.
pub fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Immutable (major category, sub-category) → impact level lookup.
///
/// Keys are normalized with [`normalize_label`] when the table is built;
/// [`ImpactClassifier::classify`] itself matches exactly, so callers pass
/// normalized labels.
#[derive(Debug, Clone)]
pub struct ImpactClassifier {
    table: HashMap<String, HashMap<String, ImpactLevel>>,
    default_level: ImpactLevel,
    entries: usize,
}

impl ImpactClassifier {
    pub fn new<I>(entries: I, default_level: ImpactLevel) -> Result<Self, ImpactTableError>
    where
        I: IntoIterator<Item = ImpactGeoEntry>,
    {
        let mut table: HashMap<String, HashMap<String, ImpactLevel>> = HashMap::new();
        let mut count = 0;

        for entry in entries {
            let category = normalize_label(&entry.category);
            let subcategory = normalize_label(&entry.subcategory);
            if category.is_empty() || subcategory.is_empty() {
                return Err(ImpactTableError::EmptyLabel);
            }

            let row = table.entry(category).or_default();
            match row.get(&subcategory) {
                Some(&existing) if existing != entry.level => {
                    return Err(ImpactTableError::Conflict {
                        category: entry.category,
                        subcategory: entry.subcategory,
                        first: existing,
                        second: entry.level,
                    });
                }
                Some(_) => {}
                None => {
                    row.insert(subcategory, entry.level);
                    count += 1;
                }
            }
        }

        Ok(Self {
            table,
            default_level,
            entries: count,
        })
    }

    /// Parse a TOML table with `default_level` and `[[entries]]` rows
    pub fn from_toml_str(source: &str) -> Result<Self, ImpactTableError> {
        let file: ImpactTableFile = toml::from_str(source)?;
        Self::new(file.entries, file.default_level)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ImpactTableError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ImpactTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// The service-category table shipped with the crate
    pub fn builtin() -> Result<Self, ImpactTableError> {
        Self::from_toml_str(BUILTIN_IMPACT_TABLE)
    }

    /// Override the level returned for unmatched pairs
    pub fn with_default_level(mut self, level: ImpactLevel) -> Self {
        self.default_level = level;
        self
    }

    pub fn default_level(&self) -> ImpactLevel {
        self.default_level
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    #[inline]
    pub fn lookup(&self, major_category: &str, sub_category: &str) -> Option<ImpactLevel> {
        self.table
            .get(major_category)
            .and_then(|row| row.get(sub_category))
            .copied()
    }

    /// Classify a normalized category pair, falling back to the default level
    #[inline]
    pub fn classify(&self, major_category: &str, sub_category: &str) -> Classification {
        match self.lookup(major_category, sub_category) {
            Some(level) => Classification {
                level,
                source: ClassificationSource::Table,
            },
            None => Classification {
                level: self.default_level,
                source: ClassificationSource::Default,
            },
        }
    }
}
