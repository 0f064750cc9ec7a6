use geo::{HaversineDistance, Point};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::collaborators::GeoService;
use crate::core::impact::normalize_label;

const BUILTIN_CITIES: &str = include_str!("../../data/cities.toml");

/// Errors that can occur while loading a gazetteer
#[derive(Debug, Error)]
pub enum GazetteerError {
    #[error("failed to read gazetteer {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse gazetteer: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid coordinates for {name}: ({latitude}, {longitude})")]
    InvalidCoordinates {
        name: String,
        latitude: f64,
        longitude: f64,
    },
}

#[derive(Debug, Deserialize)]
struct CityRecord {
    name: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct GazetteerFile {
    #[serde(default)]
    cities: Vec<CityRecord>,
}

/// Static city → coordinates table answering distance queries.
///
/// Names are compared after [`normalize_label`]; two identical names are
/// 0 km apart even when the city is not in the table.
#[derive(Debug, Clone, Default)]
pub struct CityGazetteer {
    cities: HashMap<String, Point<f64>>,
}

impl CityGazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a city. Coordinates are WGS84 degrees.
    pub fn insert(&mut self, name: &str, latitude: f64, longitude: f64) -> Result<(), GazetteerError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(GazetteerError::InvalidCoordinates {
                name: name.to_string(),
                latitude,
                longitude,
            });
        }
        self.cities.insert(normalize_label(name), Point::new(longitude, latitude));
        Ok(())
    }

    pub fn from_toml_str(source: &str) -> Result<Self, GazetteerError> {
        let file: GazetteerFile = toml::from_str(source)?;
        let mut gazetteer = Self::new();
        for city in file.cities {
            gazetteer.insert(&city.name, city.latitude, city.longitude)?;
        }
        Ok(gazetteer)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GazetteerError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| GazetteerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Major French cities shipped with the crate
    pub fn builtin() -> Result<Self, GazetteerError> {
        Self::from_toml_str(BUILTIN_CITIES)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cities.contains_key(&normalize_label(name))
    }
}

impl GeoService for CityGazetteer {
    fn distance_km(&self, from_city: &str, to_city: &str) -> Option<f64> {
        let from = normalize_label(from_city);
        let to = normalize_label(to_city);
        if from.is_empty() || to.is_empty() {
            return None;
        }
        if from == to {
            return Some(0.0);
        }

        let a = self.cities.get(&from)?;
        let b = self.cities.get(&to)?;
        Some(a.haversine_distance(b) / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_loads() {
        let gazetteer = CityGazetteer::builtin().unwrap();
        assert!(gazetteer.len() >= 29);
        assert!(gazetteer.contains("paris"));
        assert!(gazetteer.contains("  Saint-Étienne "));
    }

    #[test]
    fn test_paris_lyon_distance() {
        let gazetteer = CityGazetteer::builtin().unwrap();
        let distance = gazetteer.distance_km("Paris", "Lyon").unwrap();
        assert!((distance - 392.0).abs() < 10.0, "Distance should be ~392km, got {}", distance);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let gazetteer = CityGazetteer::builtin().unwrap();
        let there = gazetteer.distance_km("Marseille", "Nice").unwrap();
        let back = gazetteer.distance_km("Nice", "Marseille").unwrap();
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn test_same_city_is_zero_even_when_unknown() {
        let gazetteer = CityGazetteer::new();
        assert_eq!(gazetteer.distance_km("Perpignan", " perpignan"), Some(0.0));
    }

    #[test]
    fn test_unknown_city_is_unresolvable() {
        let gazetteer = CityGazetteer::builtin().unwrap();
        assert_eq!(gazetteer.distance_km("Paris", "Atlantis"), None);
        assert_eq!(gazetteer.distance_km("", "Paris"), None);
    }

    #[test]
    fn test_rejects_invalid_coordinates() {
        let mut gazetteer = CityGazetteer::new();
        assert!(gazetteer.insert("Nowhere", 123.0, 0.0).is_err());
        assert!(gazetteer.insert("Nowhere", 0.0, f64::NAN).is_err());
    }
}
