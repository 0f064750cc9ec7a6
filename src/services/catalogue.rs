use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{Need, Provider};

/// Errors that can occur while loading a catalogue
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("failed to read catalogue {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalogue: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },
}

/// Needs and providers loaded once for a matching run; read-only afterwards
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalogue {
    #[serde(default)]
    pub needs: Vec<Need>,
    #[serde(default)]
    pub providers: Vec<Provider>,
}

impl Catalogue {
    pub fn new(needs: Vec<Need>, providers: Vec<Provider>) -> Result<Self, CatalogueError> {
        let catalogue = Self { needs, providers };
        catalogue.check_unique_ids()?;
        Ok(catalogue)
    }

    pub fn from_json_str(source: &str) -> Result<Self, CatalogueError> {
        let catalogue: Self = serde_json::from_str(source)?;
        catalogue.check_unique_ids()?;
        Ok(catalogue)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogueError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| CatalogueError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&source)
    }

    pub fn need(&self, id: &str) -> Option<&Need> {
        self.needs.iter().find(|need| need.id == id)
    }

    pub fn provider(&self, id: &str) -> Option<&Provider> {
        self.providers.iter().find(|provider| provider.id == id)
    }

    fn check_unique_ids(&self) -> Result<(), CatalogueError> {
        let mut seen = HashSet::new();
        for need in &self.needs {
            if !seen.insert(need.id.as_str()) {
                return Err(CatalogueError::DuplicateId {
                    kind: "need",
                    id: need.id.clone(),
                });
            }
        }

        seen.clear();
        for provider in &self.providers {
            if !seen.insert(provider.id.as_str()) {
                return Err(CatalogueError::DuplicateId {
                    kind: "provider",
                    id: provider.id.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalogue() {
        let catalogue = Catalogue::from_json_str(
            r#"{
                "needs": [{"id": "n1", "category": "Famille", "subcategory": "Scolarité", "city": "Lyon"}],
                "providers": [{"id": "p1", "companyName": "Acme", "city": null}]
            }"#,
        )
        .unwrap();

        assert_eq!(catalogue.need("n1").unwrap().resolved_city(), Some("Lyon"));
        assert_eq!(catalogue.provider("p1").unwrap().resolved_city(), None);
        assert!(catalogue.need("missing").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Catalogue::from_json_str(
            r#"{"providers": [{"id": "p1", "companyName": "A"}, {"id": "p1", "companyName": "B"}]}"#,
        );
        assert!(matches!(result, Err(CatalogueError::DuplicateId { kind: "provider", .. })));
    }
}
