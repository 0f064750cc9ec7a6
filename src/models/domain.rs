use serde::{Deserialize, Deserializer, Serialize};

use crate::core::impact::ImpactLevel;
use crate::core::scoring::Confidence;

/// A requester's service request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Need {
    pub id: String,
    #[serde(rename = "category")]
    pub major_category: String,
    #[serde(rename = "subcategory")]
    pub sub_category: String,
    #[serde(default)]
    pub description: String,
    /// City resolved by the entity extractor
    #[serde(default, deserialize_with = "blank_as_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub urgency: Option<String>,
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl Need {
    pub fn resolved_city(&self) -> Option<&str> {
        self.city.as_deref()
    }
}

/// A service vendor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    #[serde(rename = "companyName")]
    pub company_name: String,
    #[serde(rename = "expertiseDomains", default)]
    pub expertise_domains: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub city: Option<String>,
    #[serde(default)]
    pub availability: String,
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl Provider {
    pub fn resolved_city(&self) -> Option<&str> {
        self.city.as_deref()
    }
}

/// Which side of the catalogue a query fans out over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchDirection {
    /// One need against every provider
    NeedToProviders,
    /// One provider against every need
    ProviderToNeeds,
}

/// One scored (need, provider) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    #[serde(rename = "needId")]
    pub need_id: String,
    #[serde(rename = "providerId")]
    pub provider_id: String,
    #[serde(rename = "companyName")]
    pub company_name: String,
    #[serde(rename = "impactLevel")]
    pub impact_level: ImpactLevel,
    #[serde(rename = "scoreEmb")]
    pub score_emb: f64,
    /// `None` when either city is missing or unresolvable
    #[serde(rename = "distanceKm")]
    pub distance_km: Option<f64>,
    /// `None` when geography does not apply to this pair
    #[serde(rename = "scoreGeo")]
    pub score_geo: Option<f64>,
    #[serde(rename = "scoreFinal")]
    pub score_final: f64,
    pub confidence: Confidence,
}

/// Treat missing, empty and whitespace-only strings as absent
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}
