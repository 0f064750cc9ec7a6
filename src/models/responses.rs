use serde::{Deserialize, Serialize};

use crate::core::{MatchOutcome, MatchResult, RejectedCandidate};
use crate::models::domain::{MatchCandidate, MatchDirection};

/// Ranked shortlist for one query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub direction: MatchDirection,
    #[serde(rename = "queryId")]
    pub query_id: String,
    pub status: MatchOutcome,
    pub message: Option<String>,
    pub matches: Vec<MatchCandidate>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    pub rejected: Vec<RejectedCandidate>,
    #[serde(rename = "unclassifiedPairs")]
    pub unclassified_pairs: usize,
    #[serde(rename = "domainFiltered")]
    pub domain_filtered: usize,
}

impl MatchResponse {
    pub fn from_result(request_id: String, result: MatchResult) -> Self {
        let message = match result.outcome {
            MatchOutcome::Matched => None,
            MatchOutcome::NoCandidates => Some("No candidates available to score".to_string()),
            MatchOutcome::BelowThreshold => Some("No sufficiently strong match".to_string()),
            MatchOutcome::AllRejected => Some("Every candidate was rejected for invalid input".to_string()),
        };

        Self {
            request_id,
            direction: result.direction,
            query_id: result.query_id,
            status: result.outcome,
            message,
            matches: result.matches,
            total_candidates: result.total_candidates,
            rejected: result.rejected,
            unclassified_pairs: result.unclassified_pairs,
            domain_filtered: result.domain_filtered,
        }
    }
}

/// Shortlists for every need in the catalogue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMatchResponse {
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub results: Vec<MatchResponse>,
    #[serde(rename = "matchedNeeds")]
    pub matched_needs: usize,
    #[serde(rename = "totalNeeds")]
    pub total_needs: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub needs: usize,
    pub providers: usize,
    #[serde(rename = "impactEntries")]
    pub impact_entries: usize,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
