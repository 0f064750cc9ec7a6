use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shortlist providers for one need
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindProvidersRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "need_id", rename = "needId")]
    pub need_id: String,
    /// Optional cap, never larger than the configured result size
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<u16>,
}

/// Request to shortlist needs for one provider
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindNeedsRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "provider_id", rename = "providerId")]
    pub provider_id: String,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<u16>,
}
