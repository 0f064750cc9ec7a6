// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{MatchCandidate, MatchDirection, Need, Provider};
pub use requests::{FindNeedsRequest, FindProvidersRequest};
pub use responses::{BatchMatchResponse, ErrorResponse, HealthResponse, MatchResponse};
