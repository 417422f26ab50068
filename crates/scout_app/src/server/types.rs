//! JSON request and response bodies for the HTTP routes.

use scout_core::EnrichmentSpec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSearchBody {
    pub query: String,
    pub count: i64,
    #[serde(default)]
    pub criteria: Vec<String>,
    #[serde(default)]
    pub enrichments: Vec<EnrichmentSpec>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ItemsQuery {
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelResponse {
    pub canceled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
