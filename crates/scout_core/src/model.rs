use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a webset on the upstream service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Wraps an id received from the upstream service without validation.
    /// Ids supplied by callers go through [`crate::validate_job_id`].
    pub fn from_upstream(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebsetStatus {
    Idle,
    Pending,
    Running,
    Paused,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Created,
    Running,
    Completed,
    Failed,
    #[serde(alias = "cancelled")]
    Canceled,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunStatus::Created => "created",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Canceled => "canceled",
            RunStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RunProgress {
    #[serde(default)]
    pub found: u32,
    /// Percentage in `0.0..=100.0`.
    #[serde(default)]
    pub completion: f64,
}

/// One executed query inside a webset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRun {
    pub id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub progress: RunProgress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// The webset aggregate as reported by the upstream service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchJob {
    pub id: JobId,
    pub status: WebsetStatus,
    #[serde(default)]
    pub searches: Vec<SearchRun>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl SearchJob {
    /// The first run is authoritative for progress and status.
    pub fn primary_run(&self) -> Option<&SearchRun> {
        self.searches.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub id: String,
    pub properties: ItemProperties,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub enrichments: BTreeMap<String, serde_json::Value>,
}

impl ResultItem {
    pub fn display_name(&self) -> &str {
        match &self.properties {
            ItemProperties::Person { person, .. } => &person.name,
            ItemProperties::Company { company, .. } => &company.name,
            ItemProperties::ResearchPaper { url, .. } | ItemProperties::Article { url, .. } => url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemProperties {
    Person {
        url: String,
        #[serde(default)]
        description: String,
        person: PersonDetails,
    },
    Company {
        url: String,
        #[serde(default)]
        description: String,
        company: CompanyDetails,
    },
    ResearchPaper {
        url: String,
        #[serde(default)]
        description: String,
        #[serde(default, rename = "researchPaper")]
        research_paper: PublicationDetails,
    },
    Article {
        url: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        article: PublicationDetails,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersonDetails {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetails {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employees: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PublicationDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentFormat {
    #[default]
    Text,
    Date,
    Number,
    Options,
    Email,
    Phone,
    Url,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentOption {
    pub label: String,
}

/// A derived field requested for every result item, e.g. inferred seniority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentSpec {
    pub description: String,
    #[serde(default)]
    pub format: EnrichmentFormat,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<EnrichmentOption>,
}

/// One page of items as returned by the upstream list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ItemsPage {
    pub data: Vec<ResultItem>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}
