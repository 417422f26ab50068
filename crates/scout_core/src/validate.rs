use serde::Serialize;
use thiserror::Error;

use crate::model::{EnrichmentFormat, EnrichmentSpec, JobId};

pub const MAX_QUERY_CHARS: usize = 5000;
pub const MIN_RESULT_COUNT: u32 = 1;
pub const MAX_RESULT_COUNT: u32 = 100;
pub const MAX_CRITERIA: usize = 10;
pub const MAX_ENRICHMENTS: usize = 5;
pub const MAX_ENRICHMENT_OPTIONS: usize = 20;
pub const MAX_JOB_ID_LEN: usize = 128;
/// Fixed page size used for item fetches; also the upper bound for callers.
pub const ITEMS_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("query must not be empty")]
    EmptyQuery,
    #[error("query exceeds {max} characters")]
    QueryTooLong { max: usize },
    #[error("count must be between {min} and {max}, got {actual}")]
    CountOutOfRange { min: u32, max: u32, actual: i64 },
    #[error("at most {max} criteria are allowed, got {actual}")]
    TooManyCriteria { max: usize, actual: usize },
    #[error("criterion {index} must not be empty")]
    EmptyCriterion { index: usize },
    #[error("at most {max} enrichments are allowed, got {actual}")]
    TooManyEnrichments { max: usize, actual: usize },
    #[error("enrichment {index} has an empty description")]
    EmptyEnrichmentDescription { index: usize },
    #[error("enrichment {index}: {reason}")]
    InvalidEnrichmentOptions { index: usize, reason: String },
    #[error("job id must not be empty")]
    EmptyJobId,
    #[error("job id is malformed: {reason}")]
    MalformedJobId { reason: String },
    #[error("limit must be between 1 and {max}, got {actual}")]
    LimitOutOfRange { max: u32, actual: i64 },
    #[error("cursor must not be empty when present")]
    EmptyCursor,
}

impl ValidationError {
    /// Name of the request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyQuery | ValidationError::QueryTooLong { .. } => "query",
            ValidationError::CountOutOfRange { .. } => "count",
            ValidationError::TooManyCriteria { .. } | ValidationError::EmptyCriterion { .. } => {
                "criteria"
            }
            ValidationError::TooManyEnrichments { .. }
            | ValidationError::EmptyEnrichmentDescription { .. }
            | ValidationError::InvalidEnrichmentOptions { .. } => "enrichments",
            ValidationError::EmptyJobId | ValidationError::MalformedJobId { .. } => "id",
            ValidationError::LimitOutOfRange { .. } => "limit",
            ValidationError::EmptyCursor => "cursor",
        }
    }
}

/// A search request that passed validation. Only constructible via [`SearchRequest::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    query: String,
    count: u32,
    criteria: Vec<String>,
    enrichments: Vec<EnrichmentSpec>,
}

impl SearchRequest {
    /// `count` is taken as a signed integer so that out-of-range values coming
    /// from loosely typed inputs are reported instead of wrapped.
    pub fn new(
        query: &str,
        count: i64,
        criteria: Vec<String>,
        enrichments: Vec<EnrichmentSpec>,
    ) -> Result<Self, ValidationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        if query.chars().count() > MAX_QUERY_CHARS {
            return Err(ValidationError::QueryTooLong {
                max: MAX_QUERY_CHARS,
            });
        }

        let count = u32::try_from(count)
            .ok()
            .filter(|value| (MIN_RESULT_COUNT..=MAX_RESULT_COUNT).contains(value))
            .ok_or(ValidationError::CountOutOfRange {
                min: MIN_RESULT_COUNT,
                max: MAX_RESULT_COUNT,
                actual: count,
            })?;

        if criteria.len() > MAX_CRITERIA {
            return Err(ValidationError::TooManyCriteria {
                max: MAX_CRITERIA,
                actual: criteria.len(),
            });
        }
        let criteria = criteria
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    Err(ValidationError::EmptyCriterion { index })
                } else {
                    Ok(trimmed.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        if enrichments.len() > MAX_ENRICHMENTS {
            return Err(ValidationError::TooManyEnrichments {
                max: MAX_ENRICHMENTS,
                actual: enrichments.len(),
            });
        }
        let enrichments = enrichments
            .into_iter()
            .enumerate()
            .map(|(index, spec)| validate_enrichment(index, spec))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            query: query.to_string(),
            count,
            criteria,
            enrichments,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn criteria(&self) -> &[String] {
        &self.criteria
    }

    pub fn enrichments(&self) -> &[EnrichmentSpec] {
        &self.enrichments
    }
}

fn validate_enrichment(index: usize, spec: EnrichmentSpec) -> Result<EnrichmentSpec, ValidationError> {
    let description = spec.description.trim();
    if description.is_empty() {
        return Err(ValidationError::EmptyEnrichmentDescription { index });
    }

    let invalid = |reason: &str| ValidationError::InvalidEnrichmentOptions {
        index,
        reason: reason.to_string(),
    };
    match spec.format {
        EnrichmentFormat::Options => {
            if spec.options.is_empty() {
                return Err(invalid("options format requires at least one option"));
            }
            if spec.options.len() > MAX_ENRICHMENT_OPTIONS {
                return Err(invalid("too many options"));
            }
            if spec.options.iter().any(|option| option.label.trim().is_empty()) {
                return Err(invalid("option labels must not be empty"));
            }
        }
        _ if !spec.options.is_empty() => {
            return Err(invalid("options are only allowed with the options format"));
        }
        _ => {}
    }

    Ok(EnrichmentSpec {
        description: description.to_string(),
        ..spec
    })
}

/// Validates a caller-supplied webset id.
pub fn validate_job_id(raw: &str) -> Result<JobId, ValidationError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(ValidationError::EmptyJobId);
    }
    if id.len() > MAX_JOB_ID_LEN {
        return Err(ValidationError::MalformedJobId {
            reason: format!("longer than {MAX_JOB_ID_LEN} characters"),
        });
    }
    if let Some(bad) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(ValidationError::MalformedJobId {
            reason: format!("unexpected character {bad:?}"),
        });
    }
    Ok(JobId::from_upstream(id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: ITEMS_PAGE_SIZE,
            cursor: None,
        }
    }
}

impl PageRequest {
    pub fn new(limit: Option<i64>, cursor: Option<String>) -> Result<Self, ValidationError> {
        let limit = match limit {
            None => ITEMS_PAGE_SIZE,
            Some(raw) => u32::try_from(raw)
                .ok()
                .filter(|value| (1..=ITEMS_PAGE_SIZE).contains(value))
                .ok_or(ValidationError::LimitOutOfRange {
                    max: ITEMS_PAGE_SIZE,
                    actual: raw,
                })?,
        };
        if cursor.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(ValidationError::EmptyCursor);
        }
        Ok(Self { limit, cursor })
    }

    pub fn first(limit: u32) -> Self {
        Self {
            limit,
            cursor: None,
        }
    }
}
