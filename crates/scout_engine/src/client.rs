use std::time::Duration;

use scout_core::{EnrichmentSpec, ItemsPage, JobId, PageRequest, SearchJob, SearchRequest};
use scout_logging::scout_debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::{ApiError, FailureKind};

pub const DEFAULT_BASE_URL: &str = "https://api.exa.ai";
const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub api_key: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// The four webset operations the poller and the routing layer depend on.
#[async_trait::async_trait]
pub trait WebsetsApi: Send + Sync {
    async fn create_webset(&self, request: &SearchRequest) -> Result<SearchJob, ApiError>;

    async fn get_webset(&self, id: &JobId) -> Result<SearchJob, ApiError>;

    async fn list_items(&self, id: &JobId, page: &PageRequest) -> Result<ItemsPage, ApiError>;

    async fn cancel_webset(&self, id: &JobId) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestWebsetsClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl ReqwestWebsetsClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let base_url = Url::parse(&settings.base_url).map_err(|err| {
            ApiError::new(
                FailureKind::Validation,
                format!("invalid base url {}: {err}", settings.base_url),
            )
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::Validation,
                format!("base url {} cannot carry a path", settings.base_url),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Unknown, err.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key: settings.api_key,
        })
    }

    fn endpoint(&self, tail: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `cannot_be_a_base` was rejected in `new`, so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["websets", "v0", "websets"])
                .extend(tail);
        }
        url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| status.to_string());
        Err(ApiError::from_status(status.as_u16(), message))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        response.json::<T>().await.map_err(|err| {
            if err.is_decode() {
                ApiError::new(FailureKind::Unknown, format!("invalid response body: {err}"))
            } else {
                map_reqwest_error(err)
            }
        })
    }
}

#[async_trait::async_trait]
impl WebsetsApi for ReqwestWebsetsClient {
    async fn create_webset(&self, request: &SearchRequest) -> Result<SearchJob, ApiError> {
        let body = CreateWebsetBody {
            search: SearchBody {
                query: request.query(),
                count: request.count(),
                criteria: request
                    .criteria()
                    .iter()
                    .map(|description| CriterionBody {
                        description: description.as_str(),
                    })
                    .collect(),
            },
            enrichments: request.enrichments(),
        };
        scout_debug!(
            "POST webset count={} criteria={} enrichments={}",
            request.count(),
            request.criteria().len(),
            request.enrichments().len()
        );
        self.send_json(self.client.post(self.endpoint(&[])).json(&body))
            .await
    }

    async fn get_webset(&self, id: &JobId) -> Result<SearchJob, ApiError> {
        scout_debug!("GET webset {}", id);
        self.send_json(self.client.get(self.endpoint(&[id.as_str()])))
            .await
    }

    async fn list_items(&self, id: &JobId, page: &PageRequest) -> Result<ItemsPage, ApiError> {
        let mut url = self.endpoint(&[id.as_str(), "items"]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &page.limit.to_string());
            if let Some(cursor) = page.cursor.as_deref() {
                query.append_pair("cursor", cursor);
            }
        }
        scout_debug!("GET items {} limit={}", id, page.limit);
        self.send_json(self.client.get(url)).await
    }

    async fn cancel_webset(&self, id: &JobId) -> Result<(), ApiError> {
        scout_debug!("POST cancel {}", id);
        self.send(self.client.post(self.endpoint(&[id.as_str(), "cancel"])))
            .await
            .map(|_| ())
    }
}

#[derive(Serialize)]
struct CreateWebsetBody<'a> {
    search: SearchBody<'a>,
    enrichments: &'a [EnrichmentSpec],
}

#[derive(Serialize)]
struct SearchBody<'a> {
    query: &'a str,
    count: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    criteria: Vec<CriterionBody<'a>>,
}

#[derive(Serialize)]
struct CriterionBody<'a> {
    description: &'a str,
}

/// Pulls a human readable message out of an upstream error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(ToOwned::to_owned)
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(
        FailureKind::Upstream {
            status: err.status().map(|status| status.as_u16()),
        },
        err.to_string(),
    )
}
