use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use scout_core::{validate_job_id, ItemsPage, PageRequest, SearchJob, SearchRequest};
use scout_engine::WebsetsApi;
use scout_logging::scout_debug;

use super::error::RouteError;
use super::types::{CancelResponse, CreateSearchBody, HealthResponse, ItemsQuery};

pub type ApiState = Arc<dyn WebsetsApi>;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Validate the search and create a webset upstream.
pub async fn create_search(
    State(api): State<ApiState>,
    payload: Result<Json<CreateSearchBody>, JsonRejection>,
) -> Result<(StatusCode, Json<SearchJob>), RouteError> {
    let Json(body) = payload?;
    let request = SearchRequest::new(&body.query, body.count, body.criteria, body.enrichments)?;
    scout_debug!("HTTP create search count={}", request.count());

    let job = api.create_webset(&request).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn get_search(
    State(api): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<SearchJob>, RouteError> {
    let id = validate_job_id(&id)?;
    Ok(Json(api.get_webset(&id).await?))
}

pub async fn list_items(
    State(api): State<ApiState>,
    Path(id): Path<String>,
    query: Result<Query<ItemsQuery>, QueryRejection>,
) -> Result<Json<ItemsPage>, RouteError> {
    let id = validate_job_id(&id)?;
    let Query(query) = query?;
    let page = PageRequest::new(query.limit, query.cursor)?;
    Ok(Json(api.list_items(&id, &page).await?))
}

pub async fn cancel_search(
    State(api): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<CancelResponse>, RouteError> {
    let id = validate_job_id(&id)?;
    api.cancel_webset(&id).await?;
    Ok(Json(CancelResponse { canceled: true }))
}
