//! HTTP routing layer: validates requests and forwards them to the Websets client.

mod error;
mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use scout_engine::WebsetsApi;
use scout_logging::scout_info;
use tokio::net::TcpListener;

pub fn create_router(api: Arc<dyn WebsetsApi>) -> Router {
    let routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/websets", post(handlers::create_search))
        .route("/websets/:id", get(handlers::get_search))
        .route("/websets/:id/items", get(handlers::list_items))
        .route("/websets/:id/cancel", post(handlers::cancel_search))
        .with_state(api);

    Router::new().nest("/api", routes)
}

pub async fn serve(listen: SocketAddr, api: Arc<dyn WebsetsApi>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind to {listen}"))?;
    scout_info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(api))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            scout_info!("shutdown requested");
        })
        .await
        .context("http server failed")
}
