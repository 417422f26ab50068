//! Scout engine: Websets HTTP client and the effect runner behind the poller.
mod client;
mod poller;
mod types;

pub use client::{ClientSettings, ReqwestWebsetsClient, WebsetsApi, DEFAULT_BASE_URL};
pub use poller::{NoopObserver, SearchObserver, SearchPoller};
pub use types::{ApiError, FailureKind};
