mod cli;
mod platform;
mod server;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use scout_core::{Phase, PollSettings, PollView, SearchRequest};
use scout_engine::{ClientSettings, ReqwestWebsetsClient, SearchPoller, WebsetsApi};
use scout_logging::{scout_info, scout_warn};

use cli::{Cli, Command, GlobalArgs};
use platform::observer::ConsoleObserver;
use platform::persistence::{load_last_search, resolve_resume_target};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = scout_logging::level_from_verbosity(cli.global.verbose, cli.global.quiet);
    platform::logging::initialize(cli.global.log, level, &cli.global.state_dir);
    scout_info!("scout {} starting", env!("CARGO_PKG_VERSION"));

    let api = build_client(&cli.global)?;

    match cli.command {
        Command::Search {
            query,
            count,
            criteria,
            enrichments,
        } => {
            let request = SearchRequest::new(&query, count, criteria, enrichments)?;
            let observer = ConsoleObserver::new(cli.global.state_dir.clone(), request.query());
            let poller = SearchPoller::new(api, poll_settings(&cli.global), Arc::new(observer));
            poller.start_search(request);
            drive(&poller).await
        }
        Command::Resume { id } => {
            let state_dir = &cli.global.state_dir;
            let job_id = resolve_resume_target(id.as_deref(), state_dir)?;
            let observer = ConsoleObserver::new(state_dir.clone(), remembered_query(state_dir));
            let poller = SearchPoller::new(api, poll_settings(&cli.global), Arc::new(observer));
            println!("Resuming search {job_id}");
            poller.resume_search(job_id);
            drive(&poller).await
        }
        Command::Serve { listen } => server::serve(listen, api).await,
    }
}

fn build_client(global: &GlobalArgs) -> anyhow::Result<Arc<dyn WebsetsApi>> {
    let api_key = global
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .context("missing API key: pass --api-key or set WEBSETS_API_KEY")?;
    let client = ReqwestWebsetsClient::new(ClientSettings {
        base_url: global.base_url.clone(),
        api_key,
        ..ClientSettings::default()
    })?;
    Ok(Arc::new(client))
}

fn poll_settings(global: &GlobalArgs) -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(global.poll_interval_ms),
        ..PollSettings::default()
    }
}

fn remembered_query(state_dir: &Path) -> String {
    load_last_search(state_dir)
        .map(|last| last.query)
        .unwrap_or_default()
}

/// Wait for the poller to settle, printing progress along the way.
async fn drive(poller: &SearchPoller) -> anyhow::Result<()> {
    let mut views = poller.subscribe();
    let mut last_found = None;

    loop {
        let view = views.borrow_and_update().clone();
        if view.is_searching && last_found != Some(view.progress.found) {
            last_found = Some(view.progress.found);
            println!(
                "  {} ({}): {} found, {:.0}% complete",
                view.job_id.as_ref().map(|id| id.as_str()).unwrap_or("pending"),
                view.progress.run_status,
                view.progress.found,
                view.progress.completion
            );
        }
        if is_settled(&view) {
            return outcome(&view);
        }

        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    bail!("poller shut down unexpectedly");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                scout_warn!("interrupted, canceling search");
                poller.cancel_search();
                bail!("search canceled");
            }
        }
    }
}

fn is_settled(view: &PollView) -> bool {
    view.phase != Phase::Idle && !view.is_searching && !view.is_fetching_items
}

fn outcome(view: &PollView) -> anyhow::Result<()> {
    match view.phase {
        Phase::Completed => Ok(()),
        Phase::Failed | Phase::Canceled | Phase::Error => bail!(
            "search ended in {:?}: {}",
            view.phase,
            view.error.as_deref().unwrap_or("no details")
        ),
        _ => Ok(()),
    }
}
