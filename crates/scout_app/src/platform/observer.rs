use std::path::PathBuf;

use chrono::Utc;
use scout_core::{ItemProperties, ResultItem, SearchJob};
use scout_engine::SearchObserver;
use scout_logging::scout_error;

use super::persistence::{save_last_search, LastSearch};

/// Prints search results to stdout and records new searches for `resume`.
pub struct ConsoleObserver {
    state_dir: PathBuf,
    query: String,
}

impl ConsoleObserver {
    pub fn new(state_dir: PathBuf, query: impl Into<String>) -> Self {
        Self {
            state_dir,
            query: query.into(),
        }
    }
}

impl SearchObserver for ConsoleObserver {
    fn on_created(&self, job: &SearchJob) {
        println!("Search {} created", job.id);
        let last = LastSearch {
            job_id: job.id.to_string(),
            query: self.query.clone(),
            created_at: Utc::now(),
        };
        if let Err(err) = save_last_search(&self.state_dir, &last) {
            scout_error!("Failed to record search {}: {:#}", job.id, err);
        }
    }

    fn on_items_update(&self, items: &[ResultItem]) {
        println!("  {} candidates so far", items.len());
    }

    fn on_complete(&self, job: &SearchJob, items: &[ResultItem]) {
        println!("Search {} completed with {} results", job.id, items.len());
        for line in render_rows(items) {
            println!("{line}");
        }
    }

    fn on_error(&self, message: &str) {
        eprintln!("Search stopped: {message}");
    }
}

/// One text row per item: kind, name, headline and any enrichment values.
pub fn render_rows(items: &[ResultItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| {
            let (kind, headline, url) = match &item.properties {
                ItemProperties::Person { url, person, .. } => {
                    ("person", person.position.clone().unwrap_or_default(), url)
                }
                ItemProperties::Company { url, company, .. } => {
                    ("company", company.industry.clone().unwrap_or_default(), url)
                }
                ItemProperties::ResearchPaper { url, description, .. } => {
                    ("paper", description.clone(), url)
                }
                ItemProperties::Article { url, description, .. } => {
                    ("article", description.clone(), url)
                }
            };
            let mut row = format!("{kind:<8} {:<32} {headline:<32} {url}", item.display_name());
            for (name, value) in &item.enrichments {
                let value = value
                    .as_str()
                    .map(ToOwned::to_owned)
                    .unwrap_or_else(|| value.to_string());
                row.push_str(&format!(" [{name}: {value}]"));
            }
            row
        })
        .collect()
}
