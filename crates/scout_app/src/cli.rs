use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use scout_core::{EnrichmentFormat, EnrichmentOption, EnrichmentSpec};
use scout_engine::DEFAULT_BASE_URL;

use crate::platform::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "scout", version, about = "Candidate search over the Websets API")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Websets API key.
    #[arg(long, env = "WEBSETS_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "WEBSETS_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Delay between status polls.
    #[arg(long, env = "SCOUT_POLL_INTERVAL_MS", default_value_t = 2000, global = true)]
    pub poll_interval_ms: u64,

    /// Directory holding the log file and the last-search record.
    #[arg(long, env = "SCOUT_STATE_DIR", default_value = ".", global = true)]
    pub state_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = LogDestination::Terminal, global = true)]
    pub log: LogDestination,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a search and poll it until it settles.
    Search {
        query: String,

        #[arg(long, default_value_t = 20)]
        count: i64,

        /// Criterion every candidate must satisfy (repeatable).
        #[arg(long = "criterion")]
        criteria: Vec<String>,

        /// Derived field as `[format:]description[=opt1|opt2]` (repeatable).
        #[arg(long = "enrichment", value_parser = parse_enrichment)]
        enrichments: Vec<EnrichmentSpec>,
    },
    /// Resume polling a search created earlier. Defaults to the last one.
    Resume { id: Option<String> },
    /// Serve the HTTP routes.
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: SocketAddr,
    },
}

fn format_from_prefix(prefix: &str) -> Option<EnrichmentFormat> {
    let format = match prefix.trim().to_ascii_lowercase().as_str() {
        "text" => EnrichmentFormat::Text,
        "date" => EnrichmentFormat::Date,
        "number" => EnrichmentFormat::Number,
        "options" => EnrichmentFormat::Options,
        "email" => EnrichmentFormat::Email,
        "phone" => EnrichmentFormat::Phone,
        "url" => EnrichmentFormat::Url,
        _ => return None,
    };
    Some(format)
}

/// A prefix that is not a known format is kept as part of the description.
pub fn parse_enrichment(raw: &str) -> Result<EnrichmentSpec, String> {
    let (format, rest) = match raw.split_once(':') {
        Some((prefix, rest)) => match format_from_prefix(prefix) {
            Some(format) => (format, rest),
            None => (EnrichmentFormat::Text, raw),
        },
        None => (EnrichmentFormat::Text, raw),
    };

    let (description, options) = match (format, rest.split_once('=')) {
        (EnrichmentFormat::Options, Some((description, options))) => {
            let options = options
                .split('|')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(|label| EnrichmentOption {
                    label: label.to_string(),
                })
                .collect();
            (description, options)
        }
        (EnrichmentFormat::Options, None) => {
            return Err("options enrichment needs `=opt1|opt2`".to_string());
        }
        _ => (rest, Vec::new()),
    };

    let description = description.trim();
    if description.is_empty() {
        return Err("enrichment description is empty".to_string());
    }

    Ok(EnrichmentSpec {
        description: description.to_string(),
        format,
        options,
    })
}
