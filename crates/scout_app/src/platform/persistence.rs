use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use scout_core::{validate_job_id, JobId};
use scout_logging::{scout_info, scout_warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

const STATE_FILENAME: &str = ".scout_state.ron";

/// The most recently created search, kept so it can be resumed after a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastSearch {
    pub job_id: String,
    pub query: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedState {
    last_search: Option<LastSearch>,
}

pub fn load_last_search(state_dir: &Path) -> Option<LastSearch> {
    let path = state_dir.join(STATE_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
        Err(err) => {
            scout_warn!("Failed to read persisted state from {:?}: {}", path, err);
            return None;
        }
    };

    match ron::from_str::<PersistedState>(&content) {
        Ok(state) => state.last_search,
        Err(err) => {
            scout_warn!("Failed to parse persisted state from {:?}: {}", path, err);
            None
        }
    }
}

/// Resolves the job to resume: an explicit id wins over the persisted one.
pub fn resolve_resume_target(explicit: Option<&str>, state_dir: &Path) -> anyhow::Result<JobId> {
    let raw = match explicit {
        Some(id) => id.to_string(),
        None => {
            load_last_search(state_dir)
                .context("no job id given and no previous search recorded")?
                .job_id
        }
    };
    validate_job_id(&raw).with_context(|| format!("cannot resume {raw:?}"))
}

/// Atomically replaces the state file by writing a temp file then renaming.
pub fn save_last_search(state_dir: &Path, last: &LastSearch) -> anyhow::Result<()> {
    fs::create_dir_all(state_dir)
        .with_context(|| format!("creating state directory {state_dir:?}"))?;

    let state = PersistedState {
        last_search: Some(last.clone()),
    };
    let content = ron::ser::to_string_pretty(&state, ron::ser::PrettyConfig::new())
        .context("serializing persisted state")?;

    let target = state_dir.join(STATE_FILENAME);
    let mut tmp = NamedTempFile::new_in(state_dir).context("creating temp state file")?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(&target)
        .map_err(|err| err.error)
        .with_context(|| format!("writing {target:?}"))?;

    scout_info!("Recorded search {} in {:?}", last.job_id, target);
    Ok(())
}
