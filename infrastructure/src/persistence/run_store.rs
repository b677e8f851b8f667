//! Run-directory persistence.
//!
//! Each saved run gets its own directory under the data dir:
//!
//! ```text
//! <data_dir>/<run-id>/
//!   result.json    pretty-printed ConsensusResult
//!   prompt.txt     the prompt as sent
//!   consensus.md   the consensus text
//! ```
//!
//! Only `result.json` is essential. The two convenience files are written
//! best-effort.

use chrono::{DateTime, Local};
use consensus_domain::ConsensusResult;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const RESULT_FILE: &str = "result.json";
pub const PROMPT_FILE: &str = "prompt.txt";
pub const CONSENSUS_FILE: &str = "consensus.md";

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("creating run directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("writing {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("encoding result: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Run identifier: local timestamp plus a random suffix, e.g. `20260112-143052-a1b2c3`.
pub fn generate_run_id() -> String {
    run_id_at(Local::now())
}

fn run_id_at(now: DateTime<Local>) -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", now.format("%Y%m%d-%H%M%S"), &random[..6])
}

/// Write `result` as pretty JSON (with a trailing newline) to `path`.
pub fn write_result_json(path: &Path, result: &ConsensusResult) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(result)?;
    let write = || -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")
    };
    write().map_err(|source| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Saves runs into per-run directories under a data directory
#[derive(Debug, Clone)]
pub struct RunDirectoryStore {
    data_dir: PathBuf,
}

impl RunDirectoryStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Save under a fresh run id; returns the run directory.
    pub fn save(&self, result: &ConsensusResult) -> Result<PathBuf, PersistenceError> {
        self.save_as(&generate_run_id(), result)
    }

    /// Save under an explicit run id; returns the run directory.
    pub fn save_as(&self, run_id: &str, result: &ConsensusResult) -> Result<PathBuf, PersistenceError> {
        let run_dir = self.data_dir.join(run_id);
        fs::create_dir_all(&run_dir).map_err(|source| PersistenceError::CreateDir {
            path: run_dir.clone(),
            source,
        })?;

        write_result_json(&run_dir.join(RESULT_FILE), result)?;

        for (name, contents) in [
            (PROMPT_FILE, result.prompt.as_str()),
            (CONSENSUS_FILE, result.consensus.as_str()),
        ] {
            let path = run_dir.join(name);
            if let Err(e) = fs::write(&path, contents) {
                warn!("Failed to save {}: {}", path.display(), e);
            }
        }

        info!("Run saved to {}", run_dir.display());
        Ok(run_dir)
    }
}
