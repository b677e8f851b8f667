//! Saving consensus runs to disk.

mod run_store;

pub use run_store::{
    CONSENSUS_FILE, PROMPT_FILE, PersistenceError, RESULT_FILE, RunDirectoryStore,
    generate_run_id, write_result_json,
};
