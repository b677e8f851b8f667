//! Prompt source resolution
//!
//! Positional words win, then `--file`, then piped stdin.

use std::io::{self, BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("reading prompt file {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("reading stdin: {0}")]
    Stdin(#[source] io::Error),

    #[error("no prompt provided: use positional argument, --file, or pipe to stdin")]
    Missing,
}

/// Resolve the prompt from the three possible sources.
///
/// `stdin` is only consulted when it is not a terminal; pass `None` for an
/// interactive stdin.
pub fn resolve_prompt<R: BufRead>(
    words: &[String],
    file: Option<&Path>,
    stdin: Option<R>,
) -> Result<String, PromptError> {
    if !words.is_empty() {
        return Ok(words.join(" "));
    }

    if let Some(path) = file {
        let contents = std::fs::read_to_string(path).map_err(|source| PromptError::File {
            path: path.to_path_buf(),
            source,
        })?;
        return Ok(contents.trim().to_string());
    }

    if let Some(reader) = stdin {
        let lines = reader
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .map_err(PromptError::Stdin)?;
        return Ok(lines.join("\n"));
    }

    Err(PromptError::Missing)
}

/// [`resolve_prompt`] against the process stdin.
pub fn read_prompt(words: &[String], file: Option<&Path>) -> Result<String, PromptError> {
    let stdin = io::stdin();
    let piped = (!stdin.is_terminal()).then(|| stdin.lock());
    resolve_prompt(words, file, piped)
}
