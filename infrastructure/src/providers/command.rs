//! Subprocess-backed provider
//!
//! Spawns a configured program per query, writes the prompt to its stdin and
//! treats stdout as the answer. Stdout is relayed line by line as it is read,
//! so any CLI that prints while it generates streams for free.
//!
//! The child is spawned with `kill_on_drop`, so when the runner abandons the
//! query (timeout or cancellation) the process is killed with it.

use async_trait::async_trait;
use consensus_application::ports::provider::{ChunkCallback, Provider, ProviderError};
use consensus_domain::{ModelResponse, QueryRequest};
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::debug;

/// Environment variable carrying the requested model id into the child.
pub const MODEL_ENV_VAR: &str = "LLM_CONSENSUS_MODEL";

/// Longest stderr excerpt carried into an error message.
const MAX_STDERR_CHARS: usize = 500;

/// Provider that answers by running an external command
#[derive(Debug, Clone)]
pub struct CommandProvider {
    name: String,
    program: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
}

impl CommandProvider {
    /// Build from an argv. The first element is the program.
    ///
    /// The provider name defaults to the program's file name.
    pub fn new(argv: Vec<String>) -> Result<Self, ProviderError> {
        let mut argv = argv.into_iter();
        let program = argv
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ProviderError::Process("empty command".to_string()))?;
        let name = Path::new(&program)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.clone());

        Ok(Self {
            name,
            program,
            args: argv.collect(),
            env: BTreeMap::new(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn execute(
        &self,
        request: &QueryRequest,
        on_chunk: &ChunkCallback<'_>,
    ) -> Result<ModelResponse, ProviderError> {
        let started = Instant::now();
        debug!("Spawning {} for model {}", self.program, request.model);

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(&self.env)
            .env(MODEL_ENV_VAR, &request.model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // kill_on_drop needs our destructors to run; this also covers
        // SIGKILL and OOM kills of the parent.
        #[cfg(target_os = "linux")]
        unsafe {
            command.pre_exec(terminate_with_parent);
        }

        let mut child = command
            .spawn()
            .map_err(|e| ProviderError::Process(format!("failed to spawn {}: {}", self.program, e)))?;

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ProviderError::Process("stdout not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ProviderError::Process("stderr not captured".to_string()))?;

        // All three pipes are driven together so a chatty child never
        // blocks on a full pipe while we wait on another one.
        let write_prompt = async {
            if let Some(mut stdin) = stdin {
                stdin.write_all(request.prompt.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            Ok::<_, io::Error>(())
        };

        let read_output = async {
            let mut reader = BufReader::new(stdout);
            let mut content = String::new();
            let mut line = Vec::new();
            loop {
                line.clear();
                if reader.read_until(b'\n', &mut line).await? == 0 {
                    break;
                }
                // A stray invalid byte must not cost the whole answer.
                let text = String::from_utf8_lossy(&line);
                on_chunk(&text);
                content.push_str(&text);
            }
            Ok::<_, io::Error>(content)
        };

        let read_errors = async {
            let mut buf = Vec::new();
            let mut stderr = stderr;
            stderr.read_to_end(&mut buf).await.map(|_| buf)
        };

        let (written, content, errors) = tokio::join!(write_prompt, read_output, read_errors);

        if let Err(e) = written {
            // Programs that ignore stdin may exit before reading it.
            debug!("Could not write prompt to {}: {}", self.program, e);
        }

        let status = child
            .wait()
            .await
            .map_err(|e| ProviderError::Process(format!("waiting for {}: {}", self.program, e)))?;

        let stderr_text = errors
            .map(|buf| String::from_utf8_lossy(&buf).trim().to_string())
            .unwrap_or_default();

        if !status.success() {
            return Err(ProviderError::Process(describe_failure(
                &self.program,
                &status.to_string(),
                &stderr_text,
            )));
        }

        let content = content.map_err(|e| {
            ProviderError::Parse(format!("reading output of {}: {}", self.program, e))
        })?;

        Ok(ModelResponse::new(request.model.clone(), content, self.name.clone())
            .with_latency(started.elapsed()))
    }
}

/// Ask the kernel to send SIGTERM to the child when its parent dies.
#[cfg(target_os = "linux")]
fn terminate_with_parent() -> io::Result<()> {
    // Runs between fork and exec: only async-signal-safe calls allowed.
    if unsafe { libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM) } == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn describe_failure(program: &str, status: &str, stderr: &str) -> String {
    if stderr.is_empty() {
        return format!("{} {}", program, status);
    }
    let excerpt: String = stderr.chars().take(MAX_STDERR_CHARS).collect();
    format!("{} {}: {}", program, status, excerpt)
}

#[async_trait]
impl Provider for CommandProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self, request: &QueryRequest) -> Result<ModelResponse, ProviderError> {
        self.execute(request, &|_: &str| {}).await
    }

    async fn query_stream(
        &self,
        request: &QueryRequest,
        on_chunk: &ChunkCallback<'_>,
    ) -> Result<ModelResponse, ProviderError> {
        self.execute(request, on_chunk).await
    }
}
