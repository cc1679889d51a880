//! Trading bot process supervisor
//!
//! Owns at most one child process. All transitions happen under one async
//! mutex, which is what keeps concurrent start/stop requests from ever
//! tracking two bots.
//!
//! State machine: STOPPED -> STARTING -> RUNNING -> STOPPED. STARTING is the
//! window where `start` holds the lock across the spawn; nobody else can see
//! it. A bot leaves RUNNING on explicit stop, when the output watcher reaps
//! it, or when `status` finds it gone.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

/// How long the watcher keeps polling for an exit status after the bot's
/// output streams close
const REAP_ATTEMPTS: u32 = 20;
const REAP_INTERVAL_MS: u64 = 100;

/// Supervisor errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Bot is already running")]
    AlreadyRunning,

    #[error("Bot is not running")]
    NotRunning,

    #[error("Failed to start bot: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to stop bot: {0}")]
    Signal(#[source] io::Error),
}

/// Externally visible run state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotStatus {
    pub is_running: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub pid: Option<u32>,
}

impl BotStatus {
    fn stopped() -> Self {
        Self {
            is_running: false,
            start_time: None,
            pid: None,
        }
    }
}

struct RunningBot {
    run_id: u64,
    pid: u32,
    started_at: DateTime<Utc>,
    child: Child,
}

#[derive(Default)]
struct SupervisorState {
    current: Option<RunningBot>,
}

impl SupervisorState {
    /// Probe the OS for the tracked child and drop it if it has exited
    fn reconcile(&mut self) {
        let Some(run) = self.current.as_mut() else {
            return;
        };

        let pid = run.pid;
        match run.child.try_wait() {
            Ok(None) => {}
            Ok(Some(exit)) => {
                warn!("Bot process {} is gone ({}), marking stopped", pid, describe_exit(exit));
                self.current = None;
            }
            Err(e) => {
                warn!("Bot process {} could not be probed ({}), marking stopped", pid, e);
                self.current = None;
            }
        }
    }

    fn snapshot(&self) -> BotStatus {
        match &self.current {
            Some(run) => BotStatus {
                is_running: true,
                start_time: Some(run.started_at),
                pid: Some(run.pid),
            },
            None => BotStatus::stopped(),
        }
    }
}

/// Supervises the single external trading bot process
pub struct BotSupervisor {
    bot_dir: PathBuf,
    state: Arc<Mutex<SupervisorState>>,
    next_run_id: AtomicU64,
}

impl BotSupervisor {
    pub fn new(bot_dir: impl Into<PathBuf>) -> Self {
        Self {
            bot_dir: bot_dir.into(),
            state: Arc::new(Mutex::new(SupervisorState::default())),
            next_run_id: AtomicU64::new(1),
        }
    }

    /// Launch `interpreter path` in the bot directory.
    ///
    /// Fails with [`BotError::AlreadyRunning`] while a live bot is tracked.
    pub async fn start(&self, path: &str, interpreter: &str) -> Result<BotStatus, BotError> {
        let mut state = self.state.lock().await;
        state.reconcile();
        if state.current.is_some() {
            return Err(BotError::AlreadyRunning);
        }

        let command = format!("{} {}", interpreter, path);
        info!("Starting bot: {} (cwd {})", command, self.bot_dir.display());

        let mut child = Command::new(interpreter)
            .arg(path)
            .current_dir(&self.bot_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| {
                error!("Error starting bot `{}`: {}", command, source);
                BotError::SpawnFailed {
                    command: command.clone(),
                    source,
                }
            })?;

        let Some(pid) = child.id() else {
            return Err(BotError::SpawnFailed {
                command,
                source: io::Error::new(io::ErrorKind::Other, "process exited before reporting a pid"),
            });
        };

        let run_id = self.next_run_id.fetch_add(1, Ordering::Relaxed);
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        state.current = Some(RunningBot {
            run_id,
            pid,
            started_at: Utc::now(),
            child,
        });
        let status = state.snapshot();
        drop(state);

        let watched = Arc::clone(&self.state);
        tokio::spawn(async move {
            tokio::join!(relay_output(stdout, pid, false), relay_output(stderr, pid, true));
            reap(&watched, run_id).await;
        });

        info!("Bot started with pid {}", pid);
        Ok(status)
    }

    /// Signal the bot to terminate and forget it.
    ///
    /// Does not wait for the process to actually exit.
    pub async fn stop(&self) -> Result<BotStatus, BotError> {
        let mut state = self.state.lock().await;
        state.reconcile();

        let Some(mut run) = state.current.take() else {
            return Err(BotError::NotRunning);
        };

        if let Err(e) = terminate(&mut run.child, run.pid).await {
            error!("Error stopping bot {}: {}", run.pid, e);
            state.current = Some(run);
            return Err(BotError::Signal(e));
        }

        info!("Sent termination to bot {}", run.pid);
        Ok(BotStatus::stopped())
    }

    /// Current state, re-verified against the OS on every call
    pub async fn status(&self) -> BotStatus {
        let mut state = self.state.lock().await;
        state.reconcile();
        state.snapshot()
    }
}

/// Log each line of one of the bot's output streams until it closes
async fn relay_output<R>(stream: Option<R>, pid: u32, is_stderr: bool)
where
    R: AsyncRead + Unpin,
{
    let Some(stream) = stream else {
        return;
    };

    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if is_stderr => warn!(target: "bot", pid, "{}", line),
            Ok(Some(line)) => info!(target: "bot", pid, "{}", line),
            Ok(None) => break,
            Err(e) => {
                debug!("Bot {} output stream error: {}", pid, e);
                break;
            }
        }
    }
}

/// Exit callback: collect the exit status of run `run_id` once its output
/// has closed. Leaves later runs alone.
async fn reap(state: &Mutex<SupervisorState>, run_id: u64) {
    for _ in 0..REAP_ATTEMPTS {
        {
            let mut state = state.lock().await;
            let Some(run) = state.current.as_mut().filter(|r| r.run_id == run_id) else {
                return;
            };

            let pid = run.pid;
            match run.child.try_wait() {
                Ok(Some(exit)) => {
                    info!("Bot process {} exited with {}", pid, describe_exit(exit));
                    state.current = None;
                    return;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Failed to collect bot {} exit status: {}", pid, e);
                    state.current = None;
                    return;
                }
            }
        }
        sleep(Duration::from_millis(REAP_INTERVAL_MS)).await;
    }

    debug!("Bot run {} closed its output but is still alive", run_id);
}

fn describe_exit(exit: ExitStatus) -> String {
    match exit.code() {
        Some(code) => format!("code {}", code),
        None => exit.to_string(),
    }
}

/// Forceful tree kill on Windows
#[cfg(windows)]
async fn terminate(child: &mut Child, pid: u32) -> io::Result<()> {
    let pid = pid.to_string();
    let result = Command::new("taskkill")
        .args(["/pid", pid.as_str(), "/f", "/t"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    finish_signal(child, result)
}

/// Graceful SIGTERM elsewhere
#[cfg(not(windows))]
async fn terminate(child: &mut Child, pid: u32) -> io::Result<()> {
    let result = Command::new("kill")
        .arg("-TERM")
        .arg(pid.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    finish_signal(child, result)
}

/// Falls back to a hard kill when the signalling tool itself is missing
fn finish_signal(child: &mut Child, result: io::Result<ExitStatus>) -> io::Result<()> {
    match result {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(io::Error::new(
            io::ErrorKind::Other,
            format!("signal command exited with {}", status),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => child.start_kill(),
        Err(e) => Err(e),
    }
}
