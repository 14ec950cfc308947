//! Attack run orchestration.
//!
//! [`AttackSupervisor`] is the public handle: `start` launches the external
//! tool on a dedicated worker task and hands back the event stream, `stop`
//! requests termination, `is_running` queries the session flag. The child
//! process handle itself never leaves the worker.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::command::CommandLine;

use super::process::{platform_strategy, AttackProcess, SpawnError};
use super::session::{RunSession, SessionState};
use super::{AttackEvent, RunFindings, DEFAULT_EVENT_BUFFER};

/// Error type for supervisor commands.
#[derive(thiserror::Error, Debug)]
pub enum SupervisorError {
    /// At most one session may be active; starting while active is rejected,
    /// not queued.
    #[error("an attack session is already running")]
    AlreadyRunning,
}

#[derive(Debug)]
struct Inner {
    running: AtomicBool,
    /// PID of the live child, 0 when none. Lets `stop` signal the process
    /// group without touching the worker-owned handle.
    child_pid: AtomicU32,
    cancel: Mutex<CancellationToken>,
    findings: Mutex<Option<RunFindings>>,
}

/// Handle for running one external attack process at a time.
///
/// Cheap to clone; all clones share the same session slot.
#[derive(Debug, Clone)]
pub struct AttackSupervisor {
    inner: Arc<Inner>,
}

impl Default for AttackSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl AttackSupervisor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                running: AtomicBool::new(false),
                child_pid: AtomicU32::new(0),
                cancel: Mutex::new(CancellationToken::new()),
                findings: Mutex::new(None),
            }),
        }
    }

    /// Start a session from a prebuilt command line.
    ///
    /// Returns the receiving end of the event stream; the stream always
    /// terminates with exactly one [`AttackEvent::Finished`], including when
    /// the spawn itself fails. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::AlreadyRunning`] if a session is active.
    pub fn start(
        &self,
        command: CommandLine,
    ) -> Result<mpsc::Receiver<AttackEvent>, SupervisorError> {
        let cancel = CancellationToken::new();
        {
            // Slot claim and token swap happen under one lock so a stop
            // racing this start can never cancel a stale token.
            let mut slot = lock(&self.inner.cancel);
            if self
                .inner
                .running
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return Err(SupervisorError::AlreadyRunning);
            }
            *slot = cancel.clone();
        }

        let (tx, rx) = mpsc::channel(DEFAULT_EVENT_BUFFER);
        tracing::info!(preview = %command.preview, "starting attack session");
        tokio::spawn(run_session(Arc::clone(&self.inner), command, cancel, tx));
        Ok(rx)
    }

    /// Request termination of the active session.
    ///
    /// Idempotent: calling with no active session, calling twice, or calling
    /// after `Finished` already fired are all no-ops. Only one stop sequence
    /// is ever in flight per session.
    pub fn stop(&self) {
        let cancel = {
            let slot = lock(&self.inner.cancel);
            if !self.inner.running.load(Ordering::SeqCst) {
                return;
            }
            slot.clone()
        };
        if cancel.is_cancelled() {
            return;
        }
        tracing::info!("stop requested");
        cancel.cancel();

        // Signal the group directly so the child dies even before the read
        // loop observes the cancellation.
        #[cfg(unix)]
        {
            let pid = self.inner.child_pid.load(Ordering::SeqCst);
            if pid != 0 && !super::process::signal_group(pid) {
                tracing::warn!(pid, "group signal from stop failed; worker will escalate");
            }
        }
    }

    /// Whether a session is currently active. False immediately once
    /// `Finished` has been emitted.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Findings of the most recently finished session.
    #[must_use]
    pub fn last_findings(&self) -> Option<RunFindings> {
        lock(&self.inner.findings).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

enum LoopEnd {
    /// The merged output stream reached end of file.
    Eof,
    /// Operator cancellation observed.
    Cancelled,
    /// A stream read failed mid-run.
    ReadError,
}

async fn run_session(
    inner: Arc<Inner>,
    command: CommandLine,
    cancel: CancellationToken,
    tx: mpsc::Sender<AttackEvent>,
) {
    let mut session = RunSession::new(command.preview);
    session.transition(SessionState::Starting);

    let mut process = match AttackProcess::spawn(&command.args) {
        Ok(process) => process,
        Err(err) => {
            let line = match &err {
                SpawnError::NotFound => "HYDRA NOT FOUND: please install THC-Hydra".to_string(),
                other => format!("EXECUTION ERROR: {other}"),
            };
            tracing::error!(error = %err, "spawn failed");
            let _ = tx.send(AttackEvent::OutputLine(line)).await;
            finish(&inner, &mut session, &tx).await;
            return;
        }
    };
    inner
        .child_pid
        .store(process.id().unwrap_or(0), Ordering::SeqCst);

    let Some(output) = process.take_output() else {
        let _ = tx
            .send(AttackEvent::OutputLine(
                "EXECUTION ERROR: process output not available".to_string(),
            ))
            .await;
        let _ = process.start_kill();
        let _ = process.shutdown().await;
        finish(&inner, &mut session, &tx).await;
        return;
    };

    session.transition(SessionState::Running);

    let mut lines = BufReader::new(output).lines();

    let end = loop {
        // Cooperative stop check, once per iteration; the select below also
        // wakes on cancellation so a blocked read cannot delay it.
        if cancel.is_cancelled() {
            break LoopEnd::Cancelled;
        }

        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            line = lines.next_line() => Some(line),
        };

        match next {
            None => break LoopEnd::Cancelled,
            Some(Ok(Some(raw))) => {
                let line = raw.trim_end().to_string();
                if line.is_empty() {
                    continue;
                }
                for event in session.absorb_line(line, Instant::now()) {
                    let _ = tx.send(event).await;
                }
            }
            Some(Ok(None)) => break LoopEnd::Eof,
            Some(Err(err)) => {
                // Drain anything still undelivered first so order is
                // preserved.
                for event in session.flush() {
                    let _ = tx.send(event).await;
                }
                let _ = tx
                    .send(AttackEvent::OutputLine(format!("READ ERROR: {err}")))
                    .await;
                break LoopEnd::ReadError;
            }
        }
    };

    for event in session.flush() {
        let _ = tx.send(event).await;
    }

    match end {
        LoopEnd::Cancelled | LoopEnd::ReadError => {
            session.transition(SessionState::Stopping);
            let strategy = platform_strategy();
            if let Err(err) = strategy.attempt_graceful(&mut process) {
                tracing::error!(error = %err, "termination attempt failed");
            }
            session.transition(SessionState::Finishing);
            // Bounded grace, then forced kill; the handle is released
            // either way.
            let _ = process.shutdown().await;
        }
        LoopEnd::Eof => {
            session.transition(SessionState::Finishing);
            // No timeout here: normal completion is open-ended.
            match process.wait().await {
                Ok(status) => {
                    if !status.success() && !cancel.is_cancelled() {
                        let code = status
                            .code()
                            .map_or_else(|| "signal".to_string(), |c| c.to_string());
                        let _ = tx
                            .send(AttackEvent::OutputLine(format!(
                                "process exited with code: {code}"
                            )))
                            .await;
                    }
                }
                Err(err) => {
                    let _ = tx
                        .send(AttackEvent::OutputLine(format!("EXECUTION ERROR: {err}")))
                        .await;
                }
            }
        }
    }

    finish(&inner, &mut session, &tx).await;
}

/// Publish findings, clear the session slot and emit the terminal event.
/// Every exit path of the worker funnels through here exactly once.
async fn finish(inner: &Inner, session: &mut RunSession, tx: &mpsc::Sender<AttackEvent>) {
    *lock(&inner.findings) = Some(session.findings());
    inner.child_pid.store(0, Ordering::SeqCst);
    session.transition(SessionState::Idle);
    inner.running.store(false, Ordering::SeqCst);
    let _ = tx.send(AttackEvent::Finished).await;
    tracing::info!("attack session finished");
}
