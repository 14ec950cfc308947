//! Child process spawning and termination for the external tool.
//!
//! Termination is abstracted behind [`TerminationStrategy`] so the runner
//! never branches on platform inline: POSIX platforms signal the child's
//! whole process group and escalate, other platforms degrade to a hard
//! terminate.

use std::io::PipeReader;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::fs::File;
use tokio::process::{Child, Command};

/// Grace period between a termination request and the forced kill. Applies
/// only to post-stop cleanup, never to the main wait.
pub const CLEANUP_GRACE: Duration = Duration::from_secs(2);

/// Error type for process spawning operations.
#[derive(thiserror::Error, Debug)]
pub enum SpawnError {
    /// The external binary was not found on PATH.
    #[error("hydra binary not found; install THC-Hydra")]
    NotFound,
    /// Permission denied when spawning.
    #[error("permission denied spawning hydra")]
    PermissionDenied,
    /// Other I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpawnError {
    fn from_io(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound,
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Io(err),
        }
    }
}

/// A running attack process with its output captured as one stream.
#[derive(Debug)]
pub struct AttackProcess {
    child: Child,
    output: Option<File>,
}

impl AttackProcess {
    /// Spawn from a prebuilt argument vector (program token first). The
    /// vector is passed to process creation as-is, never through a shell.
    ///
    /// Both stdout and stderr are backed by the same OS pipe, so the merged
    /// stream interleaves exactly as the child wrote it. On Unix the child
    /// becomes its own process group leader so that a group signal reaches
    /// descendants hydra forks itself.
    ///
    /// # Errors
    ///
    /// Returns `SpawnError` when the vector is empty or the spawn fails.
    pub fn spawn(args: &[String]) -> Result<Self, SpawnError> {
        let (program, rest) = args.split_first().ok_or_else(|| {
            SpawnError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "empty argument vector",
            ))
        })?;

        let (reader, writer) = std::io::pipe()?;
        let stderr_end = writer.try_clone()?;

        let mut cmd = Command::new(program);
        cmd.args(rest)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr_end);

        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().map_err(SpawnError::from_io)?;
        // The command object still holds the write ends; drop it so the
        // reader sees end of file once the child exits.
        drop(cmd);

        Ok(Self {
            child,
            output: Some(File::from_std(reader_into_file(reader))),
        })
    }

    /// Take ownership of the merged output stream. Only the first call
    /// succeeds.
    pub fn take_output(&mut self) -> Option<File> {
        self.output.take()
    }

    /// Process ID, if the child has not been reaped yet.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for exit. Unbounded: hydra may legitimately run for hours.
    ///
    /// # Errors
    ///
    /// Returns an error if waiting fails.
    pub async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        self.child.wait().await
    }

    /// Send the forceful kill signal without waiting for the process to be
    /// reaped.
    ///
    /// # Errors
    ///
    /// Returns an error if the signal cannot be sent.
    pub fn start_kill(&mut self) -> std::io::Result<()> {
        self.child.start_kill()
    }

    /// Wait up to [`CLEANUP_GRACE`] for exit, escalating to a forceful kill
    /// if the process refuses to die. Always reaps the child.
    pub async fn shutdown(&mut self) -> Option<ExitStatus> {
        match tokio::time::timeout(CLEANUP_GRACE, self.child.wait()).await {
            Ok(result) => result.ok(),
            Err(_) => {
                tracing::warn!("process ignored termination; escalating to kill");
                let _ = self.child.start_kill();
                self.child.wait().await.ok()
            }
        }
    }
}

/// Reclaim the read end of the output pipe as a plain file handle.
fn reader_into_file(reader: PipeReader) -> std::fs::File {
    #[cfg(unix)]
    {
        std::os::fd::OwnedFd::from(reader).into()
    }
    #[cfg(not(unix))]
    {
        std::os::windows::io::OwnedHandle::from(reader).into()
    }
}

/// Platform capability for taking an attack process down.
pub trait TerminationStrategy: Send + Sync {
    /// Ask the process to stop, reaching its whole group where the platform
    /// allows. Must not block on the process actually exiting.
    fn attempt_graceful(&self, process: &mut AttackProcess) -> std::io::Result<()>;

    /// Last resort.
    fn force_kill(&self, process: &mut AttackProcess) -> std::io::Result<()> {
        process.start_kill()
    }
}

/// SIGTERM to the child's process group, falling back to the child alone,
/// then to SIGKILL.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixGroupSignal;

#[cfg(unix)]
impl TerminationStrategy for PosixGroupSignal {
    fn attempt_graceful(&self, process: &mut AttackProcess) -> std::io::Result<()> {
        let Some(pid) = process.id() else {
            // Already exited; nothing to signal.
            return Ok(());
        };
        if signal_group(pid) {
            return Ok(());
        }
        tracing::warn!(pid, "group signal failed; terminating single process");
        if signal_single(pid) {
            return Ok(());
        }
        tracing::warn!(pid, "SIGTERM failed; escalating to kill");
        self.force_kill(process)
    }
}

/// Send SIGTERM to the process group led by `pid`. The child was spawned as
/// its own group leader, so its pgid equals its pid.
#[cfg(unix)]
pub(crate) fn signal_group(pid: u32) -> bool {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let pid = Pid::from_raw(i32::try_from(pid).unwrap_or(i32::MAX));
    killpg(pid, Signal::SIGTERM).is_ok()
}

#[cfg(unix)]
fn signal_single(pid: u32) -> bool {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let pid = Pid::from_raw(i32::try_from(pid).unwrap_or(i32::MAX));
    kill(pid, Signal::SIGTERM).is_ok()
}

/// Console-interrupt semantics are not reachable through the portable
/// process API, so the graceful path degrades to a hard terminate.
#[cfg(not(unix))]
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsConsoleInterrupt;

#[cfg(not(unix))]
impl TerminationStrategy for WindowsConsoleInterrupt {
    fn attempt_graceful(&self, process: &mut AttackProcess) -> std::io::Result<()> {
        if process.id().is_none() {
            return Ok(());
        }
        process.start_kill()
    }
}

/// The termination strategy for the current platform.
#[must_use]
pub fn platform_strategy() -> Box<dyn TerminationStrategy> {
    #[cfg(unix)]
    {
        Box::new(PosixGroupSignal)
    }
    #[cfg(not(unix))]
    {
        Box::new(WindowsConsoleInterrupt)
    }
}
