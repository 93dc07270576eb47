//! Process spawning and lifecycle management.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, ChildStdout, Command};

use super::io::{StderrMonitor, StdinWriter};
use crate::config::{ConverterConfig, ImageFormat};
use crate::{Error, Result};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// A running wkhtmltoimage process.
///
/// This struct manages the lifecycle of a single tool invocation. Each
/// render call spawns exactly one process; stderr is always consumed by a
/// background [`StderrMonitor`], while stdin and stdout are piped only when
/// the render needs them.
///
/// # Cancellation
///
/// Dropping a `RenderProcess` will kill the subprocess if it's still
/// running.
#[derive(Debug)]
pub struct RenderProcess {
    child: Child,
    stderr: Option<StderrMonitor>,
}

impl RenderProcess {
    /// Spawn the tool with the given arguments.
    ///
    /// Fails with [`Error::ToolNotFound`] before anything is spawned when
    /// the executable does not exist at the configured path. `pipe_stdin`
    /// must be true iff the content will be fed through stdin;
    /// `pipe_stdout` iff the output will be drained from stdout.
    pub async fn spawn(
        config: &ConverterConfig,
        args: &[String],
        pipe_stdin: bool,
        pipe_stdout: bool,
    ) -> Result<Self> {
        let exe = config.tool_path();
        if !exe.is_file() {
            return Err(Error::ToolNotFound {
                path: exe.display().to_string(),
            });
        }

        let mut cmd = Command::new(&exe);
        cmd.args(args);
        cmd.current_dir(config.tool_dir());
        // A path/URL source reads through the command line argument and a
        // file sink is written by the tool itself; only pipe the streams
        // this render actually uses.
        if pipe_stdin {
            cmd.stdin(Stdio::piped());
        }
        if pipe_stdout {
            cmd.stdout(Stdio::piped());
        }
        cmd.stderr(Stdio::piped());
        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        tracing::debug!(exe = %exe.display(), ?args, "spawning wkhtmltoimage");

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ToolNotFound {
                    path: exe.display().to_string(),
                }
            } else {
                Error::ProcessSpawn(e)
            }
        })?;

        apply_priority(&child, config);

        let stderr = child.stderr.take().expect("stderr was configured");
        let monitor = StderrMonitor::spawn(stderr, config.log_observer().cloned());

        Ok(Self {
            child,
            stderr: Some(monitor),
        })
    }

    /// Write the HTML content to the tool's stdin and close it.
    ///
    /// Must only be called when the process was spawned with
    /// `pipe_stdin = true`, and at most once.
    pub async fn feed_stdin(&mut self, content: &[u8]) -> Result<()> {
        let stdin = self.child.stdin.take().expect("stdin was configured");
        StdinWriter::new(stdin).write_content(content).await
    }

    /// Take the stdout handle for draining.
    ///
    /// Returns `None` when stdout was not piped or was already taken.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// Wait for the process to exit and return its exit code.
    ///
    /// With a timeout configured, waits at most that long; on expiry the
    /// process is killed (a kill failure is swallowed since the process may
    /// have exited in the race) and [`Error::Timeout`] is raised carrying
    /// the configured duration. A process that died to a signal reports
    /// exit code -1.
    pub async fn wait(&mut self, timeout: Option<Duration>) -> Result<i32> {
        let status = match timeout {
            Some(limit) => match tokio::time::timeout(limit, self.child.wait()).await {
                Ok(waited) => waited.map_err(Error::io)?,
                Err(_) => {
                    let _ = self.child.kill().await;
                    return Err(Error::Timeout(limit));
                }
            },
            None => self.child.wait().await.map_err(Error::io)?,
        };

        Ok(status.code().unwrap_or(-1))
    }

    /// Join the stderr monitor and return the last non-empty line it saw.
    ///
    /// Call after [`wait`](Self::wait) has returned; the monitor finishes
    /// when the process closes its stderr.
    pub async fn last_error_line(&mut self) -> String {
        match self.stderr.take() {
            Some(monitor) => monitor.last_error_line().await,
            None => String::new(),
        }
    }

    /// Get the process ID of the running tool.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Try to kill the process without waiting.
    pub fn start_kill(&mut self) -> Result<()> {
        self.child.start_kill().map_err(Error::io)
    }
}

impl Drop for RenderProcess {
    fn drop(&mut self) {
        // Try to kill the process if it's still running
        let _ = self.start_kill();
    }
}

/// Apply the configured scheduling priority to the spawned process.
///
/// Only invoked when the priority differs from the default; a failure to
/// apply it is logged and does not fail the render.
#[cfg(unix)]
fn apply_priority(child: &Child, config: &ConverterConfig) {
    use crate::config::ProcessPriority;

    if config.priority() == ProcessPriority::Normal {
        return;
    }
    let Some(pid) = child.id() else {
        return;
    };

    let nice = config.priority().nice_level();
    // The `which` parameter type differs between libc flavors, hence the casts.
    let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS as _, pid as _, nice as _) };
    if rc != 0 {
        tracing::debug!(
            pid,
            nice,
            "could not adjust wkhtmltoimage process priority"
        );
    }
}

#[cfg(not(unix))]
fn apply_priority(_child: &Child, _config: &ConverterConfig) {}

/// Build the wkhtmltoimage argument list.
///
/// `source_spec` and `sink_spec` are either the stdio placeholder or a
/// literal path/URL; they always come last. Arguments are exec-style argv
/// entries, so embedded spaces need no quoting. Numeric flags use Rust's
/// locale-invariant formatting (`.` decimal point).
pub(crate) fn build_args(
    config: &ConverterConfig,
    format: Option<&ImageFormat>,
    source_spec: &str,
    sink_spec: &str,
) -> Vec<String> {
    let mut args = vec!["-q".to_string()];

    if config.zoom() != 1.0 {
        args.push("--zoom".to_string());
        args.push(config.zoom().to_string());
    }
    if config.width() > 0 {
        args.push("--width".to_string());
        args.push(config.width().to_string());
    }
    if config.height() > 0 {
        args.push("--height".to_string());
        args.push(config.height().to_string());
    }
    if let Some(format) = format {
        let tag = format.to_string();
        if !tag.is_empty() {
            args.push("-f".to_string());
            args.push(tag);
        }
    }
    // Whitespace-split, no quote-aware parsing; escaping is the caller's
    // responsibility.
    for extra in config.extra_args().split_whitespace() {
        args.push(extra.to_string());
    }

    args.push(source_spec.to_string());
    args.push(sink_spec.to_string());
    args
}
