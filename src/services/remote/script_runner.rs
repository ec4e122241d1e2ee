//! Script Runner
//!
//! Invokes the configured executable with no arguments and captures what it
//! prints. There is no timeout; a cancelled token kills the child.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Why a script run did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// The executable could not be started or its output could not be read
    #[error("{0}")]
    Launch(#[source] std::io::Error),

    /// The script exited with a non-zero code
    #[error("exit status {0}")]
    Exit(i32),

    /// The script was killed by a signal (`None` when the platform has no
    /// signal number to report)
    #[error("signal: {}", signal_name(.0))]
    Terminated(Option<i32>),

    /// The run was cancelled before the script finished
    #[error("execution cancelled")]
    Cancelled,
}

fn signal_name(signal: &Option<i32>) -> String {
    let name = match *signal {
        Some(1) => "hangup",
        Some(2) => "interrupt",
        Some(3) => "quit",
        Some(6) => "aborted",
        Some(9) => "killed",
        Some(11) => "segmentation fault",
        Some(13) => "broken pipe",
        Some(15) => "terminated",
        Some(other) => return other.to_string(),
        None => "unknown",
    };
    name.to_string()
}

impl ScriptError {
    fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ScriptError::Exit(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            ScriptError::Terminated(status.signal())
        }
        #[cfg(not(unix))]
        {
            ScriptError::Terminated(None)
        }
    }
}

/// A failed run together with the output captured before it failed.
#[derive(Debug)]
pub struct ScriptFailure {
    pub error: ScriptError,
    pub output: Vec<u8>,
}

impl ScriptFailure {
    fn without_output(error: ScriptError) -> Self {
        Self {
            error,
            output: Vec::new(),
        }
    }

    fn launch(error: std::io::Error) -> Self {
        Self::without_output(ScriptError::Launch(error))
    }
}

/// Runs one external script.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    script_path: PathBuf,
}

impl ScriptRunner {
    pub fn new(script_path: impl AsRef<Path>) -> Self {
        Self {
            script_path: script_path.as_ref().to_path_buf(),
        }
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    /// Run the script to completion.
    ///
    /// Stdout and stderr share one pipe, so the returned bytes keep the order
    /// in which the script wrote them. On a non-zero exit the same bytes
    /// travel in the `ScriptFailure`.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<Vec<u8>, ScriptFailure> {
        let (reader, writer) = std::io::pipe().map_err(ScriptFailure::launch)?;
        let stderr_writer = writer.try_clone().map_err(ScriptFailure::launch)?;

        let mut cmd = Command::new(&self.script_path);
        cmd.stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr_writer)
            .kill_on_drop(true);
        let spawned = cmd.spawn();
        // The command keeps our copies of the write end open; EOF needs them gone
        drop(cmd);
        let mut child = spawned.map_err(ScriptFailure::launch)?;

        let collector = tokio::task::spawn_blocking(move || {
            let mut reader = reader;
            let mut output = Vec::new();
            reader.read_to_end(&mut output).map(|_| output)
        });

        let status = tokio::select! {
            status = child.wait() => status.map_err(ScriptFailure::launch)?,
            _ = cancel.cancelled() => {
                return Err(ScriptFailure::without_output(ScriptError::Cancelled));
            }
        };

        let output = match collector.await {
            Ok(result) => result.map_err(ScriptFailure::launch)?,
            Err(e) => return Err(ScriptFailure::launch(std::io::Error::other(e))),
        };

        if status.success() {
            Ok(output)
        } else {
            Err(ScriptFailure {
                error: ScriptError::from_status(status),
                output,
            })
        }
    }
}
