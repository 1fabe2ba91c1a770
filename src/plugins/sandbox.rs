//! Subprocess executor behind the [`Sandbox`] trait.
//!
//! Runs `program args... <code>` in a working directory with piped output
//! and a wall-clock deadline. This is a timeout, not isolation: the child
//! has the same privileges as the session.

use crate::core::collaborators::{Sandbox, SandboxOutcome};
use crate::core::config::AkiConfig;
use crate::core::error::AkiError;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone)]
pub struct SubprocessSandbox {
    pub program: String,
    pub args: Vec<String>,
    pub workdir: Option<PathBuf>,
}

impl SubprocessSandbox {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            workdir: None,
        }
    }

    /// Sandbox configured by `aki.toml`; refuses when `enable_sandbox` is off.
    pub fn from_config(config: &AkiConfig) -> Result<Self, AkiError> {
        if !config.enable_sandbox {
            return Err(AkiError::CollaboratorUnavailable(
                "sandbox disabled (set enable_sandbox = true in aki.toml)".to_string(),
            ));
        }
        Ok(Self::new(
            config.sandbox_program.clone(),
            config.sandbox_args.clone(),
        ))
    }

    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    fn spawn(&self, code: &str) -> std::io::Result<Child> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(code)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }
        cmd.spawn()
    }
}

impl Sandbox for SubprocessSandbox {
    fn execute(&self, code: &str, timeout: Duration) -> SandboxOutcome {
        let start = Instant::now();
        let mut child = match self.spawn(code) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(program = %self.program, error = %e, "sandbox spawn failed");
                return SandboxOutcome::failed(format!("{}: {}", self.program, e));
            }
        };

        // Drained while the child runs so it never blocks on a full pipe. On
        // timeout the readers are detached: a grandchild may still hold the
        // write end.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    reap(&mut child);
                    return SandboxOutcome::failed(e.to_string());
                }
            }
            if start.elapsed() > timeout {
                reap(&mut child);
                tracing::warn!(program = %self.program, timeout_secs = timeout.as_secs(), "sandbox timed out");
                return SandboxOutcome::timed_out(timeout);
            }
            thread::sleep(POLL_INTERVAL);
        };

        let success = status.success();
        SandboxOutcome {
            stdout: join_drain(stdout),
            stderr: join_drain(stderr),
            error: (!success).then(|| {
                status
                    .code()
                    .map(|c| format!("exit status {}", c))
                    .unwrap_or_else(|| "terminated by signal".to_string())
            }),
            success,
            timed_out: false,
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            if let Err(e) = pipe.read_to_end(&mut buf) {
                tracing::debug!(error = %e, "sandbox pipe read failed");
            }
            buf
        })
    })
}

fn join_drain(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|buf| String::from_utf8_lossy(&buf).into_owned())
        .unwrap_or_default()
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Whether `cmd` can be launched at all. The exit status is ignored.
pub fn command_exists(cmd: &str) -> bool {
    Command::new(cmd)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}
