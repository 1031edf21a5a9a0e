//! External command execution.
//!
//! `CommandRunner` is the seam between collectors and the processes they
//! spawn (`systemctl`, `lsusb`, `pkexec`), mirroring what [`FileSystem`] does
//! for pseudo-files. Tests substitute `MockRunner`.
//!
//! [`FileSystem`]: crate::collector::FileSystem

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::collector::error::CommandError;

/// How often a running child is polled while a timeout is armed.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Standard output, lossily decoded as UTF-8.
    pub stdout: String,
}

impl CommandOutput {
    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
        }
    }

    /// Failed output with the given exit code and no stdout.
    pub fn failed(code: i32) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Converts a non-zero exit into [`CommandError::Exit`].
    pub fn check(self, program: &str) -> Result<Self, CommandError> {
        if self.success() {
            Ok(self)
        } else {
            Err(CommandError::Exit {
                program: program.to_string(),
                code: self.code,
            })
        }
    }
}

/// Runs external programs.
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args` and waits for it to finish.
    ///
    /// With `timeout` set, a child still running at the deadline is killed and
    /// [`CommandError::Timeout`] is returned. A non-zero exit is not an error
    /// at this level; callers decide via [`CommandOutput::check`].
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, CommandError>;
}

/// Runs real processes via `std::process::Command`.
///
/// Arguments are passed directly to the program, never through a shell.
/// Stdin is closed and stderr discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, CommandError> {
        debug!(program, ?args, "spawning command");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        // Stdout must be drained while waiting: `lsusb -v` outgrows the pipe buffer.
        let stdout = child.stdout.take();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(mut out) = stdout {
                let _ = out.read_to_end(&mut buf);
            }
            let _ = tx.send(buf);
        });

        let start = Instant::now();
        let timed_out = || CommandError::Timeout {
            program: program.to_string(),
            timeout: timeout.unwrap_or_default(),
        };

        let status = match wait_until(&mut child, timeout.map(|limit| start + limit)) {
            Ok(Some(status)) => status,
            Ok(None) => {
                reap(&mut child);
                return Err(timed_out());
            }
            Err(e) => {
                reap(&mut child);
                return Err(CommandError::Io(e));
            }
        };

        // A background grandchild may still hold stdout open after the child exits.
        let stdout = match timeout {
            None => rx.recv().unwrap_or_default(),
            Some(limit) => {
                let remaining = limit.saturating_sub(start.elapsed());
                match rx.recv_timeout(remaining) {
                    Ok(buf) => buf,
                    Err(RecvTimeoutError::Timeout) => {
                        debug!(program, "stdout still open after exit");
                        return Err(timed_out());
                    }
                    Err(RecvTimeoutError::Disconnected) => Vec::new(),
                }
            }
        };

        Ok(CommandOutput {
            code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
        })
    }
}

/// Waits for `child` until `deadline`. `Ok(None)` means the deadline passed.
fn wait_until(child: &mut Child, deadline: Option<Instant>) -> io::Result<Option<ExitStatus>> {
    let Some(deadline) = deadline else {
        return child.wait().map(Some);
    };
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kills and reaps a child that is being abandoned. The stdout reader is
/// left detached.
fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_system_runner_captures_stdout() {
        let runner = SystemRunner::new();
        let output = runner
            .run("sh", &["-c", "echo hello"], Some(Duration::from_secs(10)))
            .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "hello\n");
    }

    #[test]
    fn test_system_runner_reports_exit_code() {
        let runner = SystemRunner::new();
        let output = runner.run("sh", &["-c", "exit 3"], None).unwrap();
        assert_eq!(output.code, Some(3));
        assert!(!output.success());
        assert!(matches!(
            output.check("sh"),
            Err(CommandError::Exit { code: Some(3), .. })
        ));
    }

    #[test]
    fn test_system_runner_missing_program() {
        let runner = SystemRunner::new();
        let result = runner.run("/nonexistent/syslens-test-binary", &[], None);
        assert!(matches!(result, Err(CommandError::Spawn { .. })));
    }

    #[test]
    fn test_system_runner_kills_on_timeout() {
        let runner = SystemRunner::new();
        let start = Instant::now();
        let result = runner.run("sleep", &["5"], Some(Duration::from_millis(100)));
        assert!(matches!(result, Err(CommandError::Timeout { .. })));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_system_runner_timeout_covers_inherited_stdout() {
        let runner = SystemRunner::new();
        let start = Instant::now();
        let result = runner.run(
            "sh",
            &["-c", "sleep 3 & echo hi"],
            Some(Duration::from_millis(200)),
        );
        assert!(matches!(result, Err(CommandError::Timeout { .. })));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_system_runner_without_timeout_waits_for_stdout() {
        let runner = SystemRunner::new();
        let output = runner
            .run("sh", &["-c", "(sleep 1; echo late) & echo early"], None)
            .unwrap();
        assert_eq!(output.stdout, "early\nlate\n");
    }

    #[test]
    fn test_wait_until_past_deadline() {
        let mut child = Command::new("sleep").arg("5").spawn().unwrap();
        let status = wait_until(&mut child, Some(Instant::now())).unwrap();
        assert!(status.is_none());
        reap(&mut child);
        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    fn test_system_runner_large_output() {
        let runner = SystemRunner::new();
        let output = runner
            .run(
                "sh",
                &["-c", "i=0; while [ $i -lt 20000 ]; do echo line$i; i=$((i+1)); done"],
                Some(Duration::from_secs(30)),
            )
            .unwrap();
        assert_eq!(output.stdout.lines().count(), 20000);
    }
}
