//! Canned command outputs for testing collectors without running processes.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::collector::command::{CommandOutput, CommandRunner};
use crate::collector::error::CommandError;

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Default)]
struct State {
    outputs: HashMap<String, CommandOutput>,
    timeouts: HashSet<String>,
    calls: Vec<RecordedCall>,
}

/// Command runner answering from a table of canned outputs.
///
/// Clones share state, so a test can keep a handle after moving a clone into
/// a collector and inspect the calls it made. Commands without a canned
/// output fail as if the program were not installed.
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    state: Arc<Mutex<State>>,
}

fn key(program: &str, args: &[&str]) -> String {
    let mut key = program.to_string();
    for arg in args {
        key.push('\0');
        key.push_str(arg);
    }
    key
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sets the output returned for exactly `program args...`.
    pub fn set_output(&self, program: &str, args: &[&str], output: CommandOutput) {
        self.state().outputs.insert(key(program, args), output);
    }

    /// Makes `program args...` fail with a timeout.
    pub fn set_timeout(&self, program: &str, args: &[&str]) {
        self.state().timeouts.insert(key(program, args));
    }

    /// Invocations so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }
}

impl CommandRunner for MockRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, CommandError> {
        let mut state = self.state();
        state.calls.push(RecordedCall {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            timeout,
        });

        let key = key(program, args);
        if state.timeouts.contains(&key) {
            return Err(CommandError::Timeout {
                program: program.to_string(),
                timeout: timeout.unwrap_or_default(),
            });
        }
        state
            .outputs
            .get(&key)
            .cloned()
            .ok_or_else(|| CommandError::Spawn {
                program: program.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no canned output"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runner_canned_output() {
        let runner = MockRunner::new();
        runner.set_output("lsusb", &["-v"], CommandOutput::ok("Bus 001\n"));

        let output = runner.run("lsusb", &["-v"], None).unwrap();
        assert_eq!(output.stdout, "Bus 001\n");
        assert!(matches!(
            runner.run("lsusb", &[], None),
            Err(CommandError::Spawn { .. })
        ));
    }

    #[test]
    fn test_mock_runner_records_calls_across_clones() {
        let runner = MockRunner::new();
        let clone = runner.clone();
        let _ = clone.run("systemctl", &["start", "a.service"], Some(Duration::from_secs(1)));

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args, vec!["start", "a.service"]);
        assert_eq!(calls[0].timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_mock_runner_timeout() {
        let runner = MockRunner::new();
        runner.set_timeout("pkexec", &["systemctl", "stop", "x"]);
        assert!(matches!(
            runner.run("pkexec", &["systemctl", "stop", "x"], None),
            Err(CommandError::Timeout { .. })
        ));
    }
}
