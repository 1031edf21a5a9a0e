//! Error types used inside the collectors.
//!
//! Collectors never hand these to their callers: a failed source degrades to
//! an empty or zero field. They exist so the degrade points can log a reason.

use std::time::Duration;

/// Error type for collection failures.
#[derive(Debug)]
pub enum CollectError {
    /// I/O error reading a pseudo-file.
    Io(std::io::Error),
    /// Parse error in a pseudo-file.
    Parse(String),
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Io(e) => write!(f, "I/O error: {}", e),
            CollectError::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for CollectError {}

impl From<std::io::Error> for CollectError {
    fn from(e: std::io::Error) -> Self {
        CollectError::Io(e)
    }
}

/// Error type for external command invocations.
#[derive(Debug)]
pub enum CommandError {
    /// The program could not be started (not installed, not executable).
    Spawn {
        program: String,
        source: std::io::Error,
    },
    /// The program did not finish in time and was killed.
    Timeout { program: String, timeout: Duration },
    /// The program finished with a non-zero exit status.
    /// `code` is `None` when it was terminated by a signal.
    Exit { program: String, code: Option<i32> },
    /// I/O error while waiting for the program.
    Io(std::io::Error),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Spawn { program, source } => {
                write!(f, "failed to start {}: {}", program, source)
            }
            CommandError::Timeout { program, timeout } => {
                write!(f, "{} timed out after {:?}", program, timeout)
            }
            CommandError::Exit {
                program,
                code: Some(code),
            } => write!(f, "{} exited with status {}", program, code),
            CommandError::Exit {
                program,
                code: None,
            } => write!(f, "{} was terminated by a signal", program),
            CommandError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Spawn { source, .. } => Some(source),
            CommandError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CommandError {
    fn from(e: std::io::Error) -> Self {
        CommandError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_display() {
        let err = CommandError::Exit {
            program: "systemctl".into(),
            code: Some(5),
        };
        assert_eq!(err.to_string(), "systemctl exited with status 5");

        let err = CommandError::Timeout {
            program: "lsusb".into(),
            timeout: Duration::from_secs(2),
        };
        assert_eq!(err.to_string(), "lsusb timed out after 2s");
    }

    #[test]
    fn test_collect_error_from_io() {
        let err: CollectError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, CollectError::Io(_)));
        assert!(err.to_string().starts_with("I/O error"));
    }
}
