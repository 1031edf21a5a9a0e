//! Privilege detection.
//!
//! Service control verbs need root. When the process runs unprivileged the
//! service collector routes them through the configured elevation program.

use std::sync::LazyLock;

use nix::unistd::geteuid;

/// Cached result of the effective-uid check.
static IS_ROOT: LazyLock<bool> = LazyLock::new(|| geteuid().is_root());

/// Returns `true` if the current process runs with an effective uid of 0.
///
/// The result is cached after the first call.
pub fn is_privileged() -> bool {
    *IS_ROOT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_privileged_matches_euid() {
        assert_eq!(is_privileged(), geteuid().is_root());
    }

    #[test]
    fn test_is_privileged_returns_consistent_result() {
        assert_eq!(is_privileged(), is_privileged());
    }
}
