//! Test doubles for every collector seam.
//!
//! - `MockFs` replaces `/proc`, `/sys` and the mount table
//! - `MockRunner` replaces `systemctl`, `lsusb` and `pkexec`
//! - `MockLinkProbe` / `MockSpaceProbe` replace `getifaddrs`, ioctls and `statvfs`
//!
//! Each has a `typical_system()` scenario; the four scenarios describe the
//! same machine.

mod filesystem;
mod probe;
mod runner;
mod scenarios;

pub use filesystem::MockFs;
pub use probe::{MockLinkProbe, MockSpaceProbe};
pub use runner::{MockRunner, RecordedCall};
