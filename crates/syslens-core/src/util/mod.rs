//! Utility modules for syslens.

mod privilege;

pub use privilege::is_privileged;
