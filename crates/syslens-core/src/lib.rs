//! syslens-core - system telemetry collection library.
//!
//! Provides:
//! - `collector` - per-subsystem collectors (CPU, memory, disks, network, services, USB)
//! - `model` - plain serializable snapshots produced by the collectors
//! - `config` - filesystem roots and external command settings
//! - `fmt` - shared formatting helpers (bytes, percentages, cache sizes)
//! - `util` - helper utilities

pub mod collector;
pub mod config;
pub mod fmt;
pub mod model;
pub mod util;
