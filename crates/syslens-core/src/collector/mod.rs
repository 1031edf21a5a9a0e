//! System telemetry collectors for Linux.
//!
//! This module reads hardware and service state from `/proc`, `/sys`, the
//! mount table, the network stack and external commands, with every source
//! behind a trait so collectors can be tested against mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                            Collector                             │
//! │  ┌────────┐ ┌────────┐ ┌────────┐ ┌─────────┐ ┌─────────┐ ┌─────┐│
//! │  │  Cpu   │ │ Memory │ │  Disk  │ │ Network │ │ Service │ │ Usb ││
//! │  └───┬────┘ └───┬────┘ └─┬───┬──┘ └──┬───┬──┘ └────┬────┘ └┬──┬─┘│
//! │      └──────────┴────────┤   │       │   │         │       │  │  │
//! │             ┌────────────┼───┼───────┘   │         │       │  │  │
//! │      ┌──────▼─────┐ ┌────▼───▼───┐ ┌─────▼─────┐ ┌─▼───────▼┐ │  │
//! │      │ FileSystem │ │ SpaceProbe │ │ LinkProbe │ │ Command  │ │  │
//! │      │  (trait)   │ │  (trait)   │ │  (trait)  │ │  Runner  │ │  │
//! │      └──────▲─────┘ └────────────┘ └───────────┘ └──────────┘ │  │
//! │             └─────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//!
//!   RealFs / StatvfsProbe / SystemLinkProbe / SystemRunner  (Linux)
//!   MockFs / MockSpaceProbe / MockLinkProbe / MockRunner    (testing)
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use syslens_core::collector::Collector;
//! use syslens_core::config::CollectorConfig;
//!
//! let collector = Collector::system(&CollectorConfig::default());
//! let report = collector.report();
//! ```
//!
//! ## Testing (with mocks)
//!
//! ```
//! use syslens_core::collector::{Collector, MockFs, MockLinkProbe, MockRunner, MockSpaceProbe};
//! use syslens_core::config::CollectorConfig;
//!
//! let collector = Collector::new(
//!     MockFs::typical_system(),
//!     MockRunner::typical_system(),
//!     MockLinkProbe::typical_system(),
//!     MockSpaceProbe::typical_system(),
//!     &CollectorConfig::default(),
//! );
//! let report = collector.report();
//! assert_eq!(report.cpu.logical_cores, 4);
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod command;
pub mod cpu;
pub mod disk;
pub mod error;
pub mod memory;
pub mod mock;
pub mod network;
pub mod procfs;
pub mod service;
pub mod traits;
pub mod usb;

pub use collector::{Collector, CollectorTiming, SystemCollector, SystemReport};
pub use command::{CommandOutput, CommandRunner, SystemRunner};
pub use cpu::CpuCollector;
pub use disk::{DiskCollector, FsSpace, SpaceProbe, StatvfsProbe};
pub use error::{CollectError, CommandError};
pub use memory::{MemoryCollector, MemoryHistory, MemorySample};
pub use mock::{MockFs, MockLinkProbe, MockRunner, MockSpaceProbe};
pub use network::{LinkProbe, NetworkCollector, SystemLinkProbe};
pub use service::{ServiceAction, ServiceCollector, ServiceError};
pub use traits::{FileSystem, ParsedLine, RealFs, Refresh};
pub use usb::UsbCollector;
