//! Main collector that combines every subsystem collector.
//!
//! The `Collector` struct owns one instance of each collector, refreshes
//! them together and produces a serializable `SystemReport`.

use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collector::command::{CommandRunner, SystemRunner};
use crate::collector::cpu::CpuCollector;
use crate::collector::disk::{DiskCollector, SpaceProbe, StatvfsProbe};
use crate::collector::memory::{MemoryCollector, MemoryHistory, MemorySample};
use crate::collector::network::{LinkProbe, NetworkCollector, SystemLinkProbe};
use crate::collector::service::ServiceCollector;
use crate::collector::traits::{FileSystem, RealFs, Refresh};
use crate::collector::usb::UsbCollector;
use crate::config::CollectorConfig;
use crate::model::{
    CpuSnapshot, DiskSnapshot, MemorySnapshot, NetworkInterfaceSnapshot, ServiceSnapshot,
    UsbDeviceSnapshot,
};

/// Timing information for each collector phase.
///
/// Used for debugging and performance monitoring.
#[derive(Debug, Clone, Default)]
pub struct CollectorTiming {
    /// Total refresh time.
    pub total: Duration,
    /// Time to collect CPU info.
    pub cpu: Duration,
    /// Time to collect memory info.
    pub memory: Duration,
    /// Time to collect mounted filesystems.
    pub disks: Duration,
    /// Time to collect network interfaces.
    pub network: Duration,
    /// Time to list services.
    pub services: Duration,
}

/// Everything collected in one pass.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct SystemReport {
    /// Unix timestamp (seconds) when the report was built.
    pub timestamp: i64,
    pub cpu: CpuSnapshot,
    pub memory: MemorySnapshot,
    pub disks: Vec<DiskSnapshot>,
    pub interfaces: Vec<NetworkInterfaceSnapshot>,
    pub services: Vec<ServiceSnapshot>,
    pub usb_devices: Vec<UsbDeviceSnapshot>,
    /// Memory samples recorded so far, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub memory_history: Vec<MemorySample>,
}

/// Collectors wired to the live system.
pub type SystemCollector = Collector<RealFs, SystemRunner, SystemLinkProbe, StatvfsProbe>;

/// Main collector that gathers all subsystems.
pub struct Collector<F, R, P, S>
where
    F: FileSystem + Clone,
    R: CommandRunner + Clone,
    P: LinkProbe,
    S: SpaceProbe,
{
    cpu: CpuCollector<F>,
    memory: MemoryCollector<F>,
    disks: DiskCollector<F, S>,
    network: NetworkCollector<F, P>,
    services: ServiceCollector<R>,
    usb: UsbCollector<F, R>,
    history: MemoryHistory,
    /// Timing information from the last refresh.
    last_timing: CollectorTiming,
}

impl SystemCollector {
    /// Creates a collector reading the real system.
    pub fn system(config: &CollectorConfig) -> Self {
        Self::new(
            RealFs::new(),
            SystemRunner::new(),
            SystemLinkProbe,
            StatvfsProbe,
            config,
        )
    }
}

impl<F, R, P, S> Collector<F, R, P, S>
where
    F: FileSystem + Clone,
    R: CommandRunner + Clone,
    P: LinkProbe,
    S: SpaceProbe,
{
    /// Creates every collector; each performs its initial collection.
    pub fn new(fs: F, runner: R, link_probe: P, space_probe: S, config: &CollectorConfig) -> Self {
        let start = Instant::now();
        let mut timing = CollectorTiming::default();

        let cpu = timed(&mut timing.cpu, || CpuCollector::new(fs.clone(), config));
        let memory = timed(&mut timing.memory, || MemoryCollector::new(fs.clone(), config));
        let disks = timed(&mut timing.disks, || {
            DiskCollector::new(fs.clone(), space_probe, config)
        });
        let network = timed(&mut timing.network, || {
            NetworkCollector::new(fs.clone(), link_probe, config)
        });
        let services = timed(&mut timing.services, || {
            ServiceCollector::new(runner.clone(), config)
        });
        let usb = UsbCollector::new(fs, runner, config);
        timing.total = start.elapsed();

        let mut history = MemoryHistory::default();
        history.record(memory.snapshot().clone());

        Self {
            cpu,
            memory,
            disks,
            network,
            services,
            usb,
            history,
            last_timing: timing,
        }
    }

    /// Refreshes every cached collector and records a memory sample.
    ///
    /// USB devices are not cached and are enumerated by [`Self::report`].
    pub fn refresh_all(&mut self) -> &CollectorTiming {
        let start = Instant::now();
        let mut timing = CollectorTiming::default();

        timed(&mut timing.cpu, || self.cpu.refresh());
        timed(&mut timing.memory, || self.memory.refresh());
        timed(&mut timing.disks, || self.disks.refresh());
        timed(&mut timing.network, || self.network.refresh());
        timed(&mut timing.services, || self.services.refresh());
        timing.total = start.elapsed();

        self.history.record(self.memory.snapshot().clone());
        debug!(?timing, "refreshed all collectors");

        self.last_timing = timing;
        &self.last_timing
    }

    /// Builds a report from the current snapshots plus a live USB enumeration.
    pub fn report(&self) -> SystemReport {
        SystemReport {
            timestamp: Utc::now().timestamp(),
            cpu: self.cpu.snapshot().clone(),
            memory: self.memory.snapshot().clone(),
            disks: self.disks.get_disks().to_vec(),
            interfaces: self.network.get_interfaces().to_vec(),
            services: self.services.get_all_services().to_vec(),
            usb_devices: self.usb.get_usb_devices(),
            memory_history: self.history.iter().cloned().collect(),
        }
    }

    pub fn cpu(&self) -> &CpuCollector<F> {
        &self.cpu
    }

    pub fn memory(&self) -> &MemoryCollector<F> {
        &self.memory
    }

    pub fn disks(&self) -> &DiskCollector<F, S> {
        &self.disks
    }

    pub fn network(&self) -> &NetworkCollector<F, P> {
        &self.network
    }

    pub fn services(&self) -> &ServiceCollector<R> {
        &self.services
    }

    pub fn usb(&self) -> &UsbCollector<F, R> {
        &self.usb
    }

    pub fn history(&self) -> &MemoryHistory {
        &self.history
    }

    /// Returns timing information from the last refresh.
    pub fn last_timing(&self) -> &CollectorTiming {
        &self.last_timing
    }
}

fn timed<T>(slot: &mut Duration, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let value = f();
    *slot = start.elapsed();
    value
}
