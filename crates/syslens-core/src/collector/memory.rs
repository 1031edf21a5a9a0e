//! RAM and swap usage from `/proc/meminfo`, plus a bounded history of samples.

use std::collections::VecDeque;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::collector::error::CollectError;
use crate::collector::procfs::{MemInfo, parse_meminfo};
use crate::collector::traits::{FileSystem, Refresh};
use crate::config::CollectorConfig;
use crate::model::MemorySnapshot;

/// Number of samples kept by [`MemoryHistory`] by default.
/// At a 10 second refresh this covers ten minutes.
pub const DEFAULT_HISTORY_CAPACITY: usize = 60;

/// Collects memory usage.
pub struct MemoryCollector<F: FileSystem> {
    fs: F,
    meminfo_path: PathBuf,
    snapshot: MemorySnapshot,
}

impl<F: FileSystem> MemoryCollector<F> {
    /// Creates the collector and performs the initial collection.
    pub fn new(fs: F, config: &CollectorConfig) -> Self {
        let mut collector = Self {
            fs,
            meminfo_path: config.meminfo_path(),
            snapshot: MemorySnapshot::default(),
        };
        collector.refresh();
        collector
    }

    /// Reads and parses `/proc/meminfo`.
    pub fn collect(&self) -> Result<MemorySnapshot, CollectError> {
        let content = self.fs.read_to_string(&self.meminfo_path)?;
        let info = parse_meminfo(&content).map_err(|e| CollectError::Parse(e.message))?;
        Ok(snapshot_from(&info))
    }

    pub fn snapshot(&self) -> &MemorySnapshot {
        &self.snapshot
    }
}

impl<F: FileSystem> Refresh for MemoryCollector<F> {
    fn refresh(&mut self) {
        self.snapshot = match self.collect() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = %self.meminfo_path.display(), error = %e, "cannot collect memory info");
                MemorySnapshot::default()
            }
        };
    }
}

fn snapshot_from(info: &MemInfo) -> MemorySnapshot {
    MemorySnapshot {
        total_ram: info.mem_total,
        free_ram: info.mem_free,
        available_ram: info.mem_available,
        buffers: info.buffers,
        cached: info.cached,
        shmem: info.shmem,
        total_swap: info.swap_total,
        free_swap: info.swap_free,
        used_ram: info
            .mem_total
            .saturating_sub(info.mem_free)
            .saturating_sub(info.buffers)
            .saturating_sub(info.cached),
        used_swap: info.swap_total.saturating_sub(info.swap_free),
    }
}

/// One timestamped memory sample.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MemorySample {
    /// Unix timestamp (seconds).
    pub timestamp: i64,
    pub snapshot: MemorySnapshot,
}

/// Ring of the most recent memory samples, oldest first.
#[derive(Clone, Debug)]
pub struct MemoryHistory {
    samples: VecDeque<MemorySample>,
    capacity: usize,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl MemoryHistory {
    /// Creates an empty history. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample stamped with the current time.
    pub fn record(&mut self, snapshot: MemorySnapshot) {
        self.push(MemorySample {
            timestamp: Utc::now().timestamp(),
            snapshot,
        });
    }

    /// Appends a sample, dropping the oldest one when full.
    pub fn push(&mut self, sample: MemorySample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn latest(&self) -> Option<&MemorySample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemorySample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Seconds between the oldest and newest sample.
    pub fn span_secs(&self) -> i64 {
        match (self.samples.front(), self.samples.back()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0,
        }
    }
}
