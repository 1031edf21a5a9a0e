//! Hardware snapshots read from `/proc`, `/sys`, the mount table and the
//! network stack.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fmt::percent;

/// Processor description.
///
/// Sources: `/proc/cpuinfo`, `/sys/devices/system/cpu/online`,
/// `/sys/devices/system/cpu/cpu0/cpufreq/*`, `/sys/devices/system/cpu/cpu0/cache/index*`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct CpuSnapshot {
    /// Value of the last `model name` line.
    pub processor_name: String,

    /// Value of the last `vendor_id` line.
    pub vendor_id: String,

    /// Number of distinct `physical id` values.
    /// Falls back to `logical_cores` when the file has no `physical id` lines.
    pub physical_cores: usize,

    /// Number of online logical processors.
    pub logical_cores: usize,

    /// `scaling_cur_freq` of cpu0 in MHz. `None` when unreadable.
    pub current_frequency_mhz: Option<f64>,

    /// `scaling_min_freq` of cpu0 in MHz. `None` when unreadable.
    pub min_frequency_mhz: Option<f64>,

    /// `scaling_max_freq` of cpu0 in MHz. `None` when unreadable.
    pub max_frequency_mhz: Option<f64>,

    /// Cache sizes in bytes keyed by `"L{level} {type}"`, e.g. `"L1 Data"`.
    /// Only levels that could be measured are present.
    pub cache_sizes: BTreeMap<String, u64>,

    /// Every token of every `flags` line, in file order, duplicates kept.
    pub cpu_flags: Vec<String>,
}

/// RAM and swap usage.
///
/// Source: `/proc/meminfo` (values converted from kB to bytes).
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct MemorySnapshot {
    pub total_ram: u64,
    pub free_ram: u64,
    pub available_ram: u64,
    pub buffers: u64,
    pub cached: u64,
    pub shmem: u64,
    pub total_swap: u64,
    pub free_swap: u64,
    /// `total - free - buffers - cached`, floored at zero.
    pub used_ram: u64,
    /// `total_swap - free_swap`, floored at zero.
    pub used_swap: u64,
}

impl MemorySnapshot {
    pub fn ram_usage_percent(&self) -> f64 {
        percent(self.used_ram, self.total_ram)
    }

    pub fn swap_usage_percent(&self) -> f64 {
        percent(self.used_swap, self.total_swap)
    }
}

/// One mounted, non-pseudo filesystem.
///
/// Sources: `/etc/mtab` for names, `statvfs(3)` for sizes.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct DiskSnapshot {
    pub device: String,
    pub mount_point: String,
    pub fs_type: String,
    /// `f_blocks * f_frsize`
    pub total_size: u64,
    /// `f_bfree * f_frsize`
    pub free_space: u64,
    /// `f_bavail * f_frsize`
    pub available_space: u64,
}

impl DiskSnapshot {
    /// Bytes in use, `total - free`.
    pub fn used_space(&self) -> u64 {
        self.total_size.saturating_sub(self.free_space)
    }

    pub fn usage_percent(&self) -> f64 {
        percent(self.used_space(), self.total_size)
    }
}

/// One IPv4-bearing network interface.
///
/// Sources: `getifaddrs(3)`, `SIOCGIFHWADDR`/`SIOCGIWNAME` ioctls, `/proc/net/dev`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct NetworkInterfaceSnapshot {
    pub name: String,
    pub ip_address: String,
    /// Lowercase colon-separated hex. Empty if the hardware address is unknown.
    pub mac_address: String,
    pub netmask: String,
    /// Empty unless the interface has the broadcast flag.
    pub broadcast: String,
    pub is_up: bool,
    pub is_loopback: bool,
    pub is_wireless: bool,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub tx_packets: u64,
    pub rx_errors: u64,
    pub tx_errors: u64,
}
