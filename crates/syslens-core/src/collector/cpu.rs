//! Processor description from `/proc/cpuinfo` and cpu0's sysfs attributes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::collector::procfs::{
    parse_cache_size, parse_cpu_list, parse_cpuinfo, parse_frequency_mhz,
};
use crate::collector::traits::{FileSystem, Refresh};
use crate::config::CollectorConfig;
use crate::model::CpuSnapshot;

/// Cache levels probed under `cpu0/cache/index{N}`, labelled `L{N+1}`.
const CACHE_LEVELS: usize = 3;

/// Collects processor information.
pub struct CpuCollector<F: FileSystem> {
    fs: F,
    cpuinfo_path: PathBuf,
    cpu_root: PathBuf,
    snapshot: CpuSnapshot,
}

impl<F: FileSystem> CpuCollector<F> {
    /// Creates the collector and performs the initial collection.
    pub fn new(fs: F, config: &CollectorConfig) -> Self {
        let mut collector = Self {
            fs,
            cpuinfo_path: config.cpuinfo_path(),
            cpu_root: config.cpu_root(),
            snapshot: CpuSnapshot::default(),
        };
        collector.refresh();
        collector
    }

    /// Builds a fresh snapshot without touching the stored one.
    pub fn collect(&self) -> CpuSnapshot {
        let logical_cores = self.online_cpus();

        let info = match self.fs.read_to_string(&self.cpuinfo_path) {
            Ok(content) => parse_cpuinfo(&content),
            Err(e) => {
                warn!(path = %self.cpuinfo_path.display(), error = %e, "cannot read cpuinfo");
                Default::default()
            }
        };

        let physical_cores = if info.physical_ids.is_empty() {
            logical_cores
        } else {
            info.physical_ids.len()
        };

        let cpufreq = self.cpu_root.join("cpu0/cpufreq");
        CpuSnapshot {
            processor_name: info.processor_name,
            vendor_id: info.vendor_id,
            physical_cores,
            logical_cores,
            current_frequency_mhz: self.read_frequency(&cpufreq.join("scaling_cur_freq")),
            min_frequency_mhz: self.read_frequency(&cpufreq.join("scaling_min_freq")),
            max_frequency_mhz: self.read_frequency(&cpufreq.join("scaling_max_freq")),
            cache_sizes: self.read_cache_sizes(),
            cpu_flags: info.flags,
        }
    }

    /// Last collected snapshot.
    pub fn snapshot(&self) -> &CpuSnapshot {
        &self.snapshot
    }

    pub fn processor_name(&self) -> &str {
        &self.snapshot.processor_name
    }

    pub fn vendor_id(&self) -> &str {
        &self.snapshot.vendor_id
    }

    pub fn physical_cores(&self) -> usize {
        self.snapshot.physical_cores
    }

    pub fn logical_cores(&self) -> usize {
        self.snapshot.logical_cores
    }

    /// Current frequency in MHz, `0.0` when unavailable.
    pub fn current_frequency_mhz(&self) -> f64 {
        self.snapshot.current_frequency_mhz.unwrap_or(0.0)
    }

    /// Minimum scaling frequency in MHz, `0.0` when unavailable.
    pub fn min_frequency_mhz(&self) -> f64 {
        self.snapshot.min_frequency_mhz.unwrap_or(0.0)
    }

    /// Maximum scaling frequency in MHz, `0.0` when unavailable.
    pub fn max_frequency_mhz(&self) -> f64 {
        self.snapshot.max_frequency_mhz.unwrap_or(0.0)
    }

    pub fn cache_sizes(&self) -> &BTreeMap<String, u64> {
        &self.snapshot.cache_sizes
    }

    pub fn cpu_flags(&self) -> &[String] {
        &self.snapshot.cpu_flags
    }

    /// Number of online processors from `cpu/online`, falling back to the
    /// parallelism reported by the standard library.
    fn online_cpus(&self) -> usize {
        let online = self.fs.read_trimmed(&self.cpu_root.join("online"));
        if let Some(count) = parse_cpu_list(&online) {
            return count;
        }
        debug!("cpu/online unavailable, using available_parallelism");
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(0)
    }

    fn read_frequency(&self, path: &Path) -> Option<f64> {
        parse_frequency_mhz(&self.fs.read_trimmed(path))
    }

    fn read_cache_sizes(&self) -> BTreeMap<String, u64> {
        let mut sizes = BTreeMap::new();
        let cache_dir = self.cpu_root.join("cpu0/cache");

        for index in 0..CACHE_LEVELS {
            let dir = cache_dir.join(format!("index{}", index));
            if !self.fs.exists(&dir) {
                continue;
            }

            let Some(size) = parse_cache_size(&self.fs.read_trimmed(&dir.join("size"))) else {
                continue;
            };
            let kind = self.fs.read_trimmed(&dir.join("type"));
            if kind.is_empty() {
                continue;
            }

            sizes.insert(format!("L{} {}", index + 1, kind), size);
        }

        sizes
    }
}

impl<F: FileSystem> Refresh for CpuCollector<F> {
    fn refresh(&mut self) {
        self.snapshot = self.collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    fn collector(fs: MockFs) -> CpuCollector<MockFs> {
        CpuCollector::new(fs, &CollectorConfig::default())
    }

    #[test]
    fn test_typical_system() {
        let cpu = collector(MockFs::typical_system());

        assert_eq!(cpu.processor_name(), "Intel(R) Core(TM) i7-8650U CPU @ 1.90GHz");
        assert_eq!(cpu.vendor_id(), "GenuineIntel");
        assert_eq!(cpu.physical_cores(), 1);
        assert_eq!(cpu.logical_cores(), 4);
        assert_eq!(cpu.current_frequency_mhz(), 2100.0);
        assert_eq!(cpu.min_frequency_mhz(), 400.0);
        assert_eq!(cpu.max_frequency_mhz(), 4200.0);

        let caches = cpu.cache_sizes();
        assert_eq!(caches.len(), 3);
        assert_eq!(caches["L1 Data"], 32 * 1024);
        assert_eq!(caches["L2 Instruction"], 32 * 1024);
        assert_eq!(caches["L3 Unified"], 256 * 1024);

        // One flags line per logical CPU, duplicates kept.
        assert_eq!(cpu.cpu_flags().len(), 4 * 4);
        assert_eq!(cpu.cpu_flags()[0], "fpu");
    }

    #[test]
    fn test_physical_cores_fall_back_to_online_count() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/cpuinfo",
            "processor\t: 0\nmodel name\t: ARMv8 Processor\nprocessor\t: 1\n",
        );
        fs.add_file("/sys/devices/system/cpu/online", "0-5\n");

        let cpu = collector(fs);
        assert_eq!(cpu.logical_cores(), 6);
        assert_eq!(cpu.physical_cores(), 6);
    }

    #[test]
    fn test_missing_sysfs_degrades_to_defaults() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/cpuinfo", "model name\t: Virtual CPU\n");
        fs.add_file("/sys/devices/system/cpu/online", "0\n");

        let cpu = collector(fs);
        assert_eq!(cpu.processor_name(), "Virtual CPU");
        assert_eq!(cpu.current_frequency_mhz(), 0.0);
        assert_eq!(cpu.snapshot().current_frequency_mhz, None);
        assert!(cpu.cache_sizes().is_empty());
        assert!(cpu.cpu_flags().is_empty());
    }

    #[test]
    fn test_unparsable_frequency_is_unmeasured() {
        let mut fs = MockFs::new();
        fs.add_file("/sys/devices/system/cpu/online", "0\n");
        fs.add_file(
            "/sys/devices/system/cpu/cpu0/cpufreq/scaling_cur_freq",
            "<unknown>\n",
        );
        fs.add_file(
            "/sys/devices/system/cpu/cpu0/cpufreq/scaling_max_freq",
            "0\n",
        );

        let cpu = collector(fs);
        assert_eq!(cpu.snapshot().current_frequency_mhz, None);
        assert_eq!(cpu.snapshot().max_frequency_mhz, Some(0.0));
    }

    #[test]
    fn test_cache_level_skipped_without_size_or_type() {
        let mut fs = MockFs::new();
        fs.add_file("/sys/devices/system/cpu/online", "0\n");
        let cache = "/sys/devices/system/cpu/cpu0/cache";
        fs.add_file(format!("{cache}/index0/size"), "48K\n");
        fs.add_file(format!("{cache}/index0/type"), "Data\n");
        fs.add_file(format!("{cache}/index1/size"), "garbage\n");
        fs.add_file(format!("{cache}/index1/type"), "Instruction\n");
        fs.add_file(format!("{cache}/index2/size"), "2M\n");

        let cpu = collector(fs);
        let caches = cpu.cache_sizes();
        assert_eq!(caches.len(), 1);
        assert_eq!(caches["L1 Data"], 48 * 1024);
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let mut cpu = collector(MockFs::typical_system());
        let first = cpu.snapshot().clone();
        cpu.refresh();
        assert_eq!(cpu.snapshot(), &first);
    }
}
