//! Collector configuration.
//!
//! Every collector reads its paths and external programs from a
//! [`CollectorConfig`] built once by the caller. Paths are kept configurable so
//! the same collectors can run against a chroot, a container's bind-mounted
//! `/proc`, or the in-memory mock filesystem used by tests.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Paths and external programs used by the collectors.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct CollectorConfig {
    /// Root of the proc filesystem.
    pub proc_root: PathBuf,
    /// Root of the sysfs filesystem.
    pub sys_root: PathBuf,
    /// Mount table.
    pub mtab_path: PathBuf,
    /// Service manager CLI.
    pub systemctl: String,
    /// USB listing CLI.
    pub lsusb: String,
    /// Program used to run service control verbs with elevated privileges.
    pub elevate: String,
    /// Time limit for read-only queries (0 = wait forever).
    pub query_timeout_secs: u64,
    /// Time limit for state-changing service operations (0 = wait forever).
    /// Longer than the query limit because `pkexec` may prompt for a password.
    pub control_timeout_secs: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
            sys_root: PathBuf::from("/sys"),
            mtab_path: PathBuf::from("/etc/mtab"),
            systemctl: "systemctl".to_string(),
            lsusb: "lsusb".to_string(),
            elevate: "pkexec".to_string(),
            query_timeout_secs: 30,
            control_timeout_secs: 120,
        }
    }
}

impl CollectorConfig {
    pub fn query_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.query_timeout_secs)
    }

    pub fn control_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.control_timeout_secs)
    }

    /// `/proc/cpuinfo`
    pub fn cpuinfo_path(&self) -> PathBuf {
        self.proc_root.join("cpuinfo")
    }

    /// `/proc/meminfo`
    pub fn meminfo_path(&self) -> PathBuf {
        self.proc_root.join("meminfo")
    }

    /// `/proc/net/dev`
    pub fn net_dev_path(&self) -> PathBuf {
        self.proc_root.join("net/dev")
    }

    /// `/sys/devices/system/cpu`
    pub fn cpu_root(&self) -> PathBuf {
        self.sys_root.join("devices/system/cpu")
    }

    /// `/sys/bus/usb/devices`
    pub fn usb_devices_dir(&self) -> PathBuf {
        self.sys_root.join("bus/usb/devices")
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_default_paths() {
        let config = CollectorConfig::default();
        assert_eq!(config.cpuinfo_path(), Path::new("/proc/cpuinfo"));
        assert_eq!(config.net_dev_path(), Path::new("/proc/net/dev"));
        assert_eq!(config.cpu_root(), Path::new("/sys/devices/system/cpu"));
        assert_eq!(config.usb_devices_dir(), Path::new("/sys/bus/usb/devices"));
    }

    #[test]
    fn test_zero_timeout_means_unbounded() {
        let config = CollectorConfig {
            query_timeout_secs: 0,
            control_timeout_secs: 5,
            ..CollectorConfig::default()
        };
        assert_eq!(config.query_timeout(), None);
        assert_eq!(config.control_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: CollectorConfig =
            serde_json::from_str(r#"{"proc_root": "/host/proc", "lsusb": "/usr/bin/lsusb"}"#)
                .unwrap();
        assert_eq!(config.proc_root, PathBuf::from("/host/proc"));
        assert_eq!(config.lsusb, "/usr/bin/lsusb");
        assert_eq!(config.sys_root, PathBuf::from("/sys"));
        assert_eq!(config.elevate, "pkexec");
    }
}
