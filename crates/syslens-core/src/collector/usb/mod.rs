//! USB devices from `lsusb -v` merged with `/sys/bus/usb/devices`.
//!
//! There is no cached state: every [`UsbCollector::get_usb_devices`] call
//! enumerates both sources again.

mod parser;

pub use parser::{DeviceHeader, LsusbLine, parse_lsusb, parse_lsusb_line, speed_label};

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::collector::command::CommandRunner;
use crate::collector::traits::FileSystem;
use crate::config::CollectorConfig;
use crate::model::UsbDeviceSnapshot;

/// Reads USB devices from sysfs, sorted by directory name.
///
/// Only entries whose name contains `-` and that expose `idVendor` are
/// devices (`usb1` is a root hub, `1-1:1.0` an interface). Entries without
/// both vendor and product ids are dropped.
pub fn scan_sysfs<F: FileSystem>(fs: &F, dir: &Path) -> Vec<UsbDeviceSnapshot> {
    let mut entries = match fs.read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(path = %dir.display(), error = %e, "no sysfs usb devices");
            return Vec::new();
        }
    };
    entries.sort();

    entries
        .iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?;
            if !name.contains('-') || !fs.exists(&path.join("idVendor")) {
                return None;
            }

            let speed = fs
                .read_to_string(&path.join("speed"))
                .map(|s| format!("{} Mbps", s.trim()))
                .unwrap_or_default();

            let device = UsbDeviceSnapshot {
                device_name: name.to_string(),
                manufacturer: fs.read_trimmed(&path.join("manufacturer")),
                product: fs.read_trimmed(&path.join("product")),
                serial_number: fs.read_trimmed(&path.join("serial")),
                vendor_id: fs.read_trimmed(&path.join("idVendor")),
                product_id: fs.read_trimmed(&path.join("idProduct")),
                bus_number: fs.read_trimmed(&path.join("busnum")),
                device_address: fs.read_trimmed(&path.join("devnum")),
                speed,
                usb_version: fs.read_trimmed(&path.join("version")),
                is_connected: true,
            };

            (!device.vendor_id.is_empty() && !device.product_id.is_empty()).then_some(device)
        })
        .collect()
}

/// Merges sysfs devices into the `lsusb` list.
///
/// A sysfs device matching an existing one (see
/// [`UsbDeviceSnapshot::same_device`]) only fills that device's empty
/// descriptive fields; otherwise it is appended.
pub fn merge_devices(
    mut devices: Vec<UsbDeviceSnapshot>,
    sysfs: Vec<UsbDeviceSnapshot>,
) -> Vec<UsbDeviceSnapshot> {
    for extra in sysfs {
        match devices.iter_mut().find(|d| d.same_device(&extra)) {
            Some(existing) => backfill(existing, extra),
            None => devices.push(extra),
        }
    }
    devices
}

fn backfill(target: &mut UsbDeviceSnapshot, source: UsbDeviceSnapshot) {
    fn fill(field: &mut String, value: String) {
        if field.is_empty() {
            *field = value;
        }
    }
    fill(&mut target.manufacturer, source.manufacturer);
    fill(&mut target.product, source.product);
    fill(&mut target.serial_number, source.serial_number);
    fill(&mut target.speed, source.speed);
    fill(&mut target.usb_version, source.usb_version);
}

/// Enumerates attached USB devices.
pub struct UsbCollector<F: FileSystem, R: CommandRunner> {
    fs: F,
    runner: R,
    lsusb: String,
    devices_dir: PathBuf,
    timeout: Option<Duration>,
}

impl<F: FileSystem, R: CommandRunner> UsbCollector<F, R> {
    pub fn new(fs: F, runner: R, config: &CollectorConfig) -> Self {
        Self {
            fs,
            runner,
            lsusb: config.lsusb.clone(),
            devices_dir: config.usb_devices_dir(),
            timeout: config.query_timeout(),
        }
    }

    /// Devices reported by `lsusb -v`; empty when it cannot be run.
    pub fn lsusb_devices(&self) -> Vec<UsbDeviceSnapshot> {
        match self.runner.run(&self.lsusb, &["-v"], self.timeout) {
            Ok(output) => {
                if !output.success() {
                    debug!(code = ?output.code, "lsusb exited non-zero");
                }
                parse_lsusb(&output.stdout)
            }
            Err(e) => {
                warn!(error = %e, "cannot run lsusb");
                Vec::new()
            }
        }
    }

    /// Devices found under the sysfs USB device directory.
    pub fn sysfs_devices(&self) -> Vec<UsbDeviceSnapshot> {
        scan_sysfs(&self.fs, &self.devices_dir)
    }

    /// Fresh enumeration of both sources, merged: `lsusb` devices in output
    /// order, then unmatched sysfs devices in name order.
    pub fn get_usb_devices(&self) -> Vec<UsbDeviceSnapshot> {
        let devices = merge_devices(self.lsusb_devices(), self.sysfs_devices());
        debug!(count = devices.len(), "enumerated usb devices");
        devices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::command::CommandOutput;
    use crate::collector::mock::{MockFs, MockRunner};

    fn collector(fs: MockFs, runner: MockRunner) -> UsbCollector<MockFs, MockRunner> {
        UsbCollector::new(fs, runner, &CollectorConfig::default())
    }

    #[test]
    fn test_typical_system_merge() {
        let usb = collector(MockFs::typical_system(), MockRunner::typical_system());
        let devices = usb.get_usb_devices();

        let names: Vec<&str> = devices.iter().map(|d| d.device_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "USB Device 1d6b:0002",
                "USB Device 046d:c52b",
                "USB Device 0781:5581",
                "2-1",
            ]
        );

        // lsusb had no serial for the receiver; sysfs fills it.
        let receiver = &devices[1];
        assert_eq!(receiver.serial_number, "4A3B2C1D");
        // lsusb's own values are kept.
        assert_eq!(receiver.manufacturer, "Logitech, Inc.");
        assert_eq!(receiver.speed, "Low Speed");

        // lsusb had no descriptor details for the stick (not readable); sysfs fills them.
        let stick = &devices[2];
        assert_eq!(stick.manufacturer, "SanDisk");
        assert_eq!(stick.speed, "480 Mbps");
        assert_eq!(stick.usb_version, "2.10");

        let webcam = &devices[3];
        assert_eq!(webcam.vendor_id, "0c45");
        assert_eq!(webcam.bus_number, "2");
        assert_eq!(webcam.speed, "12 Mbps");
        assert!(devices.iter().all(|d| d.is_connected));
    }

    #[test]
    fn test_duplicate_appears_once() {
        let lsusb = vec![UsbDeviceSnapshot {
            vendor_id: "0781".into(),
            product_id: "5581".into(),
            bus_number: "002".into(),
            device_address: "004".into(),
            manufacturer: "SanDisk Corp.".into(),
            ..UsbDeviceSnapshot::default()
        }];
        let sysfs = vec![UsbDeviceSnapshot {
            vendor_id: "0781".into(),
            product_id: "5581".into(),
            bus_number: "2".into(),
            device_address: "4".into(),
            manufacturer: "SanDisk".into(),
            product: "Ultra".into(),
            ..UsbDeviceSnapshot::default()
        }];

        let merged = merge_devices(lsusb, sysfs);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].manufacturer, "SanDisk Corp.");
        assert_eq!(merged[0].product, "Ultra");
        assert_eq!(merged[0].bus_number, "002");
    }

    #[test]
    fn test_lsusb_missing_uses_sysfs_only() {
        let usb = collector(MockFs::typical_system(), MockRunner::new());
        let devices = usb.get_usb_devices();
        let names: Vec<&str> = devices.iter().map(|d| d.device_name.as_str()).collect();
        assert_eq!(names, vec!["1-2", "2-1", "2-3"]);
    }

    #[test]
    fn test_sysfs_missing_uses_lsusb_only() {
        let usb = collector(MockFs::new(), MockRunner::typical_system());
        assert_eq!(usb.get_usb_devices().len(), 3);
    }

    #[test]
    fn test_lsusb_nonzero_exit_still_parsed() {
        let runner = MockRunner::new();
        runner.set_output(
            "lsusb",
            &["-v"],
            CommandOutput {
                code: Some(1),
                stdout: "Bus 001 Device 001: ID 1d6b:0002 Linux Foundation 2.0 root hub\n".into(),
            },
        );
        let usb = collector(MockFs::new(), runner);
        assert_eq!(usb.get_usb_devices().len(), 1);
    }

    #[test]
    fn test_sysfs_requires_both_ids() {
        let mut fs = MockFs::new();
        let dir = "/sys/bus/usb/devices";
        fs.add_file(format!("{dir}/3-1/idVendor"), "abcd\n");
        fs.add_file(format!("{dir}/3-2/idVendor"), "abcd\n");
        fs.add_file(format!("{dir}/3-2/idProduct"), "1234\n");
        fs.add_file(format!("{dir}/3-2/speed"), "\n");
        fs.add_file(format!("{dir}/usb3/idVendor"), "1d6b\n");
        fs.add_file(format!("{dir}/usb3/idProduct"), "0003\n");
        fs.add_file(format!("{dir}/3-2:1.0/bInterfaceClass"), "08\n");

        let devices = scan_sysfs(&fs, Path::new(dir));
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].device_name, "3-2");
        assert_eq!(devices[0].speed, " Mbps");
        assert_eq!(devices[0].manufacturer, "");
    }

    #[test]
    fn test_every_call_is_live() {
        let runner = MockRunner::typical_system();
        let usb = collector(MockFs::typical_system(), runner.clone());
        let first = usb.get_usb_devices();
        let second = usb.get_usb_devices();
        assert_eq!(first, second);
        assert_eq!(runner.calls().len(), 2);
    }
}
