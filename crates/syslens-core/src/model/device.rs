//! Service and USB device snapshots built from external command output.

use serde::{Deserialize, Serialize};

/// Coarse service state derived from `ActiveState`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Default)]
pub enum ServiceStatus {
    Active,
    Inactive,
    Failed,
    #[default]
    Unknown,
}

impl ServiceStatus {
    /// Exact, case-sensitive match on the unit's active state.
    pub fn from_active_state(active_state: &str) -> Self {
        match active_state {
            "active" => ServiceStatus::Active,
            "inactive" => ServiceStatus::Inactive,
            "failed" => ServiceStatus::Failed,
            _ => ServiceStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Active => "active",
            ServiceStatus::Inactive => "inactive",
            ServiceStatus::Failed => "failed",
            ServiceStatus::Unknown => "unknown",
        }
    }
}

/// One systemd service unit.
///
/// Source: `systemctl list-units` (list view) or `systemctl show` (detail view).
/// The list view never fills `unit_file_state`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct ServiceSnapshot {
    pub name: String,
    pub description: String,
    pub load_state: String,
    pub active_state: String,
    pub sub_state: String,
    pub unit_file_state: String,
    pub status: ServiceStatus,
}

/// One attached USB device.
///
/// Sources: `lsusb -v` and `/sys/bus/usb/devices/*`, merged.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct UsbDeviceSnapshot {
    pub device_name: String,
    pub manufacturer: String,
    pub product: String,
    pub serial_number: String,
    /// Hex vendor id without `0x`, e.g. `"1d6b"`.
    pub vendor_id: String,
    pub product_id: String,
    pub bus_number: String,
    pub device_address: String,
    pub speed: String,
    pub usb_version: String,
    /// Always `true`: only currently enumerated devices are reported.
    pub is_connected: bool,
}

impl UsbDeviceSnapshot {
    /// Two records describe the same device when ids and bus position agree.
    ///
    /// `lsusb` zero-pads bus and device numbers (`001`) while sysfs does not
    /// (`1`), so those compare numerically when both sides parse.
    pub fn same_device(&self, other: &UsbDeviceSnapshot) -> bool {
        self.vendor_id.eq_ignore_ascii_case(&other.vendor_id)
            && self.product_id.eq_ignore_ascii_case(&other.product_id)
            && same_number(&self.bus_number, &other.bus_number)
            && same_number(&self.device_address, &other.device_address)
    }
}

fn same_number(a: &str, b: &str) -> bool {
    match (a.parse::<u32>(), b.parse::<u32>()) {
        (Ok(x), Ok(y)) => x == y,
        _ => a == b,
    }
}
