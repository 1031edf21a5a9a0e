//! Snapshot models produced by the collectors.
//!
//! Every snapshot is a plain value: collectors build a fresh one on each
//! refresh and replace the previous one wholesale. Consumers clone what they
//! need and must not rely on identity across refreshes.

mod device;
mod system;

pub use device::{ServiceSnapshot, ServiceStatus, UsbDeviceSnapshot};
pub use system::{CpuSnapshot, DiskSnapshot, MemorySnapshot, NetworkInterfaceSnapshot};
