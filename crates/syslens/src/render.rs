//! Plain-text rendering of a [`SystemReport`].

use std::fmt::Write;

use syslens_core::collector::{MemorySample, SystemReport};
use syslens_core::fmt::{format_bytes, format_cache_size, format_frequency};
use syslens_core::model::{ServiceSnapshot, UsbDeviceSnapshot};

/// Report sections that can be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Section {
    Cpu,
    Memory,
    Disks,
    Network,
    Services,
    Usb,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Cpu,
        Section::Memory,
        Section::Disks,
        Section::Network,
        Section::Services,
        Section::Usb,
    ];
}

/// Renders the selected sections in the given order.
pub fn render_report(report: &SystemReport, sections: &[Section]) -> String {
    let mut out = String::new();
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match section {
            Section::Cpu => render_cpu(&mut out, report),
            Section::Memory => render_memory(&mut out, report),
            Section::Disks => render_disks(&mut out, report),
            Section::Network => render_network(&mut out, report),
            Section::Services => render_services(&mut out, &report.services),
            Section::Usb => render_usb(&mut out, &report.usb_devices),
        }
    }
    out
}

fn render_cpu(out: &mut String, report: &SystemReport) {
    let cpu = &report.cpu;
    let _ = writeln!(out, "CPU");
    let _ = writeln!(out, "  Processor:  {}", cpu.processor_name);
    let _ = writeln!(out, "  Vendor:     {}", cpu.vendor_id);
    let _ = writeln!(
        out,
        "  Cores:      {} physical, {} logical",
        cpu.physical_cores, cpu.logical_cores
    );
    let _ = writeln!(
        out,
        "  Frequency:  {} (min {}, max {})",
        format_frequency(cpu.current_frequency_mhz),
        format_frequency(cpu.min_frequency_mhz),
        format_frequency(cpu.max_frequency_mhz)
    );
    for (level, size) in &cpu.cache_sizes {
        let _ = writeln!(out, "  {:<12}{}", format!("{}:", level), format_cache_size(*size));
    }
    let _ = writeln!(out, "  Flags:      {}", cpu.cpu_flags.len());
}

fn render_memory(out: &mut String, report: &SystemReport) {
    let mem = &report.memory;
    let _ = writeln!(out, "Memory");
    let _ = writeln!(
        out,
        "  RAM:   {} / {} ({:.1}%)",
        format_bytes(mem.used_ram),
        format_bytes(mem.total_ram),
        mem.ram_usage_percent()
    );
    let _ = writeln!(out, "  Avail: {}", format_bytes(mem.available_ram));
    let _ = writeln!(
        out,
        "  Swap:  {} / {} ({:.1}%)",
        format_bytes(mem.used_swap),
        format_bytes(mem.total_swap),
        mem.swap_usage_percent()
    );
    if let Some(trend) = memory_trend(&report.memory_history) {
        let _ = writeln!(out, "  Trend: {}", trend);
    }
}

/// Used-RAM change between the oldest and newest sample.
fn memory_trend(history: &[MemorySample]) -> Option<String> {
    let (first, last) = (history.first()?, history.last()?);
    if history.len() < 2 {
        return None;
    }
    let before = first.snapshot.used_ram;
    let after = last.snapshot.used_ram;
    let sign = if after >= before { '+' } else { '-' };
    Some(format!(
        "{}{} over {}s ({} samples)",
        sign,
        format_bytes(after.abs_diff(before)),
        last.timestamp - first.timestamp,
        history.len()
    ))
}

fn render_disks(out: &mut String, report: &SystemReport) {
    let _ = writeln!(out, "Disks");
    for disk in &report.disks {
        let _ = writeln!(
            out,
            "  {:<20} {:<16} {:<6} {:>12} used of {:>12} ({:.1}%)",
            disk.mount_point,
            disk.device,
            disk.fs_type,
            format_bytes(disk.used_space()),
            format_bytes(disk.total_size),
            disk.usage_percent()
        );
    }
}

fn render_network(out: &mut String, report: &SystemReport) {
    let _ = writeln!(out, "Network");
    for iface in &report.interfaces {
        let state = if iface.is_up { "up" } else { "down" };
        let kind = if iface.is_loopback {
            " loopback"
        } else if iface.is_wireless {
            " wireless"
        } else {
            ""
        };
        let _ = writeln!(out, "  {} ({}{})", iface.name, state, kind);
        let _ = writeln!(
            out,
            "    inet {} netmask {} broadcast {}",
            or_dash(&iface.ip_address),
            or_dash(&iface.netmask),
            or_dash(&iface.broadcast)
        );
        let _ = writeln!(out, "    ether {}", or_dash(&iface.mac_address));
        let _ = writeln!(
            out,
            "    rx {} ({} packets, {} errors)  tx {} ({} packets, {} errors)",
            format_bytes(iface.rx_bytes),
            iface.rx_packets,
            iface.rx_errors,
            format_bytes(iface.tx_bytes),
            iface.tx_packets,
            iface.tx_errors
        );
    }
}

fn render_services(out: &mut String, services: &[ServiceSnapshot]) {
    let _ = writeln!(out, "Services");
    for service in services {
        let _ = writeln!(
            out,
            "  {:<32} {:<9} {:<8} {}",
            service.name,
            service.status.as_str(),
            service.sub_state,
            service.description
        );
    }
}

/// Renders the detail view of one service.
pub fn render_service_details(service: &ServiceSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", service.name);
    let _ = writeln!(out, "  Description: {}", service.description);
    let _ = writeln!(out, "  Loaded:      {}", service.load_state);
    let _ = writeln!(
        out,
        "  Active:      {} ({})",
        service.active_state, service.sub_state
    );
    let _ = writeln!(out, "  Unit file:   {}", or_dash(&service.unit_file_state));
    out
}

fn render_usb(out: &mut String, devices: &[UsbDeviceSnapshot]) {
    let _ = writeln!(out, "USB");
    for device in devices {
        let _ = writeln!(
            out,
            "  Bus {} Device {}: {}:{} {}",
            device.bus_number,
            device.device_address,
            device.vendor_id,
            device.product_id,
            device.device_name
        );
        if !device.manufacturer.is_empty() || !device.product.is_empty() {
            let _ = writeln!(out, "    {} {}", device.manufacturer, device.product);
        }
        if !device.speed.is_empty() {
            let _ = writeln!(out, "    speed {}", device.speed);
        }
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syslens_core::collector::{Collector, MockFs, MockLinkProbe, MockRunner, MockSpaceProbe};
    use syslens_core::config::CollectorConfig;
    use syslens_core::model::MemorySnapshot;

    fn typical_report() -> SystemReport {
        Collector::new(
            MockFs::typical_system(),
            MockRunner::typical_system(),
            MockLinkProbe::typical_system(),
            MockSpaceProbe::typical_system(),
            &CollectorConfig::default(),
        )
        .report()
    }

    #[test]
    fn test_render_all_sections() {
        let text = render_report(&typical_report(), &Section::ALL);

        assert!(text.contains("Intel(R) Core(TM) i7-8650U CPU @ 1.90GHz"));
        assert!(text.contains("1 physical, 4 logical"));
        assert!(text.contains("2.10 GHz (min 400 MHz, max 4.20 GHz)"));
        assert!(text.contains("L1 Data:    32 KB"));
        assert!(text.contains("/boot/efi"));
        assert!(text.contains("ether 52:54:00:ab:cd:ef"));
        assert!(text.contains("wlan0 (down wireless)"));
        assert!(text.contains("nginx.service"));
        assert!(text.contains("046d:c52b"));
    }

    #[test]
    fn test_render_selected_sections_only() {
        let text = render_report(&typical_report(), &[Section::Memory]);
        assert!(text.starts_with("Memory\n"));
        assert!(!text.contains("CPU"));
        assert!(!text.contains("USB"));
    }

    #[test]
    fn test_memory_trend_needs_two_samples() {
        let sample = |timestamp, used_ram| MemorySample {
            timestamp,
            snapshot: MemorySnapshot {
                used_ram,
                ..MemorySnapshot::default()
            },
        };
        assert_eq!(memory_trend(&[]), None);
        assert_eq!(memory_trend(&[sample(100, 1024)]), None);
        assert_eq!(
            memory_trend(&[sample(100, 2048), sample(110, 1024)]).as_deref(),
            Some("-1.00 KB over 10s (2 samples)")
        );
    }

    #[test]
    fn test_service_details() {
        let service = ServiceSnapshot {
            name: "ssh.service".into(),
            description: "OpenBSD Secure Shell server".into(),
            load_state: "loaded".into(),
            active_state: "active".into(),
            sub_state: "running".into(),
            ..ServiceSnapshot::default()
        };
        let text = render_service_details(&service);
        assert!(text.contains("Active:      active (running)"));
        assert!(text.contains("Unit file:   -"));
    }
}
