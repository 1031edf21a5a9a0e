//! IPv4 network interfaces with link details and traffic counters.

mod probe;

pub use probe::{AddressEntry, LinkFlags, LinkProbe, SystemLinkProbe};

use std::net::IpAddr;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::collector::procfs::{NetDevStats, parse_net_dev};
use crate::collector::traits::{FileSystem, Refresh};
use crate::config::CollectorConfig;
use crate::fmt;
use crate::model::NetworkInterfaceSnapshot;

/// Collects network interfaces.
pub struct NetworkCollector<F: FileSystem, P: LinkProbe> {
    fs: F,
    probe: P,
    net_dev_path: PathBuf,
    interfaces: Vec<NetworkInterfaceSnapshot>,
}

impl<F: FileSystem, P: LinkProbe> NetworkCollector<F, P> {
    /// Creates the collector and performs the initial collection.
    pub fn new(fs: F, probe: P, config: &CollectorConfig) -> Self {
        let mut collector = Self {
            fs,
            probe,
            net_dev_path: config.net_dev_path(),
            interfaces: Vec::new(),
        };
        collector.refresh();
        collector
    }

    /// Builds a fresh interface list.
    ///
    /// One record per interface name, taken from its first IPv4 address in
    /// enumeration order. Interfaces with only IPv6 addresses are not listed.
    pub fn collect(&self) -> Vec<NetworkInterfaceSnapshot> {
        let entries = match self.probe.addresses() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "cannot enumerate interface addresses");
                return Vec::new();
            }
        };

        let counters = match self.fs.read_to_string(&self.net_dev_path) {
            Ok(content) => parse_net_dev(&content),
            Err(e) => {
                debug!(path = %self.net_dev_path.display(), error = %e, "no interface counters");
                Vec::new()
            }
        };

        let mut interfaces: Vec<NetworkInterfaceSnapshot> = Vec::new();
        for entry in entries {
            if !matches!(entry.address, Some(IpAddr::V4(_))) {
                continue;
            }
            if interfaces.iter().any(|iface| iface.name == entry.name) {
                continue;
            }

            let stats = counters
                .iter()
                .find(|s| s.interface == entry.name)
                .cloned()
                .unwrap_or_default();

            interfaces.push(self.build(entry, &stats));
        }

        interfaces
    }

    fn build(&self, entry: AddressEntry, stats: &NetDevStats) -> NetworkInterfaceSnapshot {
        let broadcast = if entry.flags.broadcast {
            entry.broadcast.map(|b| b.to_string()).unwrap_or_default()
        } else {
            String::new()
        };

        NetworkInterfaceSnapshot {
            ip_address: entry.address.map(|a| a.to_string()).unwrap_or_default(),
            mac_address: self
                .probe
                .hardware_address(&entry.name)
                .map(|mac| format_mac(&mac))
                .unwrap_or_default(),
            netmask: entry.netmask.map(|m| m.to_string()).unwrap_or_default(),
            broadcast,
            is_up: entry.flags.up,
            is_loopback: entry.flags.loopback,
            is_wireless: self.probe.is_wireless(&entry.name),
            rx_bytes: stats.rx_bytes,
            tx_bytes: stats.tx_bytes,
            rx_packets: stats.rx_packets,
            tx_packets: stats.tx_packets,
            rx_errors: stats.rx_errs,
            tx_errors: stats.tx_errs,
            name: entry.name,
        }
    }

    /// Current interface list.
    pub fn get_interfaces(&self) -> &[NetworkInterfaceSnapshot] {
        &self.interfaces
    }

    /// Byte count as `"<value> <unit>"`, see [`fmt::format_bytes`].
    pub fn format_bytes(&self, bytes: u64) -> String {
        fmt::format_bytes(bytes)
    }
}

impl<F: FileSystem, P: LinkProbe> Refresh for NetworkCollector<F, P> {
    fn refresh(&mut self) {
        self.interfaces = self.collect();
    }
}

/// Lowercase colon-separated hex, e.g. `52:54:00:12:34:56`.
pub fn format_mac(mac: &[u8; 6]) -> String {
    mac.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockFs, MockLinkProbe};
    use std::io;

    fn collector(fs: MockFs, probe: MockLinkProbe) -> NetworkCollector<MockFs, MockLinkProbe> {
        NetworkCollector::new(fs, probe, &CollectorConfig::default())
    }

    #[test]
    fn test_typical_system() {
        let net = collector(MockFs::typical_system(), MockLinkProbe::typical_system());
        let ifaces = net.get_interfaces();

        let names: Vec<&str> = ifaces.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["lo", "eth0", "wlan0"]);

        let lo = &ifaces[0];
        assert!(lo.is_loopback);
        assert!(lo.is_up);
        assert_eq!(lo.ip_address, "127.0.0.1");
        assert_eq!(lo.netmask, "255.0.0.0");
        assert_eq!(lo.broadcast, "");
        assert_eq!(lo.mac_address, "00:00:00:00:00:00");

        let eth0 = &ifaces[1];
        assert_eq!(eth0.ip_address, "192.168.1.100");
        assert_eq!(eth0.broadcast, "192.168.1.255");
        assert_eq!(eth0.mac_address, "52:54:00:ab:cd:ef");
        assert!(!eth0.is_wireless);
        assert_eq!(eth0.rx_bytes, 9876543210);
        assert_eq!(eth0.rx_packets, 5000000);
        assert_eq!(eth0.rx_errors, 10);
        assert_eq!(eth0.tx_bytes, 1234567890);
        assert_eq!(eth0.tx_packets, 2000000);
        assert_eq!(eth0.tx_errors, 2);

        let wlan0 = &ifaces[2];
        assert!(wlan0.is_wireless);
        assert!(!wlan0.is_up);
        assert_eq!(wlan0.mac_address, "");
    }

    #[test]
    fn test_first_ipv4_per_name_wins() {
        let mut probe = MockLinkProbe::new();
        probe.add_ipv6("eth0", "fe80::1");
        probe.add_ipv4("eth0", "10.0.0.5", "255.255.255.0", Some("10.0.0.255"));
        probe.add_ipv4("eth0", "10.0.1.5", "255.255.255.0", Some("10.0.1.255"));
        probe.add_link("eth1");

        let net = collector(MockFs::new(), probe);
        let ifaces = net.get_interfaces();
        assert_eq!(ifaces.len(), 1);
        assert_eq!(ifaces[0].ip_address, "10.0.0.5");
    }

    #[test]
    fn test_broadcast_requires_flag() {
        let mut probe = MockLinkProbe::new();
        probe.add_entry(AddressEntry {
            name: "tun0".into(),
            address: Some("10.8.0.2".parse().unwrap()),
            netmask: Some("255.255.255.255".parse().unwrap()),
            broadcast: Some("10.8.0.255".parse().unwrap()),
            flags: LinkFlags {
                up: true,
                loopback: false,
                broadcast: false,
            },
        });

        let net = collector(MockFs::new(), probe);
        assert_eq!(net.get_interfaces()[0].broadcast, "");
    }

    #[test]
    fn test_missing_counters_stay_zero() {
        let mut probe = MockLinkProbe::new();
        probe.add_ipv4("veth1", "172.17.0.1", "255.255.0.0", None);

        let net = collector(MockFs::typical_system(), probe);
        let iface = &net.get_interfaces()[0];
        assert_eq!(iface.rx_bytes, 0);
        assert_eq!(iface.tx_errors, 0);
    }

    #[test]
    fn test_enumeration_failure_gives_empty_list() {
        let probe = MockLinkProbe::failing(io::ErrorKind::PermissionDenied);
        let net = collector(MockFs::typical_system(), probe);
        assert!(net.get_interfaces().is_empty());
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let mut net = collector(MockFs::typical_system(), MockLinkProbe::typical_system());
        let first = net.get_interfaces().to_vec();
        net.refresh();
        assert_eq!(net.get_interfaces(), first.as_slice());
    }

    #[test]
    fn test_format_mac() {
        assert_eq!(format_mac(&[0x52, 0x54, 0, 0xAB, 0xcd, 0xEF]), "52:54:00:ab:cd:ef");
    }

    #[test]
    fn test_format_bytes() {
        let net = collector(MockFs::new(), MockLinkProbe::new());
        assert_eq!(net.format_bytes(0), "0.00 B");
        assert_eq!(net.format_bytes(1024), "1.00 KB");
    }
}
