//! Mock network and filesystem-space probes.

use std::collections::{HashMap, HashSet};
use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use crate::collector::disk::{FsSpace, SpaceProbe};
use crate::collector::network::{AddressEntry, LinkFlags, LinkProbe};

/// Address list and link details held in memory.
#[derive(Debug, Clone, Default)]
pub struct MockLinkProbe {
    entries: Vec<AddressEntry>,
    macs: HashMap<String, [u8; 6]>,
    wireless: HashSet<String>,
    failure: Option<io::ErrorKind>,
}

fn parse_ip(addr: &str) -> Option<IpAddr> {
    addr.parse().ok()
}

impl MockLinkProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// A probe whose address enumeration fails with `kind`.
    pub fn failing(kind: io::ErrorKind) -> Self {
        Self {
            failure: Some(kind),
            ..Self::default()
        }
    }

    pub fn add_entry(&mut self, entry: AddressEntry) {
        self.entries.push(entry);
    }

    /// Adds an IPv4 address on an up interface. The broadcast flag is set
    /// when a broadcast address is given.
    pub fn add_ipv4(&mut self, name: &str, address: &str, netmask: &str, broadcast: Option<&str>) {
        self.add_entry(AddressEntry {
            name: name.to_string(),
            address: parse_ip(address),
            netmask: parse_ip(netmask),
            broadcast: broadcast.and_then(parse_ip),
            flags: LinkFlags {
                up: true,
                loopback: false,
                broadcast: broadcast.is_some(),
            },
        });
    }

    pub fn add_ipv6(&mut self, name: &str, address: &str) {
        self.add_entry(AddressEntry {
            name: name.to_string(),
            address: parse_ip(address),
            flags: LinkFlags {
                up: true,
                ..LinkFlags::default()
            },
            ..AddressEntry::default()
        });
    }

    /// Adds an address-less entry, like the link-layer entry getifaddrs reports.
    pub fn add_link(&mut self, name: &str) {
        self.add_entry(AddressEntry {
            name: name.to_string(),
            ..AddressEntry::default()
        });
    }

    pub fn set_mac(&mut self, name: &str, mac: [u8; 6]) {
        self.macs.insert(name.to_string(), mac);
    }

    pub fn set_wireless(&mut self, name: &str) {
        self.wireless.insert(name.to_string());
    }
}

impl LinkProbe for MockLinkProbe {
    fn addresses(&self) -> io::Result<Vec<AddressEntry>> {
        match self.failure {
            Some(kind) => Err(io::Error::new(kind, "getifaddrs failed")),
            None => Ok(self.entries.clone()),
        }
    }

    fn hardware_address(&self, name: &str) -> Option<[u8; 6]> {
        self.macs.get(name).copied()
    }

    fn is_wireless(&self, name: &str) -> bool {
        self.wireless.contains(name)
    }
}

/// `statvfs` answers keyed by mount point. Unknown mount points fail.
#[derive(Debug, Clone, Default)]
pub struct MockSpaceProbe {
    spaces: HashMap<PathBuf, FsSpace>,
}

impl MockSpaceProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mount_point: impl AsRef<Path>, space: FsSpace) {
        self.spaces.insert(mount_point.as_ref().to_path_buf(), space);
    }
}

impl SpaceProbe for MockSpaceProbe {
    fn space(&self, mount_point: &Path) -> io::Result<FsSpace> {
        self.spaces.get(mount_point).copied().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no statvfs data for {:?}", mount_point),
            )
        })
    }
}
