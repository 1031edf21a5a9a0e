//! Interface enumeration and per-interface ioctl probes.

use std::io;
use std::net::{IpAddr, Ipv4Addr};

use nix::ifaddrs::getifaddrs;
use nix::net::if_::InterfaceFlags;
use nix::sys::socket::SockaddrStorage;

/// Interface flags relevant to the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkFlags {
    pub up: bool,
    pub loopback: bool,
    pub broadcast: bool,
}

/// One entry of the local address list. An interface appears once per address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressEntry {
    pub name: String,
    /// `None` for entries without an address or with a non-IP family (packet sockets).
    pub address: Option<IpAddr>,
    pub netmask: Option<IpAddr>,
    pub broadcast: Option<IpAddr>,
    pub flags: LinkFlags,
}

/// Source of interface addresses and link-layer details.
pub trait LinkProbe: Send + Sync {
    /// Local address list, in kernel order.
    fn addresses(&self) -> io::Result<Vec<AddressEntry>>;

    /// Hardware address of `name`, `None` if the probe fails.
    fn hardware_address(&self, name: &str) -> Option<[u8; 6]>;

    /// Whether `name` answers wireless extension requests.
    fn is_wireless(&self, name: &str) -> bool;
}

/// `getifaddrs(3)` plus `SIOCGIFHWADDR` / `SIOCGIWNAME` ioctls.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLinkProbe;

impl LinkProbe for SystemLinkProbe {
    fn addresses(&self) -> io::Result<Vec<AddressEntry>> {
        let entries = getifaddrs()
            .map_err(io::Error::from)?
            .map(|ifa| AddressEntry {
                address: ifa.address.as_ref().and_then(ip_of),
                netmask: ifa.netmask.as_ref().and_then(ip_of),
                broadcast: ifa.broadcast.as_ref().and_then(ip_of),
                flags: LinkFlags {
                    up: ifa.flags.contains(InterfaceFlags::IFF_UP),
                    loopback: ifa.flags.contains(InterfaceFlags::IFF_LOOPBACK),
                    broadcast: ifa.flags.contains(InterfaceFlags::IFF_BROADCAST),
                },
                name: ifa.interface_name,
            })
            .collect();
        Ok(entries)
    }

    fn hardware_address(&self, name: &str) -> Option<[u8; 6]> {
        ioctl::hardware_address(name)
    }

    fn is_wireless(&self, name: &str) -> bool {
        ioctl::is_wireless(name)
    }
}

fn ip_of(addr: &SockaddrStorage) -> Option<IpAddr> {
    if let Some(sin) = addr.as_sockaddr_in() {
        return Some(IpAddr::V4(Ipv4Addr::from(sin.ip())));
    }
    addr.as_sockaddr_in6().map(|sin6| IpAddr::V6(sin6.ip()))
}

#[cfg(target_os = "linux")]
mod ioctl {
    use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

    /// `SIOCGIWNAME` from `linux/wireless.h`; libc does not export it.
    const SIOCGIWNAME: libc::c_ulong = 0x8B01;

    fn socket() -> Option<OwnedFd> {
        // SAFETY: plain socket(2) call; the descriptor is owned below.
        let fd = unsafe { libc::socket(libc::AF_INET, libc::SOCK_DGRAM, 0) };
        if fd < 0 {
            return None;
        }
        // SAFETY: fd is a freshly created, valid descriptor.
        Some(unsafe { OwnedFd::from_raw_fd(fd) })
    }

    /// Zeroed request with `ifr_name` set. Names that do not fit are rejected.
    fn request(name: &str) -> Option<libc::ifreq> {
        let bytes = name.as_bytes();
        if bytes.is_empty() || bytes.len() >= libc::IFNAMSIZ || bytes.contains(&0) {
            return None;
        }
        // SAFETY: ifreq is plain old data; all-zero is a valid value.
        let mut req: libc::ifreq = unsafe { std::mem::zeroed() };
        for (dst, src) in req.ifr_name.iter_mut().zip(bytes) {
            *dst = *src as libc::c_char;
        }
        Some(req)
    }

    pub fn hardware_address(name: &str) -> Option<[u8; 6]> {
        let sock = socket()?;
        let mut req = request(name)?;
        // SAFETY: req is a valid ifreq that outlives the call.
        let rc = unsafe {
            libc::ioctl(
                sock.as_raw_fd(),
                libc::SIOCGIFHWADDR as _,
                &mut req as *mut libc::ifreq,
            )
        };
        if rc < 0 {
            return None;
        }

        // SAFETY: SIOCGIFHWADDR fills the ifru_hwaddr member.
        let data = unsafe { req.ifr_ifru.ifru_hwaddr.sa_data };
        let mut mac = [0u8; 6];
        for (dst, src) in mac.iter_mut().zip(data.iter()) {
            *dst = *src as u8;
        }
        Some(mac)
    }

    pub fn is_wireless(name: &str) -> bool {
        let Some(sock) = socket() else {
            return false;
        };
        let Some(mut req) = request(name) else {
            return false;
        };
        // struct iwreq shares its leading name field with ifreq and is smaller.
        // SAFETY: req is a valid buffer large enough for iwreq.
        let rc = unsafe {
            libc::ioctl(
                sock.as_raw_fd(),
                SIOCGIWNAME as _,
                &mut req as *mut libc::ifreq,
            )
        };
        rc >= 0
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_request_rejects_bad_names() {
            assert!(request("").is_none());
            assert!(request("a-name-that-is-too-long").is_none());
            assert!(request("eth\0").is_none());
            assert!(request("eth0").is_some());
        }

        #[test]
        fn test_loopback_is_not_wireless() {
            assert!(!is_wireless("lo"));
            assert!(!is_wireless("nonexistent0"));
        }

        #[test]
        fn test_unknown_interface_has_no_mac() {
            assert_eq!(hardware_address("nonexistent0"), None);
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod ioctl {
    pub fn hardware_address(_name: &str) -> Option<[u8; 6]> {
        None
    }

    pub fn is_wireless(_name: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_of_ipv4() {
        let addr = SockaddrStorage::from(std::net::SocketAddr::from(([192, 168, 1, 10], 0)));
        assert_eq!(ip_of(&addr), Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10))));
    }

    #[test]
    fn test_ip_of_ipv6() {
        let addr = SockaddrStorage::from(std::net::SocketAddr::from((
            std::net::Ipv6Addr::LOCALHOST,
            0,
        )));
        assert_eq!(ip_of(&addr), Some(IpAddr::V6(std::net::Ipv6Addr::LOCALHOST)));
    }
}
