//! Pre-built mock scenarios for testing.
//!
//! These scenarios provide a realistic laptop-like system: one 4-thread CPU,
//! an NVMe disk, wired and wireless interfaces, a few services and USB devices.

use super::filesystem::MockFs;
use super::probe::{MockLinkProbe, MockSpaceProbe};
use super::runner::MockRunner;
use crate::collector::command::CommandOutput;
use crate::collector::disk::FsSpace;
use crate::collector::network::{AddressEntry, LinkFlags};

impl MockFs {
    /// Creates a typical system.
    ///
    /// Includes: `/proc/{cpuinfo,meminfo,net/dev}`, cpu0 sysfs attributes,
    /// `/etc/mtab` and three sysfs USB devices.
    pub fn typical_system() -> Self {
        let mut fs = Self::new();

        let mut cpuinfo = String::new();
        for cpu in 0..4 {
            cpuinfo.push_str(&format!(
                "\
processor\t: {cpu}
vendor_id\t: GenuineIntel
cpu family\t: 6
model\t\t: 142
model name\t: Intel(R) Core(TM) i7-8650U CPU @ 1.90GHz
physical id\t: 0
core id\t\t: {core}
cpu cores\t: 4
flags\t\t: fpu vme de pse
bogomips\t: 4199.88

",
                core = cpu % 2,
            ));
        }
        fs.add_file("/proc/cpuinfo", cpuinfo);

        let cpu = "/sys/devices/system/cpu";
        fs.add_file(format!("{cpu}/online"), "0-3\n");
        fs.add_file(format!("{cpu}/cpu0/cpufreq/scaling_cur_freq"), "2100000\n");
        fs.add_file(format!("{cpu}/cpu0/cpufreq/scaling_min_freq"), "400000\n");
        fs.add_file(format!("{cpu}/cpu0/cpufreq/scaling_max_freq"), "4200000\n");
        for (index, size, kind) in [
            (0, "32K", "Data"),
            (1, "32K", "Instruction"),
            (2, "256K", "Unified"),
            (3, "8192K", "Unified"),
        ] {
            fs.add_file(format!("{cpu}/cpu0/cache/index{index}/size"), format!("{size}\n"));
            fs.add_file(format!("{cpu}/cpu0/cache/index{index}/type"), format!("{kind}\n"));
        }

        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
Active:          4096000 kB
Inactive:        2048000 kB
Shmem:            256000 kB
SwapTotal:       4096000 kB
SwapFree:        3072000 kB
",
        );

        fs.add_file(
            "/etc/mtab",
            "\
/dev/nvme0n1p2 / ext4 rw,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
devtmpfs /dev devtmpfs rw,nosuid,size=8119656k 0 0
devpts /dev/pts devpts rw,nosuid,noexec,relatime 0 0
tmpfs /run tmpfs rw,nosuid,nodev,size=1628000k 0 0
/dev/nvme0n1p1 /boot/efi vfat rw,relatime,fmask=0077 0 0
/dev/nvme0n1p3 /home ext4 rw,relatime 0 0
server:/export /mnt/nfs nfs4 rw,relatime 0 0
",
        );

        fs.add_file(
            "/proc/net/dev",
            "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
  eth0: 9876543210 5000000   10    5    0     0          0         0 1234567890 2000000    2    1    0     0       0          0
 wlan0:  555000     4000    0    0    0     0          0         0   333000     3000    0    0    0     0       0          0
",
        );

        fs.add_usb_device(
            "/sys",
            "usb1",
            &[("idVendor", "1d6b"), ("idProduct", "0002"), ("busnum", "1"), ("devnum", "1")],
        );
        fs.add_usb_device(
            "/sys",
            "1-2",
            &[
                ("idVendor", "046d"),
                ("idProduct", "c52b"),
                ("manufacturer", "Logitech"),
                ("product", "USB Receiver"),
                ("serial", "4A3B2C1D"),
                ("speed", "12"),
                ("version", " 2.00"),
                ("busnum", "1"),
                ("devnum", "3"),
            ],
        );
        fs.add_usb_device("/sys", "1-2:1.0", &[("bInterfaceClass", "03")]);
        fs.add_usb_device(
            "/sys",
            "2-1",
            &[
                ("idVendor", "0c45"),
                ("idProduct", "6366"),
                ("manufacturer", "Sonix Technology Co., Ltd."),
                ("product", "USB Camera"),
                ("speed", "12"),
                ("version", " 2.00"),
                ("busnum", "2"),
                ("devnum", "2"),
            ],
        );
        fs.add_usb_device(
            "/sys",
            "2-3",
            &[
                ("idVendor", "0781"),
                ("idProduct", "5581"),
                ("manufacturer", "SanDisk"),
                ("product", "Ultra"),
                ("serial", "4C530001230825117412"),
                ("speed", "480"),
                ("version", " 2.10"),
                ("busnum", "2"),
                ("devnum", "4"),
            ],
        );

        fs
    }
}

impl MockRunner {
    /// Canned `systemctl` and `lsusb` output matching [`MockFs::typical_system`].
    ///
    /// The `show` answer for `ssh.service` is newer than the listing: the
    /// listing says inactive, the detail query says active.
    pub fn typical_system() -> Self {
        let runner = Self::new();

        runner.set_output(
            "systemctl",
            &["list-units", "--type=service", "--all", "--no-legend", "--plain"],
            CommandOutput::ok(
                "\
cron.service                 loaded active   running Regular background program processing daemon
dbus.service                 loaded active   running D-Bus System Message Bus
nginx.service                loaded failed   failed  A high performance web server and a reverse proxy server
ssh.service                  loaded inactive dead    OpenBSD Secure Shell server
",
            ),
        );
        runner.set_output(
            "systemctl",
            &[
                "show",
                "ssh.service",
                "--property=Description,LoadState,ActiveState,SubState,UnitFileState",
            ],
            CommandOutput::ok(
                "\
Description=OpenBSD Secure Shell server
LoadState=loaded
ActiveState=active
SubState=running
UnitFileState=enabled
",
            ),
        );

        runner.set_output(
            "lsusb",
            &["-v"],
            CommandOutput::ok(
                "\
Bus 001 Device 001: ID 1d6b:0002 Linux Foundation 2.0 root hub
Device Descriptor:
  bLength                18
  bcdUSB               2.00
  bDeviceClass            9 Hub
  bMaxPacketSize0        64
  idVendor           0x1d6b Linux Foundation
  idProduct          0x0002 2.0 root hub
  iManufacturer           3 Linux 6.1.0 xhci-hcd
  iProduct                2 xHCI Host Controller
  iSerial                 1 0000:00:14.0

Bus 001 Device 003: ID 046d:c52b Logitech, Inc. Unifying Receiver
Device Descriptor:
  bLength                18
  bcdUSB               2.00
  bMaxPacketSize0         8
  idVendor           0x046d Logitech, Inc.
  idProduct          0xc52b Unifying Receiver
  iManufacturer           1 Logitech
  iProduct                2 USB Receiver
  iSerial                 0

Bus 002 Device 004: ID 0781:5581 SanDisk Corp. Ultra
",
            ),
        );

        runner
    }
}

impl MockLinkProbe {
    /// Loopback, a wired interface with IPv4 and IPv6, and a wireless
    /// interface that is down.
    pub fn typical_system() -> Self {
        let mut probe = Self::new();

        probe.add_link("lo");
        probe.add_link("eth0");
        probe.add_link("wlan0");
        probe.add_entry(AddressEntry {
            name: "lo".into(),
            address: "127.0.0.1".parse().ok(),
            netmask: "255.0.0.0".parse().ok(),
            broadcast: None,
            flags: LinkFlags {
                up: true,
                loopback: true,
                broadcast: false,
            },
        });
        probe.add_ipv4("eth0", "192.168.1.100", "255.255.255.0", Some("192.168.1.255"));
        probe.add_entry(AddressEntry {
            name: "wlan0".into(),
            address: "10.0.0.23".parse().ok(),
            netmask: "255.255.255.0".parse().ok(),
            broadcast: "10.0.0.255".parse().ok(),
            flags: LinkFlags {
                up: false,
                loopback: false,
                broadcast: true,
            },
        });
        probe.add_ipv6("lo", "::1");
        probe.add_ipv6("eth0", "fe80::5054:ff:feab:cdef");

        probe.set_mac("lo", [0; 6]);
        probe.set_mac("eth0", [0x52, 0x54, 0x00, 0xab, 0xcd, 0xef]);
        probe.set_wireless("wlan0");

        probe
    }
}

impl MockSpaceProbe {
    /// Space for the real mounts of [`MockFs::typical_system`]; the NFS mount
    /// is stale and fails.
    pub fn typical_system() -> Self {
        let mut probe = Self::new();
        probe.add(
            "/",
            FsSpace {
                blocks: 25_000_000,
                blocks_free: 10_000_000,
                blocks_available: 8_750_000,
                fragment_size: 4096,
            },
        );
        probe.add(
            "/boot/efi",
            FsSpace {
                blocks: 523_248,
                blocks_free: 516_000,
                blocks_available: 516_000,
                fragment_size: 1024,
            },
        );
        probe.add(
            "/home",
            FsSpace {
                blocks: 100_000_000,
                blocks_free: 40_000_000,
                blocks_available: 35_000_000,
                fragment_size: 4096,
            },
        );
        // Pseudo mounts answer too, so only the type filter keeps them out.
        probe.add("/proc", FsSpace::default());
        probe.add("/dev/pts", FsSpace::default());
        probe.add("/run", FsSpace::default());
        probe
    }
}
