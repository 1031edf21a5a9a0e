//! Mounted filesystems from the mount table and `statvfs(3)`.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::collector::procfs::parse_mtab;
use crate::collector::traits::{FileSystem, Refresh};
use crate::config::CollectorConfig;
use crate::model::DiskSnapshot;

/// Kernel-virtual filesystem types never reported as disks.
pub const PSEUDO_FILESYSTEMS: &[&str] = &[
    "proc",
    "sysfs",
    "devpts",
    "tmpfs",
    "devtmpfs",
    "debugfs",
    "securityfs",
    "cgroup",
    "pstore",
    "autofs",
    "mqueue",
    "hugetlbfs",
    "fusectl",
    "fuse.gvfsd-fuse",
    "binfmt_misc",
];

/// Exact, case-sensitive match against [`PSEUDO_FILESYSTEMS`].
pub fn is_pseudo_filesystem(fs_type: &str) -> bool {
    PSEUDO_FILESYSTEMS.contains(&fs_type)
}

/// Raw `statvfs` counters for one mount point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FsSpace {
    pub blocks: u64,
    pub blocks_free: u64,
    pub blocks_available: u64,
    pub fragment_size: u64,
}

impl FsSpace {
    pub fn total(&self) -> u64 {
        self.blocks.saturating_mul(self.fragment_size)
    }

    pub fn free(&self) -> u64 {
        self.blocks_free.saturating_mul(self.fragment_size)
    }

    pub fn available(&self) -> u64 {
        self.blocks_available.saturating_mul(self.fragment_size)
    }
}

/// Queries filesystem space for a mount point.
pub trait SpaceProbe: Send + Sync {
    fn space(&self, mount_point: &Path) -> io::Result<FsSpace>;
}

/// `statvfs(3)` through `nix`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatvfsProbe;

impl SpaceProbe for StatvfsProbe {
    fn space(&self, mount_point: &Path) -> io::Result<FsSpace> {
        let stat = nix::sys::statvfs::statvfs(mount_point).map_err(io::Error::from)?;
        Ok(FsSpace {
            blocks: stat.blocks() as u64,
            blocks_free: stat.blocks_free() as u64,
            blocks_available: stat.blocks_available() as u64,
            fragment_size: stat.fragment_size() as u64,
        })
    }
}

/// Collects mounted, non-pseudo filesystems.
pub struct DiskCollector<F: FileSystem, S: SpaceProbe> {
    fs: F,
    probe: S,
    mtab_path: PathBuf,
    disks: Vec<DiskSnapshot>,
}

impl<F: FileSystem, S: SpaceProbe> DiskCollector<F, S> {
    /// Creates the collector and performs the initial collection.
    pub fn new(fs: F, probe: S, config: &CollectorConfig) -> Self {
        let mut collector = Self {
            fs,
            probe,
            mtab_path: config.mtab_path.clone(),
            disks: Vec::new(),
        };
        collector.refresh();
        collector
    }

    /// Builds a fresh disk list in mount table order.
    ///
    /// Mounts whose `statvfs` fails (stale network mounts, permission
    /// denied) are left out.
    pub fn collect(&self) -> Vec<DiskSnapshot> {
        let content = match self.fs.read_to_string(&self.mtab_path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %self.mtab_path.display(), error = %e, "cannot read mount table");
                return Vec::new();
            }
        };

        parse_mtab(&content)
            .into_iter()
            .filter(|entry| !is_pseudo_filesystem(&entry.fs_type))
            .filter_map(|entry| {
                let space = match self.probe.space(Path::new(&entry.mount_point)) {
                    Ok(space) => space,
                    Err(e) => {
                        debug!(mount_point = %entry.mount_point, error = %e, "statvfs failed");
                        return None;
                    }
                };
                Some(DiskSnapshot {
                    device: entry.device,
                    mount_point: entry.mount_point,
                    fs_type: entry.fs_type,
                    total_size: space.total(),
                    free_space: space.free(),
                    available_space: space.available(),
                })
            })
            .collect()
    }

    /// Current disk list. Empty means no data.
    pub fn get_disks(&self) -> &[DiskSnapshot] {
        if self.disks.is_empty() {
            debug!("no disk information available");
        }
        &self.disks
    }
}

impl<F: FileSystem, S: SpaceProbe> Refresh for DiskCollector<F, S> {
    fn refresh(&mut self) {
        self.disks = self.collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockFs, MockSpaceProbe};

    fn collector(fs: MockFs, probe: MockSpaceProbe) -> DiskCollector<MockFs, MockSpaceProbe> {
        DiskCollector::new(fs, probe, &CollectorConfig::default())
    }

    #[test]
    fn test_typical_system() {
        let disks = collector(MockFs::typical_system(), MockSpaceProbe::typical_system());
        let disks = disks.get_disks();

        let mounts: Vec<&str> = disks.iter().map(|d| d.mount_point.as_str()).collect();
        assert_eq!(mounts, vec!["/", "/boot/efi", "/home"]);

        let root = &disks[0];
        assert_eq!(root.device, "/dev/nvme0n1p2");
        assert_eq!(root.fs_type, "ext4");
        assert_eq!(root.total_size, 25_000_000 * 4096);
        assert_eq!(root.free_space, 10_000_000 * 4096);
        assert_eq!(root.available_space, 8_750_000 * 4096);
        assert_eq!(root.usage_percent(), 60.0);
    }

    #[test]
    fn test_pseudo_filesystems_excluded() {
        let mut fs = MockFs::new();
        let mut mtab = String::new();
        let mut probe = MockSpaceProbe::new();
        for (i, fs_type) in PSEUDO_FILESYSTEMS.iter().enumerate() {
            let mount = format!("/pseudo{}", i);
            mtab.push_str(&format!("none {} {} rw 0 0\n", mount, fs_type));
            probe.add(&mount, FsSpace::default());
        }
        mtab.push_str("/dev/sda1 / xfs rw 0 0\n");
        probe.add("/", FsSpace::default());
        fs.add_file("/etc/mtab", mtab);

        let disks = collector(fs, probe);
        assert_eq!(disks.get_disks().len(), 1);
        assert_eq!(disks.get_disks()[0].fs_type, "xfs");
    }

    #[test]
    fn test_pseudo_match_is_exact() {
        assert!(is_pseudo_filesystem("tmpfs"));
        assert!(is_pseudo_filesystem("devpts"));
        assert!(!is_pseudo_filesystem("TMPFS"));
        assert!(!is_pseudo_filesystem("cgroup2"));
        assert!(!is_pseudo_filesystem("fuse.sshfs"));
    }

    #[test]
    fn test_failed_statvfs_skips_mount() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/etc/mtab",
            "/dev/sda1 / ext4 rw 0 0\nserver:/export /mnt/nfs nfs4 rw 0 0\n",
        );
        let mut probe = MockSpaceProbe::new();
        probe.add(
            "/",
            FsSpace {
                blocks: 10,
                blocks_free: 5,
                blocks_available: 4,
                fragment_size: 512,
            },
        );

        let disks = collector(fs, probe);
        assert_eq!(disks.get_disks().len(), 1);
        assert_eq!(disks.get_disks()[0].total_size, 5120);
    }

    #[test]
    fn test_missing_mtab_gives_empty_list() {
        let disks = collector(MockFs::new(), MockSpaceProbe::new());
        assert!(disks.get_disks().is_empty());
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let mut disks = collector(MockFs::typical_system(), MockSpaceProbe::typical_system());
        let first = disks.get_disks().to_vec();
        disks.refresh();
        assert_eq!(disks.get_disks(), first.as_slice());
    }

    #[test]
    fn test_statvfs_probe_on_real_root() {
        let space = StatvfsProbe.space(Path::new("/")).unwrap();
        assert!(space.fragment_size > 0);
        assert!(space.free() <= space.total());
    }
}
