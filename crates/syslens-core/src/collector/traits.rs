//! Abstractions shared by every collector.
//!
//! The `FileSystem` trait allows collectors to work with both the real `/proc`
//! and `/sys` filesystems on Linux and mock implementations for testing.

use std::io;
use std::path::{Path, PathBuf};

/// Abstraction for filesystem operations.
///
/// This trait allows collectors to read from the real filesystem or from
/// a mock implementation for testing purposes.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    ///
    /// # Arguments
    /// * `path` - Path to the file to read
    ///
    /// # Returns
    /// The file contents as a string, or an I/O error if the file cannot be read.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Lists entries in a directory.
    ///
    /// # Returns
    /// Paths to the entries in the directory, in no particular order, or an I/O error.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Reads a single-value pseudo-file such as a sysfs attribute.
    ///
    /// Returns the content with surrounding whitespace removed, or an empty
    /// string when the file cannot be opened.
    fn read_trimmed(&self, path: &Path) -> String {
        self.read_to_string(path)
            .map(|content| content.trim().to_string())
            .unwrap_or_default()
    }
}

/// Real filesystem implementation that delegates to `std::fs`.
///
/// Use this in production to read from the actual `/proc` and `/sys`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }
}

/// Rebuilds a collector's snapshot from live system state.
///
/// Implementations build the new snapshot completely before replacing the
/// old one, so accessors never observe a partially collected state.
pub trait Refresh {
    fn refresh(&mut self);
}

/// Outcome of parsing one line of external tool output.
///
/// Grammars for `systemctl` and `lsusb` output return this so that noise
/// (headers, footers, unrelated lines) is skipped explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine<T> {
    Record(T),
    Skipped,
}

impl<T> ParsedLine<T> {
    pub fn record(self) -> Option<T> {
        match self {
            ParsedLine::Record(value) => Some(value),
            ParsedLine::Skipped => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_real_fs_read_to_string() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaling_cur_freq");
        fs::write(&path, "2400000\n").unwrap();

        let fs = RealFs::new();
        assert_eq!(fs.read_to_string(&path).unwrap(), "2400000\n");
    }

    #[test]
    fn test_real_fs_read_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("type");
        fs::write(&path, "Unified\n").unwrap();

        let fs = RealFs::new();
        assert_eq!(fs.read_trimmed(&path), "Unified");
        assert_eq!(fs.read_trimmed(&dir.path().join("missing")), "");
    }

    #[test]
    fn test_real_fs_exists() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RealFs::new();
        assert!(fs.exists(dir.path()));
        assert!(!fs.exists(Path::new("/nonexistent/path/12345")));
    }

    #[test]
    fn test_real_fs_read_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("1-1")).unwrap();
        fs::write(dir.path().join("usb1"), "").unwrap();

        let fs = RealFs::new();
        let entries = fs.read_dir(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_parsed_line_record() {
        assert_eq!(ParsedLine::Record(5).record(), Some(5));
        assert_eq!(ParsedLine::<i32>::Skipped.record(), None);
    }
}
