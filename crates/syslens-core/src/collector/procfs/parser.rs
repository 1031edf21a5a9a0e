//! Parsers for `/proc`, `/sys` and mount table files.
//!
//! These are pure functions that parse the content of various pseudo-files
//! into structured data. They are designed to be easily testable with string inputs.

use std::collections::BTreeMap;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

// ============ CPU Info Parser ============

/// Fields extracted from `/proc/cpuinfo`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuInfo {
    /// Value of the last `model name` line.
    pub processor_name: String,
    /// Value of the last `vendor_id` line.
    pub vendor_id: String,
    /// Occurrences per `physical id` value.
    pub physical_ids: BTreeMap<String, usize>,
    /// Tokens of every `flags` line, in file order.
    pub flags: Vec<String>,
}

/// Parses `/proc/cpuinfo` content.
///
/// The file repeats a `key\t: value` block per logical CPU; scalar fields keep
/// the value from the last block.
pub fn parse_cpuinfo(content: &str) -> CpuInfo {
    let mut info = CpuInfo::default();

    for line in content.lines() {
        let Some(value) = cpuinfo_value(line) else {
            continue;
        };

        if line.contains("model name") {
            info.processor_name = value.to_string();
        } else if line.contains("vendor_id") {
            info.vendor_id = value.to_string();
        } else if line.contains("physical id") {
            *info.physical_ids.entry(value.to_string()).or_insert(0) += 1;
        } else if line.contains("flags") {
            info.flags.extend(value.split_whitespace().map(str::to_string));
        }
    }

    info
}

/// Value part of a cpuinfo line: everything after `": "`.
/// `None` for lines without a colon or with an empty value.
fn cpuinfo_value(line: &str) -> Option<&str> {
    let colon = line.find(':')?;
    let value = line.get(colon + 2..)?;
    (!value.is_empty()).then_some(value)
}

// ============ sysfs CPU Parsers ============

/// Parses a cache `size` attribute such as `32K` or `8M` into bytes.
///
/// The leading digits are the magnitude; a `K` anywhere multiplies by 1024,
/// an `M` by 1024². Returns `None` when there are no leading digits.
pub fn parse_cache_size(content: &str) -> Option<u64> {
    let content = content.trim();
    let digits_end = content
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(content.len());
    let value: u64 = content[..digits_end].parse().ok()?;

    if content.contains('K') {
        Some(value.saturating_mul(1024))
    } else if content.contains('M') {
        Some(value.saturating_mul(1024 * 1024))
    } else {
        Some(value)
    }
}

/// Parses a cpufreq attribute (kHz) into MHz.
pub fn parse_frequency_mhz(content: &str) -> Option<f64> {
    let khz: u64 = content.trim().parse().ok()?;
    Some(khz as f64 / 1000.0)
}

/// Counts CPUs in a sysfs cpu list such as `0-3,6,8-9`.
///
/// Returns `None` for an empty or malformed list.
pub fn parse_cpu_list(content: &str) -> Option<usize> {
    let content = content.trim();
    if content.is_empty() {
        return None;
    }

    let mut count = 0usize;
    for range in content.split(',') {
        match range.split_once('-') {
            Some((start, end)) => {
                let start: usize = start.trim().parse().ok()?;
                let end: usize = end.trim().parse().ok()?;
                if end < start {
                    return None;
                }
                count += end - start + 1;
            }
            None => {
                range.trim().parse::<usize>().ok()?;
                count += 1;
            }
        }
    }

    Some(count)
}

// ============ Mount Table Parser ============

/// One line of `/etc/mtab`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountEntry {
    pub device: String,
    pub mount_point: String,
    pub fs_type: String,
}

/// Parses mount table content (`/etc/mtab`, `/proc/mounts`).
///
/// Format: `device mountpoint fstype options dump pass`, with spaces and tabs
/// inside fields written as octal escapes (`\040`). Lines with fewer than three
/// fields and comments are skipped. Order is preserved.
pub fn parse_mtab(content: &str) -> Vec<MountEntry> {
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let device = fields.next()?;
            let mount_point = fields.next()?;
            let fs_type = fields.next()?;
            Some(MountEntry {
                device: unescape_octal(device),
                mount_point: unescape_octal(mount_point),
                fs_type: unescape_octal(fs_type),
            })
        })
        .collect()
}

/// Decodes `\NNN` octal escapes used by the kernel in mount tables.
fn unescape_octal(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_string();
    }

    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\'
            && i + 3 < bytes.len()
            && bytes[i + 1..=i + 3].iter().all(|b| (b'0'..=b'7').contains(b))
        {
            let code = (bytes[i + 1] - b'0') as u32 * 64
                + (bytes[i + 2] - b'0') as u32 * 8
                + (bytes[i + 3] - b'0') as u32;
            if let Ok(byte) = u8::try_from(code) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

// ============ Network Device Stats Parser ============

/// Parsed data from `/proc/net/dev`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetDevStats {
    /// Interface name (eth0, lo, etc.)
    pub interface: String,
    /// Bytes received
    pub rx_bytes: u64,
    /// Packets received
    pub rx_packets: u64,
    /// Receive errors
    pub rx_errs: u64,
    /// Bytes transmitted
    pub tx_bytes: u64,
    /// Packets transmitted
    pub tx_packets: u64,
    /// Transmit errors
    pub tx_errs: u64,
}

/// Parses `/proc/net/dev` content.
///
/// Format:
/// Inter-|   Receive                                                |  Transmit
///  face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
///    lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
///
/// Missing or non-numeric counters read as zero.
pub fn parse_net_dev(content: &str) -> Vec<NetDevStats> {
    let mut devices = Vec::new();

    for line in content.lines() {
        // Skip header lines
        if line.contains('|') || line.trim().is_empty() {
            continue;
        }

        // Old kernels print "eth0:123" with no space after the colon.
        let Some((interface, counters)) = line.split_once(':') else {
            continue;
        };

        let values: Vec<&str> = counters.split_whitespace().collect();
        let get_val =
            |idx: usize| -> u64 { values.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0) };

        devices.push(NetDevStats {
            interface: interface.trim().to_string(),
            rx_bytes: get_val(0),
            rx_packets: get_val(1),
            rx_errs: get_val(2),
            tx_bytes: get_val(8),
            tx_packets: get_val(9),
            tx_errs: get_val(10),
        });
    }

    devices
}

// ============ Memory Info Parser ============

/// Parsed data from `/proc/meminfo`, in bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemInfo {
    pub mem_total: u64,
    pub mem_free: u64,
    pub mem_available: u64,
    pub buffers: u64,
    pub cached: u64,
    pub shmem: u64,
    pub swap_total: u64,
    pub swap_free: u64,
}

/// Parses `/proc/meminfo` content.
///
/// Values are reported in kB and converted to bytes. Fails only when the
/// content has no `MemTotal` line, which means it is not a meminfo file.
pub fn parse_meminfo(content: &str) -> Result<MemInfo, ParseError> {
    let mut info = MemInfo::default();
    let mut seen_total = false;

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let bytes = value
            .split_whitespace()
            .next()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0)
            .saturating_mul(1024);

        match key.trim() {
            "MemTotal" => {
                info.mem_total = bytes;
                seen_total = true;
            }
            "MemFree" => info.mem_free = bytes,
            "MemAvailable" => info.mem_available = bytes,
            "Buffers" => info.buffers = bytes,
            "Cached" => info.cached = bytes,
            "Shmem" => info.shmem = bytes,
            "SwapTotal" => info.swap_total = bytes,
            "SwapFree" => info.swap_free = bytes,
            _ => {}
        }
    }

    if !seen_total {
        return Err(ParseError::new("missing MemTotal in meminfo"));
    }

    Ok(info)
}
