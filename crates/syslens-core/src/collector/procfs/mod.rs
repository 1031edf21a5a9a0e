//! Parsers for Linux pseudo-filesystems.
//!
//! `/proc`, `/sys` and the mount table are plain text; every format the
//! collectors consume is parsed by a pure function in [`parser`].

pub mod parser;

pub use parser::{
    CpuInfo, MemInfo, MountEntry, NetDevStats, ParseError, parse_cache_size, parse_cpu_list,
    parse_cpuinfo, parse_frequency_mhz, parse_meminfo, parse_mtab, parse_net_dev,
};
