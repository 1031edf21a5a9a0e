//! Grammars for `systemctl` output.

use std::sync::LazyLock;

use regex::Regex;

use crate::collector::traits::ParsedLine;
use crate::model::{ServiceSnapshot, ServiceStatus};

/// `NAME LOAD ACTIVE SUB DESCRIPTION...` with a free-text description.
static UNIT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\S+)\s+(\S+)\s+(\S+)\s+(\S+)\s+(.*)").expect("unit line regex is valid")
});

/// Status markers systemctl prints in front of a unit unless `--plain` is given.
const BULLETS: &[char] = &['●', '*', '○'];

/// Parses one line of `systemctl list-units --no-legend --plain`.
///
/// Lines that do not have four state columns and a description are skipped.
pub fn parse_unit_line(line: &str) -> ParsedLine<ServiceSnapshot> {
    let line = line.trim_start().trim_start_matches(BULLETS);
    let Some(caps) = UNIT_LINE.captures(line) else {
        return ParsedLine::Skipped;
    };

    let active_state = caps[3].to_string();
    ParsedLine::Record(ServiceSnapshot {
        name: caps[1].to_string(),
        load_state: caps[2].to_string(),
        status: ServiceStatus::from_active_state(&active_state),
        active_state,
        sub_state: caps[4].to_string(),
        description: caps[5].trim_end().to_string(),
        unit_file_state: String::new(),
    })
}

/// Parses the whole unit listing, returning units and the number of skipped lines.
pub fn parse_unit_listing(output: &str) -> (Vec<ServiceSnapshot>, usize) {
    let mut units = Vec::new();
    let mut skipped = 0;
    for line in output.lines() {
        match parse_unit_line(line) {
            ParsedLine::Record(unit) => units.push(unit),
            ParsedLine::Skipped => skipped += 1,
        }
    }
    (units, skipped)
}

/// Parses `systemctl show NAME --property=...` output (`Key=Value` lines).
///
/// `name` is taken as given; unknown keys are ignored.
pub fn parse_show_properties(name: &str, output: &str) -> ServiceSnapshot {
    let mut service = ServiceSnapshot {
        name: name.to_string(),
        ..ServiceSnapshot::default()
    };

    for line in output.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key {
            "Description" => service.description = value.to_string(),
            "LoadState" => service.load_state = value.to_string(),
            "ActiveState" => {
                service.active_state = value.to_string();
                service.status = ServiceStatus::from_active_state(value);
            }
            "SubState" => service.sub_state = value.to_string(),
            "UnitFileState" => service.unit_file_state = value.to_string(),
            _ => {}
        }
    }

    service
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unit_line() {
        let line = "ssh.service    loaded active running OpenBSD Secure Shell server   ";
        let unit = parse_unit_line(line).record().unwrap();
        assert_eq!(unit.name, "ssh.service");
        assert_eq!(unit.load_state, "loaded");
        assert_eq!(unit.active_state, "active");
        assert_eq!(unit.sub_state, "running");
        assert_eq!(unit.description, "OpenBSD Secure Shell server");
        assert_eq!(unit.status, ServiceStatus::Active);
        assert!(unit.unit_file_state.is_empty());
    }

    #[test]
    fn test_parse_unit_line_strips_bullet() {
        let line = "● nginx.service loaded failed failed A high performance web server";
        let unit = parse_unit_line(line).record().unwrap();
        assert_eq!(unit.name, "nginx.service");
        assert_eq!(unit.status, ServiceStatus::Failed);
    }

    #[test]
    fn test_parse_unit_line_skips_noise() {
        assert_eq!(parse_unit_line(""), ParsedLine::Skipped);
        assert_eq!(parse_unit_line("42 loaded units listed."), ParsedLine::Skipped);
        assert_eq!(parse_unit_line("only three columns"), ParsedLine::Skipped);
    }

    #[test]
    fn test_parse_unit_line_other_state_is_unknown() {
        let line = "foo.service loaded activating start Foo daemon";
        let unit = parse_unit_line(line).record().unwrap();
        assert_eq!(unit.active_state, "activating");
        assert_eq!(unit.status, ServiceStatus::Unknown);
    }

    #[test]
    fn test_parse_unit_listing_counts_skipped() {
        let output = "\
a.service loaded active running A
b.service loaded inactive dead B service

2 loaded units listed.
";
        let (units, skipped) = parse_unit_listing(output);
        assert_eq!(units.len(), 2);
        assert_eq!(units[1].description, "B service");
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_parse_show_properties() {
        let output = "\
Description=OpenBSD Secure Shell server
LoadState=loaded
ActiveState=active
SubState=running
UnitFileState=enabled
";
        let service = parse_show_properties("ssh.service", output);
        assert_eq!(service.name, "ssh.service");
        assert_eq!(service.description, "OpenBSD Secure Shell server");
        assert_eq!(service.unit_file_state, "enabled");
        assert_eq!(service.status, ServiceStatus::Active);
    }

    #[test]
    fn test_parse_show_properties_value_with_equals() {
        let service = parse_show_properties("x.service", "Description=a=b\nnoise\n");
        assert_eq!(service.description, "a=b");
        assert_eq!(service.status, ServiceStatus::Unknown);
    }
}
