//! Grammar for `lsusb -v` output.

use std::sync::LazyLock;

use regex::Regex;

use crate::collector::traits::ParsedLine;
use crate::model::UsbDeviceSnapshot;

static DEVICE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Bus (\d+) Device (\d+): ID ([0-9a-fA-F]+):([0-9a-fA-F]+)")
        .expect("device header regex is valid")
});
static ID_VENDOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"idVendor\s+0x[0-9a-fA-F]+\s+(.*)").expect("idVendor regex is valid")
});
static ID_PRODUCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"idProduct\s+0x[0-9a-fA-F]+\s+(.*)").expect("idProduct regex is valid")
});
static I_SERIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"iSerial\s+\d+\s+(.*)").expect("iSerial regex is valid"));
static BCD_USB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"bcdUSB\s+([0-9.]+)").expect("bcdUSB regex is valid"));
static MAX_PACKET_SIZE0: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"bMaxPacketSize0\s+(\d+)").expect("bMaxPacketSize0 regex is valid")
});

/// Position and ids from a `Bus NNN Device NNN: ID vvvv:pppp` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceHeader {
    pub bus_number: String,
    pub device_address: String,
    pub vendor_id: String,
    pub product_id: String,
}

/// One meaningful line of `lsusb -v` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LsusbLine {
    /// A line starting with `Bus `. Opens a new device block even when the
    /// rest of the header is not understood (`None`).
    Device(Option<DeviceHeader>),
    Manufacturer(String),
    Product(String),
    SerialNumber(String),
    UsbVersion(String),
    Speed(&'static str),
}

/// Coarse speed label from the control endpoint's max packet size.
pub fn speed_label(max_packet_size0: u32) -> &'static str {
    match max_packet_size0 {
        64 => "High Speed",
        8 => "Low Speed",
        512 => "Super Speed",
        _ => "Full Speed",
    }
}

fn captured(re: &Regex, line: &str) -> Option<String> {
    re.captures(line).map(|caps| caps[1].trim().to_string())
}

/// Classifies one line of `lsusb -v` output.
///
/// Descriptor keywords are checked in a fixed order and the first keyword
/// contained in the line decides; if its pattern does not match, the line
/// is skipped.
pub fn parse_lsusb_line(line: &str) -> ParsedLine<LsusbLine> {
    if line.starts_with("Bus ") {
        let header = DEVICE_HEADER.captures(line).map(|caps| DeviceHeader {
            bus_number: caps[1].to_string(),
            device_address: caps[2].to_string(),
            vendor_id: caps[3].to_string(),
            product_id: caps[4].to_string(),
        });
        return ParsedLine::Record(LsusbLine::Device(header));
    }

    let parsed = if line.contains("idVendor") {
        captured(&ID_VENDOR, line).map(LsusbLine::Manufacturer)
    } else if line.contains("idProduct") {
        captured(&ID_PRODUCT, line).map(LsusbLine::Product)
    } else if line.contains("iSerial") {
        captured(&I_SERIAL, line).map(LsusbLine::SerialNumber)
    } else if line.contains("bcdUSB") {
        captured(&BCD_USB, line).map(LsusbLine::UsbVersion)
    } else if line.contains("bMaxPacketSize0") {
        MAX_PACKET_SIZE0
            .captures(line)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .map(|size| LsusbLine::Speed(speed_label(size)))
    } else {
        None
    };

    match parsed {
        Some(line) => ParsedLine::Record(line),
        None => ParsedLine::Skipped,
    }
}

/// Parses full `lsusb -v` output into devices, in output order.
///
/// Lines before the first `Bus ` header are ignored.
pub fn parse_lsusb(output: &str) -> Vec<UsbDeviceSnapshot> {
    let mut devices = Vec::new();
    let mut current: Option<UsbDeviceSnapshot> = None;

    for line in output.lines() {
        let ParsedLine::Record(parsed) = parse_lsusb_line(line) else {
            continue;
        };

        if let LsusbLine::Device(header) = parsed {
            devices.extend(current.take());
            let mut device = UsbDeviceSnapshot {
                is_connected: true,
                ..UsbDeviceSnapshot::default()
            };
            if let Some(header) = header {
                device.device_name =
                    format!("USB Device {}:{}", header.vendor_id, header.product_id);
                device.bus_number = header.bus_number;
                device.device_address = header.device_address;
                device.vendor_id = header.vendor_id;
                device.product_id = header.product_id;
            }
            current = Some(device);
            continue;
        }

        let Some(device) = current.as_mut() else {
            continue;
        };
        match parsed {
            LsusbLine::Manufacturer(v) => device.manufacturer = v,
            LsusbLine::Product(v) => device.product = v,
            LsusbLine::SerialNumber(v) => device.serial_number = v,
            LsusbLine::UsbVersion(v) => device.usb_version = v,
            LsusbLine::Speed(v) => device.speed = v.to_string(),
            LsusbLine::Device(_) => {}
        }
    }

    devices.extend(current);
    devices
}
