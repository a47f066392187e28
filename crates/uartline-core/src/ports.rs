use serialport::{SerialPortInfo, SerialPortType};

use crate::settings::LineSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Usb,
    Pci,
    Bluetooth,
    Unknown,
}

/// A device node that looks like a serial line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub path: String,
    pub kind: PortKind,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

impl PortInfo {
    /// Default line settings for this device.
    pub fn settings(&self) -> LineSettings {
        LineSettings::new(self.path.clone())
    }
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let mut port = Self {
            path: info.port_name,
            kind: PortKind::Unknown,
            vid: None,
            pid: None,
            serial_number: None,
            manufacturer: None,
            product: None,
        };
        match info.port_type {
            SerialPortType::UsbPort(usb) => {
                port.kind = PortKind::Usb;
                port.vid = Some(usb.vid);
                port.pid = Some(usb.pid);
                port.serial_number = usb.serial_number;
                port.manufacturer = usb.manufacturer;
                port.product = usb.product;
            }
            SerialPortType::PciPort => port.kind = PortKind::Pci,
            SerialPortType::BluetoothPort => port.kind = PortKind::Bluetooth,
            SerialPortType::Unknown => {}
        }
        port
    }
}

/// Serial devices present on this machine. Enumeration errors yield an empty list.
pub fn list_ports() -> Vec<PortInfo> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(PortInfo::from).collect(),
        Err(err) => {
            log::warn!("failed to enumerate serial ports: {}", err);
            Vec::new()
        }
    }
}
