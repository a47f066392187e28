//! Core functionalities: staged line configuration, termios driver, open/close lifecycle.

pub mod attributes;
pub mod baud;
pub mod driver;
pub mod error;
pub mod ports;
pub mod serial_line;
pub mod settings;

pub use attributes::{Attributes, Parity, SetMode};
pub use driver::{DeviceHandle, PosixDriver, TermDriver};
pub use error::{Field, LineError, Result, SettingsError};
pub use ports::{list_ports, PortInfo, PortKind};
pub use serial_line::{OpenPolicy, SerialLine};
pub use settings::{default_profile_path, LineSettings};
