use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::attributes::Parity;
use crate::error::SettingsError;

/// Construction parameters for a [`SerialLine`](crate::SerialLine).
///
/// Values are stored as given; they are validated when the line is
/// configured or opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineSettings {
    pub path: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: Parity,
    pub hardware_flow_control: bool,
    pub software_flow_control: bool,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            path: String::new(),
            baud_rate: 9600,
            data_bits: 8,
            stop_bits: 1,
            parity: Parity::None,
            hardware_flow_control: false,
            software_flow_control: false,
        }
    }
}

impl LineSettings {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Like [`load`](Self::load), but a missing profile yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        match Self::load(path) {
            Err(SettingsError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("no line profile at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        log::debug!("saved line profile for {} to {}", self.path, path.display());
        Ok(())
    }
}

/// `<config dir>/uartline/line.json`
pub fn default_profile_path() -> Result<PathBuf, SettingsError> {
    dirs::config_dir()
        .map(|dir| dir.join("uartline").join("line.json"))
        .ok_or(SettingsError::NoConfigDir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_9600_8n1_without_flow_control() {
        let settings = LineSettings::new("/dev/ttyUSB0");
        assert_eq!(settings.path, "/dev/ttyUSB0");
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.data_bits, 8);
        assert_eq!(settings.stop_bits, 1);
        assert_eq!(settings.parity, Parity::None);
        assert!(!settings.hardware_flow_control);
        assert!(!settings.software_flow_control);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: LineSettings =
            serde_json::from_str(r#"{ "path": "/dev/ttyS0", "baud_rate": 115200, "parity": "E" }"#)
                .unwrap();
        assert_eq!(settings.baud_rate, 115200);
        assert_eq!(settings.parity, Parity::Even);
        assert_eq!(settings.data_bits, 8);
        assert_eq!(settings.stop_bits, 1);
    }

    #[test]
    fn unknown_parity_is_a_parse_error() {
        let result = serde_json::from_str::<LineSettings>(r#"{ "parity": "mark" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn unreadable_profile_is_not_replaced_by_defaults() {
        // A directory exists but cannot be read as a file.
        let err = LineSettings::load_or_default(&std::env::temp_dir()).unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }

    #[test]
    fn default_profile_lives_under_uartline() {
        match (dirs::config_dir(), default_profile_path()) {
            (Some(dir), Ok(path)) => {
                assert!(path.starts_with(dir));
                assert!(path.ends_with("uartline/line.json"));
            }
            (None, Err(SettingsError::NoConfigDir)) => {}
            (dir, path) => panic!("config dir {dir:?} but profile path {path:?}"),
        }
    }
}
