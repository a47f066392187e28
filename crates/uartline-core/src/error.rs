use std::fmt;
use std::io;

/// A line setting that can be rejected by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    BaudRate,
    DataBits,
    StopBits,
    Parity,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::BaudRate => write!(f, "baud rate"),
            Field::DataBits => write!(f, "data bits"),
            Field::StopBits => write!(f, "stop bits"),
            Field::Parity => write!(f, "parity"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("invalid {field}: {value}")]
    InvalidConfiguration { field: Field, value: String },

    #[error("failed to open {path}: {source}")]
    DeviceOpen { path: String, source: io::Error },

    #[error("failed to close {path}: {source}")]
    DeviceClose { path: String, source: io::Error },

    #[error("failed to commit attributes to {path}: {source}")]
    AttributeCommit { path: String, source: io::Error },

    #[error("failed to query attributes of {path}: {source}")]
    AttributeQuery { path: String, source: io::Error },

    #[error("{path}: {} setting(s) rejected while configuring", .failures.len())]
    Configure { path: String, failures: Vec<LineError> },
}

impl LineError {
    pub(crate) fn invalid(field: Field, value: impl ToString) -> Self {
        LineError::InvalidConfiguration {
            field,
            value: value.to_string(),
        }
    }

    /// The rejected field, for `InvalidConfiguration` errors.
    pub fn field(&self) -> Option<Field> {
        match self {
            LineError::InvalidConfiguration { field, .. } => Some(*field),
            _ => None,
        }
    }

    /// Fields rejected by the configure step of `open`, in the order they were applied.
    pub fn rejected_fields(&self) -> Vec<Field> {
        match self {
            LineError::Configure { failures, .. } => {
                failures.iter().filter_map(LineError::field).collect()
            }
            other => other.field().into_iter().collect(),
        }
    }
}

pub(crate) fn not_open() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "device is not open")
}

pub type Result<T> = std::result::Result<T, LineError>;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no configuration directory available")]
    NoConfigDir,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_configuration_names_field_and_value() {
        let err = LineError::invalid(Field::DataBits, 9);
        assert_eq!(err.to_string(), "invalid data bits: 9");
        assert_eq!(err.field(), Some(Field::DataBits));
    }

    #[test]
    fn configure_error_lists_rejected_fields() {
        let err = LineError::Configure {
            path: "/dev/ttyS1".into(),
            failures: vec![
                LineError::invalid(Field::BaudRate, 12345),
                LineError::invalid(Field::StopBits, 3),
            ],
        };
        assert_eq!(err.to_string(), "/dev/ttyS1: 2 setting(s) rejected while configuring");
        assert_eq!(err.rejected_fields(), vec![Field::BaudRate, Field::StopBits]);
    }
}
