//! The staged terminal attribute record.
//!
//! [`Attributes`] mirrors the driver's termios structure. Each editor clears
//! the bit-field it owns before setting it, so a record that has been through
//! any sequence of edits equals one edited once with the final values.

use std::fmt;
use std::str::FromStr;

use libc::{c_int, cc_t, speed_t, tcflag_t, NCCS};
use serde::{Deserialize, Serialize};

use crate::baud;
use crate::error::{Field, LineError, Result};

const PARITY_CFLAGS: tcflag_t = libc::PARENB | libc::PARODD;
const SOFTWARE_FLOW_IFLAGS: tcflag_t = libc::IXON | libc::IXOFF | libc::IXANY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    #[serde(alias = "N", alias = "n")]
    None,
    #[serde(alias = "E", alias = "e")]
    Even,
    #[serde(alias = "O", alias = "o")]
    Odd,
}

impl Parity {
    /// The single-letter code used in `8N1` style notation.
    pub fn code(self) -> char {
        match self {
            Parity::None => 'N',
            Parity::Even => 'E',
            Parity::Odd => 'O',
        }
    }
}

impl TryFrom<char> for Parity {
    type Error = LineError;

    fn try_from(code: char) -> Result<Self> {
        match code.to_ascii_uppercase() {
            'N' => Ok(Parity::None),
            'E' => Ok(Parity::Even),
            'O' => Ok(Parity::Odd),
            _ => Err(LineError::invalid(Field::Parity, code)),
        }
    }
}

impl FromStr for Parity {
    type Err = LineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "n" | "none" => Ok(Parity::None),
            "e" | "even" => Ok(Parity::Even),
            "o" | "odd" => Ok(Parity::Odd),
            _ => Err(LineError::invalid(Field::Parity, s)),
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parity::None => write!(f, "None"),
            Parity::Even => write!(f, "Even"),
            Parity::Odd => write!(f, "Odd"),
        }
    }
}

/// When a committed record takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetMode {
    /// Immediately (`TCSANOW`).
    #[default]
    Now,
    /// After pending output has been transmitted (`TCSADRAIN`).
    Drain,
    /// After pending output is transmitted, discarding unread input (`TCSAFLUSH`).
    Flush,
}

impl SetMode {
    pub(crate) fn optional_actions(self) -> c_int {
        match self {
            SetMode::Now => libc::TCSANOW,
            SetMode::Drain => libc::TCSADRAIN,
            SetMode::Flush => libc::TCSAFLUSH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    pub input_flags: tcflag_t,
    pub output_flags: tcflag_t,
    pub control_flags: tcflag_t,
    pub local_flags: tcflag_t,
    pub control_chars: [cc_t; NCCS],
    input_speed: speed_t,
    output_speed: speed_t,
}

impl Attributes {
    /// A raw-mode record: no input or output processing, no echo, receiver
    /// enabled, modem control lines ignored, 8N1 at 9600 baud, and reads that
    /// return as soon as one byte is available.
    pub fn raw() -> Self {
        let mut control_chars = [0; NCCS];
        control_chars[libc::VMIN] = 1;
        control_chars[libc::VTIME] = 0;

        Self {
            input_flags: 0,
            output_flags: 0,
            control_flags: libc::CREAD | libc::CLOCAL | libc::CS8,
            local_flags: 0,
            control_chars,
            input_speed: libc::B9600,
            output_speed: libc::B9600,
        }
    }

    pub fn input_speed(&self) -> speed_t {
        self.input_speed
    }

    pub fn output_speed(&self) -> speed_t {
        self.output_speed
    }

    pub fn set_input_speed(&mut self, code: speed_t) {
        self.input_speed = code;
    }

    pub fn set_output_speed(&mut self, code: speed_t) {
        self.output_speed = code;
    }

    /// Sets both directions to `rate`, which must be in [`baud::STANDARD_RATES`].
    pub fn set_speed(&mut self, rate: u32) -> Result<()> {
        let code = baud::speed_code(rate).ok_or_else(|| LineError::invalid(Field::BaudRate, rate))?;
        self.set_input_speed(code);
        self.set_output_speed(code);
        Ok(())
    }

    /// The output rate in bits per second, if its code is a standard one.
    pub fn baud_rate(&self) -> Option<u32> {
        baud::rate_for_code(self.output_speed)
    }

    pub fn set_data_bits(&mut self, data_bits: u8) -> Result<()> {
        let size = match data_bits {
            5 => libc::CS5,
            6 => libc::CS6,
            7 => libc::CS7,
            8 => libc::CS8,
            _ => return Err(LineError::invalid(Field::DataBits, data_bits)),
        };
        self.control_flags = (self.control_flags & !libc::CSIZE) | size;
        Ok(())
    }

    pub fn data_bits(&self) -> u8 {
        match self.control_flags & libc::CSIZE {
            libc::CS5 => 5,
            libc::CS6 => 6,
            libc::CS7 => 7,
            _ => 8,
        }
    }

    pub fn set_stop_bits(&mut self, stop_bits: u8) -> Result<()> {
        let two = match stop_bits {
            1 => false,
            2 => true,
            _ => return Err(LineError::invalid(Field::StopBits, stop_bits)),
        };
        self.control_flags &= !libc::CSTOPB;
        if two {
            self.control_flags |= libc::CSTOPB;
        }
        Ok(())
    }

    pub fn stop_bits(&self) -> u8 {
        if self.control_flags & libc::CSTOPB != 0 {
            2
        } else {
            1
        }
    }

    /// Parity generation on output and checking on input (`INPCK`).
    pub fn set_parity(&mut self, parity: Parity) {
        self.control_flags &= !PARITY_CFLAGS;
        self.input_flags &= !libc::INPCK;

        match parity {
            Parity::None => {}
            Parity::Even => {
                self.control_flags |= libc::PARENB;
                self.input_flags |= libc::INPCK;
            }
            Parity::Odd => {
                self.control_flags |= PARITY_CFLAGS;
                self.input_flags |= libc::INPCK;
            }
        }
    }

    pub fn parity(&self) -> Parity {
        if self.control_flags & libc::PARENB == 0 {
            Parity::None
        } else if self.control_flags & libc::PARODD != 0 {
            Parity::Odd
        } else {
            Parity::Even
        }
    }

    /// RTS/CTS.
    pub fn set_hardware_flow_control(&mut self, enabled: bool) {
        self.control_flags &= !libc::CRTSCTS;
        if enabled {
            self.control_flags |= libc::CRTSCTS;
        }
    }

    pub fn hardware_flow_control(&self) -> bool {
        self.control_flags & libc::CRTSCTS == libc::CRTSCTS
    }

    /// XON/XOFF in both directions.
    pub fn set_software_flow_control(&mut self, enabled: bool) {
        self.input_flags &= !SOFTWARE_FLOW_IFLAGS;
        if enabled {
            self.input_flags |= libc::IXON | libc::IXOFF;
        }
    }

    pub fn software_flow_control(&self) -> bool {
        self.input_flags & (libc::IXON | libc::IXOFF) != 0
    }

    pub(crate) fn from_termios(termios: &libc::termios) -> Self {
        // SAFETY: the cfget* functions only read from the structure.
        let (input_speed, output_speed) =
            unsafe { (libc::cfgetispeed(termios), libc::cfgetospeed(termios)) };

        Self {
            input_flags: termios.c_iflag,
            output_flags: termios.c_oflag,
            control_flags: termios.c_cflag,
            local_flags: termios.c_lflag,
            control_chars: termios.c_cc,
            input_speed,
            output_speed,
        }
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Self::raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_record_is_8n1_at_9600() {
        let attrs = Attributes::raw();
        assert_eq!(attrs.data_bits(), 8);
        assert_eq!(attrs.parity(), Parity::None);
        assert_eq!(attrs.stop_bits(), 1);
        assert_eq!(attrs.baud_rate(), Some(9600));
        assert!(!attrs.hardware_flow_control());
        assert!(!attrs.software_flow_control());
        assert_eq!(attrs.local_flags & libc::ICANON, 0);
        assert_eq!(attrs.local_flags & libc::ECHO, 0);
        assert_eq!(attrs.control_chars[libc::VMIN], 1);
    }

    #[test]
    fn data_bits_replace_previous_size() {
        let mut attrs = Attributes::raw();
        attrs.set_data_bits(5).unwrap();
        assert_eq!(attrs.data_bits(), 5);
        attrs.set_data_bits(7).unwrap();
        assert_eq!(attrs.control_flags & libc::CSIZE, libc::CS7);
    }

    #[test]
    fn rejected_values_leave_record_untouched() {
        let mut attrs = Attributes::raw();
        attrs.set_parity(Parity::Odd);
        let before = attrs.clone();

        assert!(attrs.set_data_bits(9).is_err());
        assert!(attrs.set_data_bits(4).is_err());
        assert!(attrs.set_stop_bits(0).is_err());
        assert!(attrs.set_stop_bits(3).is_err());
        assert!(attrs.set_speed(12345).is_err());
        assert_eq!(attrs, before);
    }

    #[test]
    fn parity_edits_leave_no_residual_bits() {
        let mut attrs = Attributes::raw();
        attrs.set_parity(Parity::Even);
        assert_eq!(attrs.parity(), Parity::Even);
        attrs.set_parity(Parity::Odd);
        assert_eq!(attrs.parity(), Parity::Odd);
        attrs.set_parity(Parity::None);
        assert_eq!(attrs, Attributes::raw());
    }

    #[test]
    fn editors_only_touch_their_own_fields() {
        let mut attrs = Attributes::raw();
        attrs.set_stop_bits(2).unwrap();
        attrs.set_hardware_flow_control(true);
        attrs.set_software_flow_control(true);
        attrs.set_parity(Parity::Even);
        attrs.set_data_bits(7).unwrap();
        attrs.set_speed(115200).unwrap();

        assert_eq!(attrs.stop_bits(), 2);
        assert!(attrs.hardware_flow_control());
        assert!(attrs.software_flow_control());
        assert_eq!(attrs.parity(), Parity::Even);
        assert_eq!(attrs.data_bits(), 7);
        assert_eq!(attrs.input_speed(), libc::B115200);
        assert_eq!(attrs.output_speed(), libc::B115200);

        attrs.set_software_flow_control(false);
        attrs.set_hardware_flow_control(false);
        assert!(!attrs.software_flow_control());
        assert!(!attrs.hardware_flow_control());
        assert_eq!(attrs.stop_bits(), 2);
        assert_eq!(attrs.parity(), Parity::Even);
    }

    #[test]
    fn parity_parses_codes_and_words() {
        assert_eq!(Parity::try_from('e').unwrap(), Parity::Even);
        assert_eq!("ODD".parse::<Parity>().unwrap(), Parity::Odd);
        assert_eq!("N".parse::<Parity>().unwrap(), Parity::None);

        let err = Parity::try_from('X').unwrap_err();
        assert_eq!(err.field(), Some(Field::Parity));
        assert!("mark".parse::<Parity>().is_err());
    }

    #[test]
    fn parity_code_round_trips() {
        for parity in [Parity::None, Parity::Even, Parity::Odd] {
            assert_eq!(Parity::try_from(parity.code()).unwrap(), parity);
        }
    }
}
