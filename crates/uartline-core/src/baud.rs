//! Standard baud rates and their termios speed codes.

use libc::speed_t;

/// Every rate a line can be configured with, paired with the driver's speed code.
pub const STANDARD_RATES: &[(u32, speed_t)] = &[
    (50, libc::B50),
    (75, libc::B75),
    (110, libc::B110),
    (134, libc::B134),
    (150, libc::B150),
    (200, libc::B200),
    (300, libc::B300),
    (600, libc::B600),
    (1200, libc::B1200),
    (1800, libc::B1800),
    (2400, libc::B2400),
    (4800, libc::B4800),
    (9600, libc::B9600),
    (19200, libc::B19200),
    (38400, libc::B38400),
    (57600, libc::B57600),
    (115200, libc::B115200),
    (230400, libc::B230400),
    #[cfg(any(target_os = "linux", target_os = "android"))]
    (460800, libc::B460800),
    #[cfg(any(target_os = "linux", target_os = "android"))]
    (500000, libc::B500000),
    #[cfg(any(target_os = "linux", target_os = "android"))]
    (576000, libc::B576000),
    #[cfg(any(target_os = "linux", target_os = "android"))]
    (921600, libc::B921600),
    #[cfg(any(target_os = "linux", target_os = "android"))]
    (1000000, libc::B1000000),
    #[cfg(any(target_os = "linux", target_os = "android"))]
    (1152000, libc::B1152000),
    #[cfg(any(target_os = "linux", target_os = "android"))]
    (1500000, libc::B1500000),
    #[cfg(any(target_os = "linux", target_os = "android"))]
    (2000000, libc::B2000000),
    #[cfg(any(target_os = "linux", target_os = "android"))]
    (2500000, libc::B2500000),
    #[cfg(any(target_os = "linux", target_os = "android"))]
    (3000000, libc::B3000000),
    #[cfg(any(target_os = "linux", target_os = "android"))]
    (3500000, libc::B3500000),
    #[cfg(any(target_os = "linux", target_os = "android"))]
    (4000000, libc::B4000000),
];

pub fn speed_code(rate: u32) -> Option<speed_t> {
    STANDARD_RATES
        .iter()
        .find(|(r, _)| *r == rate)
        .map(|(_, code)| *code)
}

pub fn rate_for_code(code: speed_t) -> Option<u32> {
    STANDARD_RATES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(rate, _)| *rate)
}
