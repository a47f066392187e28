//! The terminal driver a [`SerialLine`](crate::SerialLine) talks to.

use std::fs::{File, OpenOptions};
use std::io;
use std::mem;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsFd, AsRawFd, BorrowedFd, IntoRawFd, RawFd};

use crate::attributes::{Attributes, SetMode};

/// The operating system capabilities needed to drive one device node.
///
/// Every call blocks; implementations must not retain the handle after
/// [`close`](TermDriver::close) returns, whatever its result.
pub trait TermDriver {
    /// Exclusively owned device handle.
    type Handle;

    fn open(&mut self, path: &str) -> io::Result<Self::Handle>;

    fn close(&mut self, handle: Self::Handle) -> io::Result<()>;

    fn get_attributes(&self, handle: &Self::Handle) -> io::Result<Attributes>;

    fn set_attributes(
        &mut self,
        handle: &Self::Handle,
        attributes: &Attributes,
        mode: SetMode,
    ) -> io::Result<()>;
}

/// An open terminal device node.
#[derive(Debug)]
pub struct DeviceHandle {
    device: File,
}

impl AsRawFd for DeviceHandle {
    fn as_raw_fd(&self) -> RawFd {
        self.device.as_raw_fd()
    }
}

impl AsFd for DeviceHandle {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.device.as_fd()
    }
}

/// termios-backed driver for real device nodes.
#[derive(Debug, Default, Clone, Copy)]
pub struct PosixDriver;

impl PosixDriver {
    fn termios(fd: RawFd) -> io::Result<libc::termios> {
        // SAFETY: termios is plain old data and tcgetattr fills it completely on success.
        let mut termios: libc::termios = unsafe { mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut termios) } == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(termios)
    }
}

impl TermDriver for PosixDriver {
    type Handle = DeviceHandle;

    fn open(&mut self, path: &str) -> io::Result<DeviceHandle> {
        // The line must never become the controlling terminal of this process.
        let device = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(path)?;

        Ok(DeviceHandle { device })
    }

    fn close(&mut self, handle: DeviceHandle) -> io::Result<()> {
        let fd = handle.device.into_raw_fd();
        // SAFETY: fd was just released from its File and is closed exactly once.
        if unsafe { libc::close(fd) } == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn get_attributes(&self, handle: &DeviceHandle) -> io::Result<Attributes> {
        Self::termios(handle.as_raw_fd()).map(|termios| Attributes::from_termios(&termios))
    }

    fn set_attributes(
        &mut self,
        handle: &DeviceHandle,
        attributes: &Attributes,
        mode: SetMode,
    ) -> io::Result<()> {
        let fd = handle.as_raw_fd();

        // Start from the live record so fields we don't model (c_line etc.) survive.
        let mut termios = Self::termios(fd)?;
        termios.c_iflag = attributes.input_flags;
        termios.c_oflag = attributes.output_flags;
        termios.c_cflag = attributes.control_flags;
        termios.c_lflag = attributes.local_flags;
        termios.c_cc = attributes.control_chars;

        unsafe {
            if libc::cfsetispeed(&mut termios, attributes.input_speed()) == -1 {
                return Err(io::Error::last_os_error());
            }
            if libc::cfsetospeed(&mut termios, attributes.output_speed()) == -1 {
                return Err(io::Error::last_os_error());
            }
            if libc::tcsetattr(fd, mode.optional_actions(), &termios) == -1 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }
}
