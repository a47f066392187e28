//! One serial device and its open/close lifecycle.
//!
//! Configuration is staged: every `config_*` call validates its value and
//! edits the pending [`Attributes`] record in memory only. Nothing reaches
//! the driver until [`SerialLine::set_attributes`] or [`SerialLine::open`]
//! commits the whole record, and any staged edit marks the line not-open
//! until then.

use std::fmt;
use std::os::unix::io::{AsRawFd, RawFd};

use crate::attributes::{Attributes, Parity, SetMode};
use crate::driver::{PosixDriver, TermDriver};
use crate::error::{not_open, LineError, Result};
use crate::settings::LineSettings;

/// What `open` does when the driver rejects the configured attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenPolicy {
    /// Abort, release the device and return the commit error.
    #[default]
    Strict,
    /// Log the commit error and open anyway with whatever the driver holds.
    BestEffort,
}

/// A serial line bound to one device node.
///
/// The line exclusively owns its device handle and releases it on drop. It
/// holds no locks: callers sharing one across threads must serialize access
/// themselves.
pub struct SerialLine<D: TermDriver = PosixDriver> {
    settings: LineSettings,
    pending: Attributes,
    driver: D,
    handle: Option<D::Handle>,
    open: bool,
    policy: OpenPolicy,
}

impl SerialLine {
    /// Creates a line for a real device. No I/O happens until [`open`](Self::open).
    pub fn new(settings: LineSettings) -> Self {
        Self::with_driver(settings, PosixDriver)
    }

    pub fn raw_fd(&self) -> Option<RawFd> {
        self.handle.as_ref().map(AsRawFd::as_raw_fd)
    }
}

impl<D: TermDriver> SerialLine<D> {
    pub fn with_driver(settings: LineSettings, driver: D) -> Self {
        Self {
            settings,
            pending: Attributes::raw(),
            driver,
            handle: None,
            open: false,
            policy: OpenPolicy::default(),
        }
    }

    pub fn config_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        self.pending.set_speed(baud_rate)?;
        self.settings.baud_rate = baud_rate;
        self.staged("baud rate", baud_rate);
        Ok(())
    }

    pub fn config_data_bits(&mut self, data_bits: u8) -> Result<()> {
        self.pending.set_data_bits(data_bits)?;
        self.settings.data_bits = data_bits;
        self.staged("data bits", data_bits);
        Ok(())
    }

    pub fn config_stop_bits(&mut self, stop_bits: u8) -> Result<()> {
        self.pending.set_stop_bits(stop_bits)?;
        self.settings.stop_bits = stop_bits;
        self.staged("stop bits", stop_bits);
        Ok(())
    }

    /// Parity is validated when it is parsed; see [`Parity::try_from`].
    pub fn config_parity(&mut self, parity: Parity) {
        self.pending.set_parity(parity);
        self.settings.parity = parity;
        self.staged("parity", parity);
    }

    pub fn config_hardware_flow_control(&mut self, enabled: bool) {
        self.pending.set_hardware_flow_control(enabled);
        self.settings.hardware_flow_control = enabled;
        self.staged("hardware flow control", enabled);
    }

    pub fn config_software_flow_control(&mut self, enabled: bool) {
        self.pending.set_software_flow_control(enabled);
        self.settings.software_flow_control = enabled;
        self.staged("software flow control", enabled);
    }

    fn staged(&mut self, what: &str, value: impl fmt::Display) {
        self.open = false;
        log::debug!("{}: staged {} {}", self.settings.path, what, value);
    }

    /// Commits the pending record immediately. Does not mark the line open.
    pub fn set_attributes(&mut self) -> Result<()> {
        self.set_attributes_with(SetMode::Now)
    }

    pub fn set_attributes_with(&mut self, mode: SetMode) -> Result<()> {
        let path = &self.settings.path;
        let handle = self.handle.as_ref().ok_or_else(|| LineError::AttributeCommit {
            path: path.clone(),
            source: not_open(),
        })?;

        self.driver
            .set_attributes(handle, &self.pending, mode)
            .map_err(|source| LineError::AttributeCommit {
                path: path.clone(),
                source,
            })?;

        log::debug!("{}: committed attributes ({:?})", path, mode);
        Ok(())
    }

    /// Re-stages every logical setting in a fixed order, collecting rejections.
    fn configure_all(&mut self) -> std::result::Result<(), Vec<LineError>> {
        let LineSettings {
            baud_rate,
            data_bits,
            stop_bits,
            parity,
            hardware_flow_control,
            software_flow_control,
            ..
        } = self.settings;

        let mut failures = Vec::new();
        if let Err(err) = self.config_baud_rate(baud_rate) {
            failures.push(err);
        }
        self.config_parity(parity);
        if let Err(err) = self.config_stop_bits(stop_bits) {
            failures.push(err);
        }
        if let Err(err) = self.config_data_bits(data_bits) {
            failures.push(err);
        }
        self.config_hardware_flow_control(hardware_flow_control);
        self.config_software_flow_control(software_flow_control);

        if failures.is_empty() {
            return Ok(());
        }
        for err in &failures {
            log::warn!("{}: {}", self.settings.path, err);
        }
        Err(failures)
    }

    /// Configures, acquires the device if needed, commits, and marks the line open.
    ///
    /// Rejected settings abort before the device is touched. A commit failure
    /// is handled according to the line's [`OpenPolicy`]. Any handle already
    /// held is reused.
    pub fn open(&mut self) -> Result<()> {
        if let Err(failures) = self.configure_all() {
            self.release_after_failure();
            return Err(LineError::Configure {
                path: self.settings.path.clone(),
                failures,
            });
        }

        if self.handle.is_none() {
            let handle = self
                .driver
                .open(&self.settings.path)
                .map_err(|source| LineError::DeviceOpen {
                    path: self.settings.path.clone(),
                    source,
                })?;
            self.handle = Some(handle);
        }

        if let Err(err) = self.set_attributes() {
            match self.policy {
                OpenPolicy::Strict => {
                    self.release_after_failure();
                    return Err(err);
                }
                OpenPolicy::BestEffort => {
                    log::warn!("{}; opening with the driver's current attributes", err);
                }
            }
        }

        self.open = true;
        log::info!(
            "{}: opened at {} baud, {}{}{}",
            self.settings.path,
            self.settings.baud_rate,
            self.settings.data_bits,
            self.settings.parity.code(),
            self.settings.stop_bits
        );
        Ok(())
    }

    fn release_after_failure(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("{}", err);
        }
    }

    /// Releases the device. A no-op on a line that holds no handle.
    ///
    /// The handle is forgotten even when the driver reports an error.
    pub fn close(&mut self) -> Result<()> {
        self.open = false;
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        self.driver
            .close(handle)
            .map_err(|source| LineError::DeviceClose {
                path: self.settings.path.clone(),
                source,
            })?;

        log::info!("{}: closed", self.settings.path);
        Ok(())
    }

    /// Reads the attributes the driver currently holds for the device.
    pub fn attributes(&self) -> Result<Attributes> {
        let handle = self.handle.as_ref().ok_or_else(|| LineError::AttributeQuery {
            path: self.settings.path.clone(),
            source: not_open(),
        })?;

        self.driver
            .get_attributes(handle)
            .map_err(|source| LineError::AttributeQuery {
                path: self.settings.path.clone(),
                source,
            })
    }

    pub fn path(&self) -> &str {
        &self.settings.path
    }

    pub fn baud_rate(&self) -> u32 {
        self.settings.baud_rate
    }

    pub fn data_bits(&self) -> u8 {
        self.settings.data_bits
    }

    pub fn stop_bits(&self) -> u8 {
        self.settings.stop_bits
    }

    pub fn parity(&self) -> Parity {
        self.settings.parity
    }

    pub fn hardware_flow_control(&self) -> bool {
        self.settings.hardware_flow_control
    }

    pub fn software_flow_control(&self) -> bool {
        self.settings.software_flow_control
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn handle(&self) -> Option<&D::Handle> {
        self.handle.as_ref()
    }

    pub fn settings(&self) -> &LineSettings {
        &self.settings
    }

    pub fn pending_attributes(&self) -> &Attributes {
        &self.pending
    }

    pub fn open_policy(&self) -> OpenPolicy {
        self.policy
    }

    pub fn set_open_policy(&mut self, policy: OpenPolicy) {
        self.policy = policy;
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}

impl<D: TermDriver> fmt::Debug for SerialLine<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialLine")
            .field("settings", &self.settings)
            .field("has_handle", &self.handle.is_some())
            .field("open", &self.open)
            .field("policy", &self.policy)
            .finish()
    }
}

impl<D: TermDriver> Drop for SerialLine<D> {
    fn drop(&mut self) {
        if self.handle.is_some() {
            if let Err(err) = self.close() {
                log::warn!("{}", err);
            }
        }
    }
}
