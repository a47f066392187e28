use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use uartline_core::{Attributes, SetMode, TermDriver};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Open(String),
    Close(u32),
    Get(u32),
    Set(u32, SetMode),
}

#[derive(Debug, Default)]
pub struct DeviceState {
    pub calls: Vec<Call>,
    pub live: Option<Attributes>,
    pub next_handle: u32,
}

/// In-memory driver that always succeeds and records every call.
#[derive(Clone, Default)]
pub struct RecordingDriver {
    pub state: Arc<Mutex<DeviceState>>,
}

impl RecordingDriver {
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn live(&self) -> Option<Attributes> {
        self.state.lock().live.clone()
    }
}

impl TermDriver for RecordingDriver {
    type Handle = u32;

    fn open(&mut self, path: &str) -> io::Result<u32> {
        let mut state = self.state.lock();
        state.next_handle += 1;
        state.calls.push(Call::Open(path.to_string()));
        Ok(state.next_handle)
    }

    fn close(&mut self, handle: u32) -> io::Result<()> {
        self.state.lock().calls.push(Call::Close(handle));
        Ok(())
    }

    fn get_attributes(&self, handle: &u32) -> io::Result<Attributes> {
        let mut state = self.state.lock();
        state.calls.push(Call::Get(*handle));
        state
            .live
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "nothing committed"))
    }

    fn set_attributes(&mut self, handle: &u32, attributes: &Attributes, mode: SetMode) -> io::Result<()> {
        let mut state = self.state.lock();
        state.calls.push(Call::Set(*handle, mode));
        state.live = Some(attributes.clone());
        Ok(())
    }
}
