//! Test doubles for the input backend and the session

use crate::controller::input_sampler::{HatState, AXIS_COUNT, BUTTON_COUNT};
use crate::controller::{DeviceId, DeviceInfo, InputBackend, SamplerError};
use crate::session::ControllerSession;
use crate::state::{ControllerState, ControllerType};
use crate::sync::{TerminationHandle, TerminationSignal};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct MockDevice {
    pub name: String,
    pub axes: Vec<f32>,
    pub buttons: Vec<bool>,
    pub hats: Vec<HatState>,
    pub fail_initialization: bool,
    pub unreadable: bool,
}

impl MockDevice {
    /// Full layout, everything at rest
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            axes: vec![0.0; AXIS_COUNT],
            buttons: vec![false; BUTTON_COUNT],
            hats: vec![HatState::default()],
            fail_initialization: false,
            unreadable: false,
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    devices: BTreeMap<DeviceId, MockDevice>,
    initialize_calls: HashMap<DeviceId, usize>,
    polls: usize,
    fail_poll: bool,
}

/// Scripted backend; enumerates devices in id order
#[derive(Debug, Default)]
pub struct MockBackend {
    shared: Arc<Mutex<Shared>>,
}

/// Lets a test change devices while the backend is owned by the sampler
#[derive(Debug, Clone)]
pub struct MockBackendHandle {
    shared: Arc<Mutex<Shared>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> MockBackendHandle {
        MockBackendHandle {
            shared: self.shared.clone(),
        }
    }

    fn with_device<T>(&self, device: DeviceId, read: impl FnOnce(&MockDevice) -> Option<T>) -> Option<T> {
        let shared = self.shared.lock().unwrap();
        shared
            .devices
            .get(&device)
            .filter(|d| !d.unreadable)
            .and_then(read)
    }
}

impl MockBackendHandle {
    pub fn attach(&self, id: DeviceId, device: MockDevice) {
        self.shared.lock().unwrap().devices.insert(id, device);
    }

    pub fn detach(&self, id: DeviceId) {
        self.shared.lock().unwrap().devices.remove(&id);
    }

    pub fn update(&self, id: DeviceId, change: impl FnOnce(&mut MockDevice)) {
        if let Some(device) = self.shared.lock().unwrap().devices.get_mut(&id) {
            change(device);
        }
    }

    pub fn set_poll_failure(&self, fail: bool) {
        self.shared.lock().unwrap().fail_poll = fail;
    }

    pub fn initialize_calls(&self, id: DeviceId) -> usize {
        self.shared
            .lock()
            .unwrap()
            .initialize_calls
            .get(&id)
            .copied()
            .unwrap_or(0)
    }

    pub fn polls(&self) -> usize {
        self.shared.lock().unwrap().polls
    }
}

impl InputBackend for MockBackend {
    fn poll(&mut self) -> Result<(), SamplerError> {
        let mut shared = self.shared.lock().unwrap();
        shared.polls += 1;
        if shared.fail_poll {
            return Err(SamplerError::QueryError("scripted failure".to_string()));
        }
        Ok(())
    }

    fn attached_devices(&self) -> Vec<DeviceId> {
        self.shared.lock().unwrap().devices.keys().copied().collect()
    }

    fn initialize(&mut self, device: DeviceId) -> Result<DeviceInfo, SamplerError> {
        let mut shared = self.shared.lock().unwrap();
        *shared.initialize_calls.entry(device).or_default() += 1;
        match shared.devices.get(&device) {
            Some(d) if d.fail_initialization => Err(SamplerError::InitializationError(format!(
                "{} refused initialization",
                d.name
            ))),
            Some(d) => Ok(DeviceInfo {
                name: d.name.clone(),
            }),
            None => Err(SamplerError::DeviceGone(device)),
        }
    }

    fn axis(&self, device: DeviceId, index: usize) -> Option<f32> {
        self.with_device(device, |d| d.axes.get(index).copied())
    }

    fn button(&self, device: DeviceId, index: usize) -> Option<bool> {
        self.with_device(device, |d| d.buttons.get(index).copied())
    }

    fn hat(&self, device: DeviceId, index: usize) -> Option<HatState> {
        self.with_device(device, |d| d.hats.get(index).copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("mock sink failure: {0}")]
pub struct MockSinkError(pub String);

/// Session that connects immediately and records every transmitted state
#[derive(Debug)]
pub struct RecordingSession {
    state: ControllerState,
    pub connect_calls: usize,
    pub sent: Vec<ControllerState>,
    fail_connect: Option<String>,
    fail_send_at: Option<(usize, String)>,
    terminate_after: Option<(usize, TerminationHandle, TerminationSignal)>,
}

impl RecordingSession {
    pub fn new(controller: ControllerType) -> Self {
        Self {
            state: ControllerState::new(controller),
            connect_calls: 0,
            sent: Vec::new(),
            fail_connect: None,
            fail_send_at: None,
            terminate_after: None,
        }
    }

    /// Delivers `signal` once `sends` transmissions went out
    pub fn terminate_after(
        mut self,
        sends: usize,
        handle: TerminationHandle,
        signal: TerminationSignal,
    ) -> Self {
        self.terminate_after = Some((sends, handle, signal));
        self
    }

    /// Refuses every connection attempt with `message`
    pub fn fail_connect(mut self, message: &str) -> Self {
        self.fail_connect = Some(message.to_string());
        self
    }

    /// Fails the transmission that would be number `sends + 1`
    pub fn fail_send_at(mut self, sends: usize, message: &str) -> Self {
        self.fail_send_at = Some((sends, message.to_string()));
        self
    }
}

impl ControllerSession for RecordingSession {
    type Error = MockSinkError;

    fn state(&self) -> &ControllerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ControllerState {
        &mut self.state
    }

    async fn connect(&mut self) -> Result<(), MockSinkError> {
        self.connect_calls += 1;
        match &self.fail_connect {
            Some(message) => Err(MockSinkError(message.clone())),
            None => Ok(()),
        }
    }

    async fn send(&mut self) -> Result<(), MockSinkError> {
        if let Some((at, message)) = &self.fail_send_at {
            if self.sent.len() == *at {
                return Err(MockSinkError(message.clone()));
            }
        }
        self.sent.push(self.state.clone());
        if let Some((after, handle, signal)) = &self.terminate_after {
            if self.sent.len() == *after {
                handle.terminate(*signal);
            }
        }
        Ok(())
    }
}
