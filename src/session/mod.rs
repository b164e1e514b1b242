//! Session seam between the sync loop and the transport
//!
//! A session owns the [`ControllerState`] for the lifetime of a connection.
//! The sync loop is its only writer while running; transports read snapshots
//! through [`ControllerSession::send`].

pub mod channel;
pub mod console;

use crate::state::{ControllerState, ControllerType};
use std::future::Future;

pub use channel::{channel_session, ChannelSession, StateReport, TransportEnd, TransportError};
pub use console::run_console_transport;

/// Connection session of an emulated controller
pub trait ControllerSession {
    type Error: std::error::Error + Send + Sync + 'static;

    fn state(&self) -> &ControllerState;

    fn state_mut(&mut self) -> &mut ControllerState;

    /// Controller type negotiated for this session
    fn controller(&self) -> ControllerType {
        self.state().controller()
    }

    /// Resolves once the session is fully connected
    fn connect(&mut self) -> impl Future<Output = Result<(), Self::Error>>;

    /// Resolves once the current state has been transmitted
    fn send(&mut self) -> impl Future<Output = Result<(), Self::Error>>;
}
