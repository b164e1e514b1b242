use super::ControllerSession;
use crate::state::{ControllerState, ControllerType};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Transport channel closed")]
    Closed,

    #[error("Transport rejected report: {0}")]
    Rejected(String),
}

/// Snapshot handed to the transport, acknowledged once it went out
#[derive(Debug)]
pub struct StateReport {
    pub sequence: u64,
    pub state: ControllerState,
    ack: oneshot::Sender<Result<(), TransportError>>,
}

impl StateReport {
    pub fn acknowledge(self, result: Result<(), TransportError>) {
        // Sender may have given up waiting; nothing left to tell it then
        let _ = self.ack.send(result);
    }
}

/// Transport side of a [`ChannelSession`]
#[derive(Debug)]
pub struct TransportEnd {
    pub connected: watch::Sender<bool>,
    pub reports: mpsc::Receiver<StateReport>,
}

/// Session that forwards state snapshots to a transport task over channels
#[derive(Debug)]
pub struct ChannelSession {
    state: ControllerState,
    connected: watch::Receiver<bool>,
    reports: mpsc::Sender<StateReport>,
    sequence: u64,
}

pub fn channel_session(controller: ControllerType, capacity: usize) -> (ChannelSession, TransportEnd) {
    let (connected_tx, connected_rx) = watch::channel(false);
    let (report_tx, report_rx) = mpsc::channel(capacity);
    debug!("Created channel session for {} with capacity {}", controller, capacity);

    (
        ChannelSession {
            state: ControllerState::new(controller),
            connected: connected_rx,
            reports: report_tx,
            sequence: 0,
        },
        TransportEnd {
            connected: connected_tx,
            reports: report_rx,
        },
    )
}

impl ChannelSession {
    pub fn reports_sent(&self) -> u64 {
        self.sequence
    }
}

impl ControllerSession for ChannelSession {
    type Error = TransportError;

    fn state(&self) -> &ControllerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ControllerState {
        &mut self.state
    }

    async fn connect(&mut self) -> Result<(), TransportError> {
        info!("Waiting for transport to report connected");
        self.connected
            .wait_for(|connected| *connected)
            .await
            .map_err(|_| TransportError::Closed)?;
        info!("Transport connected");
        Ok(())
    }

    async fn send(&mut self) -> Result<(), TransportError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.sequence += 1;
        let report = StateReport {
            sequence: self.sequence,
            state: self.state.clone(),
            ack: ack_tx,
        };

        self.reports
            .send(report)
            .await
            .map_err(|_| TransportError::Closed)?;
        ack_rx.await.map_err(|_| TransportError::Closed)?
    }
}
