//! Transport stand-in that logs every report instead of transmitting it

use super::channel::TransportEnd;
use crate::state::{ControllerState, StickSide};
use std::time::Duration;
use tracing::{debug, info, warn};

pub fn describe_state(state: &ControllerState) -> String {
    let left = state.stick(StickSide::Left);
    let right = state.stick(StickSide::Right);
    let buttons: Vec<String> = state.buttons().iter().map(|b| b.to_string()).collect();
    format!(
        "L({}, {}) R({}, {}) [{}]",
        left.h(),
        left.v(),
        right.h(),
        right.v(),
        buttons.join(", ")
    )
}

/// Reports connected after `connect_delay`, then acknowledges reports until
/// the session side goes away. Returns the number of reports handled.
pub async fn run_console_transport(mut transport: TransportEnd, connect_delay: Duration) -> u64 {
    tokio::time::sleep(connect_delay).await;
    if transport.connected.send(true).is_err() {
        warn!("Session dropped before the console transport connected");
        return 0;
    }
    info!("Console transport connected");

    let mut delivered = 0;
    let mut last: Option<ControllerState> = None;
    while let Some(report) = transport.reports.recv().await {
        if last.as_ref() != Some(&report.state) {
            info!("Report {}: {}", report.sequence, describe_state(&report.state));
            last = Some(report.state.clone());
        } else {
            debug!("Report {} unchanged", report.sequence);
        }
        report.acknowledge(Ok(()));
        delivered += 1;
    }

    info!("Console transport closed after {} reports", delivered);
    delivered
}
