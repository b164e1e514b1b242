//! Termination signals for the sync loop
//!
//! The designated key (Enter on stdin) and the one-shot timer deliver into the
//! same channel and stop the loop the same way.

use std::io::BufRead;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Key,
    Timer,
}

/// Cloneable handle for delivering a termination signal
#[derive(Debug, Clone)]
pub struct TerminationHandle {
    sender: mpsc::UnboundedSender<TerminationSignal>,
}

impl TerminationHandle {
    pub fn terminate(&self, signal: TerminationSignal) {
        if self.sender.send(signal).is_err() {
            debug!("Sync loop already gone, dropping {:?}", signal);
        }
    }
}

/// Receiving end, drained by the sync loop at the top of every tick
#[derive(Debug)]
pub struct TerminationSource {
    receiver: mpsc::UnboundedReceiver<TerminationSignal>,
    // Keeps the channel open even when no watcher is armed
    sender: mpsc::UnboundedSender<TerminationSignal>,
}

impl Default for TerminationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminationSource {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { receiver, sender }
    }

    pub fn handle(&self) -> TerminationHandle {
        TerminationHandle {
            sender: self.sender.clone(),
        }
    }

    /// Fires [`TerminationSignal::Timer`] once after `after`
    pub fn arm_timer(&self, after: Duration) -> JoinHandle<()> {
        let handle = self.handle();
        info!("Sync loop will stop after {:?}", after);
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            handle.terminate(TerminationSignal::Timer);
        })
    }

    /// Fires [`TerminationSignal::Key`] when Enter is pressed on stdin.
    ///
    /// Runs on a detached thread so a pending read never holds up runtime
    /// shutdown.
    pub fn spawn_key_watcher(&self) -> std::io::Result<()> {
        let handle = self.handle();
        std::thread::Builder::new()
            .name("termination-key".to_string())
            .spawn(move || {
                let mut line = String::new();
                match std::io::stdin().lock().read_line(&mut line) {
                    Ok(0) => debug!("stdin closed, key termination disabled"),
                    Ok(_) => handle.terminate(TerminationSignal::Key),
                    Err(e) => warn!("Failed to read stdin: {}", e),
                }
            })?;
        info!("Press Enter to stop the sync loop");
        Ok(())
    }

    /// Drains every pending signal and returns the first one, if any
    pub fn drain(&mut self) -> Option<TerminationSignal> {
        let mut first = None;
        while let Ok(signal) = self.receiver.try_recv() {
            debug!("Termination signal pending: {:?}", signal);
            first.get_or_insert(signal);
        }
        first
    }
}
