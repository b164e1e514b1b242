use crate::state::ControllerType;

/// Errors that end the sync loop
///
/// Per-tick input problems never show up here; they are absorbed and logged
/// inside the tick. Session errors are carried unchanged so the caller can
/// decide whether to reconnect.
#[derive(Debug, thiserror::Error)]
pub enum SyncError<E: std::error::Error + 'static> {
    /// The session emulates a controller without continuous analog input
    #[error("Input sync requires a controller with analog input, session negotiated {0}")]
    UnsupportedController(ControllerType),

    #[error("Failed to connect session: {0}")]
    Connect(#[source] E),

    #[error("Failed to transmit controller state: {0}")]
    Transmit(#[source] E),
}

impl<E: std::error::Error + 'static> SyncError<E> {
    #[cfg(test)]
    /// Underlying session error, if this failure came from the session
    pub fn session_error(&self) -> Option<&E> {
        match self {
            SyncError::Connect(e) | SyncError::Transmit(e) => Some(e),
            SyncError::UnsupportedController(_) => None,
        }
    }
}
