//! Connection status reported by the connection manager.

use serde::{Deserialize, Serialize};

/// Connection state of the TV session as seen by the caller.
///
/// The UI renders these as a status line (the `title` strings below).  The
/// connection manager emits a transition exactly once, in order; consecutive
/// identical states are not re-announced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// No target IP supplied; nothing to dial.
    Idle,
    /// Actively trying to reach or re-authenticate with the TV.
    Connecting,
    /// The TV is showing a PIN on screen and waits for the user to enter it.
    /// Terminal for the running loop: the caller must restart with the PIN.
    WaitingForPinConfirmation,
    /// Authenticated; liveness probes are succeeding.
    Connected,
    /// The TV could not be reached at all.
    NotReachable,
    /// An action-scoped failure surfaced to the user (e.g. a key press that
    /// could not be delivered).
    Error(String),
}

impl ConnectionStatus {
    /// Human-readable status line for this state.
    pub fn title(&self) -> String {
        match self {
            ConnectionStatus::Idle => "IP required".to_string(),
            ConnectionStatus::Connecting => "Connecting…".to_string(),
            ConnectionStatus::WaitingForPinConfirmation => "Enter PIN from TV".to_string(),
            ConnectionStatus::Connected => "Connected to TV".to_string(),
            ConnectionStatus::NotReachable => "Not reachable".to_string(),
            ConnectionStatus::Error(msg) => format!("Error: {msg}"),
        }
    }

    /// `true` only while liveness probes are succeeding.  Callers gate key
    /// dispatch on this.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
