//! Connection lifecycle state machine

/// Connection states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    /// No connection; a retry may be pending
    Disconnected,
    /// Attempt in progress
    Connecting,
    /// Transport open and subscribed
    Connected,
    /// Local close in progress
    Closing,
    /// Closed for good (shutdown); never reconnects
    ClosedPermanently,
}

/// Things that move the connection between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// A connect attempt starts
    ConnectRequested,
    /// Handshake completed
    TransportOpened,
    /// Attempt failed (no network, refused, handshake error)
    ConnectFailed,
    /// Local close
    CloseRequested,
    /// Transport reports the connection gone
    TransportClosed,
    /// Shutdown
    FullCloseRequested,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    /// Terminal state, no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::ClosedPermanently)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: LinkEvent) -> Self {
        use ConnectionState::*;
        use LinkEvent::*;

        match (self, event) {
            // Terminal
            (ClosedPermanently, _) => ClosedPermanently,
            (_, FullCloseRequested) => ClosedPermanently,

            // Disconnected transitions
            (Disconnected, ConnectRequested) => Connecting,

            // Connecting transitions
            (Connecting, TransportOpened) => Connected,
            (Connecting, ConnectFailed) => Disconnected,
            (Connecting, TransportClosed) => Disconnected,

            // Connected transitions
            (Connected, CloseRequested) => Closing,
            (Connected, TransportClosed) => Disconnected,

            // Closing transitions
            (Closing, TransportClosed) => Disconnected,
            (Closing, ConnectRequested) => Connecting,

            // Default: stay in current state
            _ => self,
        }
    }
}
