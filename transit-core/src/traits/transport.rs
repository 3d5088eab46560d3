//! Message-oriented transport to the schedule feed

use alloc::string::String;

/// Something that happened on the transport since the last poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Complete text message
    Text(String),
    /// Ping received (already answered by the transport)
    Ping,
    /// Pong received
    Pong,
    /// Connection closed by the peer or lost
    Closed,
}

/// Persistent connection carrying text messages
///
/// `connect` is bounded: it either completes the opening handshake or
/// fails. A close initiated through [`MessageTransport::close`] does not
/// produce a [`TransportEvent::Closed`]; only remote or unexpected
/// closure is reported by `poll`.
pub trait MessageTransport {
    type Error: core::fmt::Debug;

    /// Open a connection to `url`
    fn connect(&mut self, url: &str) -> Result<(), Self::Error>;

    /// Whether the connection is open
    fn is_open(&self) -> bool;

    /// Send one text message
    fn send_text(&mut self, text: &str) -> Result<(), Self::Error>;

    /// Process pending input without blocking
    fn poll(&mut self) -> Option<TransportEvent>;

    /// Close the connection
    fn close(&mut self);
}
