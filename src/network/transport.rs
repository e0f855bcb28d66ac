use crate::error::TransportError;
use crate::network::protocol::Notification;
use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc;

/// Opaque reference to one connection of one transport session.
///
/// Handles from a destroyed session never compare equal to handles from the
/// session that replaced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ConnectionHandle {
    pub session: u64,
    pub connection: u64,
}

impl fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}.{}", self.session, self.connection)
    }
}

/// Everything a transport reports back to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A remote peer started connecting to our session.
    Incoming(ConnectionHandle),
    /// The connection is usable. `remote` is the peer's identifier.
    Open {
        handle: ConnectionHandle,
        remote: String,
        reliable: bool,
    },
    Message {
        handle: ConnectionHandle,
        payload: Notification,
    },
    /// Closed by the remote side or lost.
    Closed(ConnectionHandle),
    /// A frame on an open connection could not be decoded.
    Malformed {
        handle: ConnectionHandle,
        reason: String,
    },
    /// An outbound attempt or handshake did not complete.
    Failed {
        handle: ConnectionHandle,
        reason: String,
    },
}

impl TransportEvent {
    pub fn handle(&self) -> ConnectionHandle {
        match self {
            TransportEvent::Incoming(handle) | TransportEvent::Closed(handle) => *handle,
            TransportEvent::Open { handle, .. }
            | TransportEvent::Message { handle, .. }
            | TransportEvent::Malformed { handle, .. }
            | TransportEvent::Failed { handle, .. } => *handle,
        }
    }
}

pub type EventSender = mpsc::UnboundedSender<TransportEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<TransportEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Point-to-point session transport consumed by the opponent engine.
///
/// Calls never block on the network; progress is reported as
/// [`TransportEvent`]s on the sender the transport was built with.
pub trait PeerTransport {
    /// Opens a fresh session and returns the identifier peers connect to.
    /// Any previous session is destroyed first.
    fn open_session(&mut self) -> Result<String, TransportError>;

    fn has_session(&self) -> bool {
        self.session().is_some()
    }

    /// Id of the live session; matches `ConnectionHandle::session` of its connections.
    fn session(&self) -> Option<u64>;

    /// Starts an outbound connection. `Open` or `Failed` follows.
    fn connect(&mut self, identifier: &str) -> Result<ConnectionHandle, TransportError>;

    fn send(
        &mut self,
        handle: ConnectionHandle,
        payload: &Notification,
    ) -> Result<(), TransportError>;

    /// Closes one connection. No `Closed` event is reported for it locally.
    fn close(&mut self, handle: ConnectionHandle);

    /// Closes every connection and stops accepting new ones.
    fn destroy_session(&mut self);
}
