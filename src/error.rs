//! Error types shared across the engine, transports and game session.

use crate::network::ConnectionHandle;
use thiserror::Error;

/// Failures reported by a [`crate::network::PeerTransport`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransportError {
    #[error("no local transport session is open")]
    NoSession,

    #[error("unknown peer identifier '{0}'")]
    UnknownPeer(String),

    #[error("invalid peer identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("connection {0} is not open")]
    NotOpen(ConnectionHandle),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors returned by [`crate::engine::OpponentEngine`] operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EngineError {
    #[error("local transport session not initialized; switch to remote mode first")]
    TransportUninitialized,

    #[error("'{0}' is our own code")]
    SelfConnection(String),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// A remote move that is not legal on the local board. Reported, never fatal.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolViolation {
    #[error("remote played cell {cell}, which is off the board")]
    CellOutOfRange { cell: usize },

    #[error("remote played cell {cell}, which is already taken")]
    CellOccupied { cell: usize },

    #[error("remote played cell {cell} out of turn")]
    OutOfTurn { cell: usize },
    #[error("remote sent a frame that could not be decoded")]
    Malformed,
}

/// Rejected local moves.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("cell {0} is off the board")]
    CellOutOfRange(usize),

    #[error("cell {0} is already taken")]
    CellOccupied(usize),

    #[error("it is not your turn")]
    NotYourTurn,

    #[error("the round is already over")]
    RoundOver,
}
