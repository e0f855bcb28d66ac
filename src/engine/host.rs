use crate::core::Board;
use crate::error::ProtocolViolation;

/// Callbacks the opponent engine needs from whoever owns the board.
pub trait GameHost {
    /// Current board, read when a move is about to be made.
    fn board(&self) -> Board;

    fn is_opponent_turn(&self) -> bool;

    fn apply_opponent_move(&mut self, cell: usize);

    /// A new peer is live. Whatever was on the board belongs to the old one.
    fn peer_connected(&mut self);

    /// The peer accepted by our session moves first.
    fn give_opponent_first_move(&mut self);

    fn protocol_violation(&mut self, violation: ProtocolViolation) {
        let _ = violation;
    }
}
