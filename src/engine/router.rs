use crate::core::{Board, CELL_COUNT};
use crate::engine::state::{OpponentState, Phase};
use crate::error::ProtocolViolation;
use crate::network::ConnectionHandle;

/// Where an outgoing notification goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Search,
    Send(ConnectionHandle),
    Drop,
}

/// What `notify` did with a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Queued for the automated opponent.
    Scheduled,
    Sent,
    /// Remote mode without a usable connection.
    Dropped,
}

pub fn route_outgoing(state: &OpponentState) -> Route {
    match (state.phase(), state.connection) {
        (Phase::Automated, _) => Route::Search,
        (Phase::Connected, Some(handle)) => Route::Send(handle),
        _ => Route::Drop,
    }
}

/// Board-legality check for a move received from the remote peer.
pub fn validate_incoming(
    board: &Board,
    cell: usize,
    opponent_turn: bool,
) -> Result<usize, ProtocolViolation> {
    if cell >= CELL_COUNT {
        return Err(ProtocolViolation::CellOutOfRange { cell });
    }
    if !board.is_empty_at(cell) {
        return Err(ProtocolViolation::CellOccupied { cell });
    }
    if !opponent_turn {
        return Err(ProtocolViolation::OutOfTurn { cell });
    }
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes() {
        let mut state = OpponentState::default();
        assert_eq!(route_outgoing(&state), Route::Search);

        state.enter_remote("mem-1".to_string());
        assert_eq!(route_outgoing(&state), Route::Drop);

        let handle = ConnectionHandle {
            session: 1,
            connection: 1,
        };
        state.connected(handle, "mem-2".to_string(), true);
        assert_eq!(route_outgoing(&state), Route::Send(handle));
    }

    #[test]
    fn test_validate_incoming() {
        let board = Board::from_glyphs("OO X     ").unwrap();
        assert_eq!(validate_incoming(&board, 2, true), Ok(2));
        assert_eq!(
            validate_incoming(&board, 9, true),
            Err(ProtocolViolation::CellOutOfRange { cell: 9 })
        );
        assert_eq!(
            validate_incoming(&board, 3, true),
            Err(ProtocolViolation::CellOccupied { cell: 3 })
        );
        assert_eq!(
            validate_incoming(&board, 2, false),
            Err(ProtocolViolation::OutOfTurn { cell: 2 })
        );
    }
}
