use crate::core::{Board, PlayerId, CELL_COUNT};
use crate::engine::{GameHost, Mode};
use crate::error::{GameError, ProtocolViolation};
use crate::logic::{outcome, Outcome};
use crate::network::Notification;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Rounds won per side, plus draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Score {
    pub a: u32,
    pub b: u32,
    pub draws: u32,
}

/// Local game session: owns the board and the turn, keeps score.
pub struct Game {
    pub board: Board,
    pub current_player: PlayerId,
    pub outcome: Option<Outcome>,
    pub score: Score,
    pub last_violation: Option<ProtocolViolation>,
    decided_at: Option<Instant>,
    round_reset: Duration,
}

impl Default for Game {
    fn default() -> Self {
        Game::new(Duration::from_millis(500))
    }
}

impl Game {
    pub fn new(round_reset: Duration) -> Self {
        Game {
            board: Board::new(),
            current_player: PlayerId::PlayerA,
            outcome: None,
            score: Score::default(),
            last_violation: None,
            decided_at: None,
            round_reset,
        }
    }

    pub fn is_local_turn(&self) -> bool {
        self.current_player == PlayerId::PlayerA && self.outcome.is_none()
    }

    /// The local player takes `cell`. Returns the notification for the opponent.
    pub fn play_local(&mut self, cell: usize) -> Result<Notification, GameError> {
        if self.outcome.is_some() {
            return Err(GameError::RoundOver);
        }
        if self.current_player != PlayerId::PlayerA {
            return Err(GameError::NotYourTurn);
        }
        if cell >= CELL_COUNT {
            return Err(GameError::CellOutOfRange(cell));
        }
        if !self.board.is_empty_at(cell) {
            return Err(GameError::CellOccupied(cell));
        }

        self.place(cell, PlayerId::PlayerA);
        Ok(Notification::play(cell))
    }

    fn place(&mut self, cell: usize, player: PlayerId) {
        self.board.set(cell, player.token());
        self.current_player = player.opponent();

        if let Some(result) = outcome(&self.board) {
            match result {
                Outcome::Win(PlayerId::PlayerA) => self.score.a += 1,
                Outcome::Win(PlayerId::PlayerB) => self.score.b += 1,
                Outcome::Draw => self.score.draws += 1,
            }
            info!(?result, score = ?self.score, "round over");
            self.outcome = Some(result);
            self.decided_at = Some(Instant::now());
        }
    }

    /// Clears a decided round once it has been on screen long enough.
    /// Returns true when a new round started.
    pub fn tick(&mut self, now: Instant, mode: Mode) -> bool {
        match self.decided_at {
            Some(at) if now.duration_since(at) >= self.round_reset => {
                let first = match mode {
                    Mode::Automated => PlayerId::PlayerA,
                    // the side that lost the move keeps it
                    Mode::Remote => self.current_player,
                };
                self.new_round(first);
                true
            }
            _ => false,
        }
    }

    pub fn new_round(&mut self, first: PlayerId) {
        self.board.clear();
        self.outcome = None;
        self.decided_at = None;
        self.current_player = first;
    }

    pub fn reset_stats(&mut self) {
        self.score = Score::default();
    }
}

impl GameHost for Game {
    fn board(&self) -> Board {
        self.board
    }

    fn is_opponent_turn(&self) -> bool {
        self.current_player == PlayerId::PlayerB && self.outcome.is_none()
    }

    fn apply_opponent_move(&mut self, cell: usize) {
        if self.outcome.is_some() || !self.board.is_empty_at(cell) {
            warn!(cell, "opponent move does not fit the board, ignored");
            return;
        }
        self.place(cell, PlayerId::PlayerB);
    }

    fn peer_connected(&mut self) {
        self.reset_stats();
        self.last_violation = None;
        self.new_round(PlayerId::PlayerA);
    }

    fn give_opponent_first_move(&mut self) {
        self.current_player = PlayerId::PlayerB;
    }

    fn protocol_violation(&mut self, violation: ProtocolViolation) {
        self.last_violation = Some(violation);
    }
}
