use crate::core::{Board, PlayerId, Token};
use serde::{Deserialize, Serialize};

/// 勝利ライン (rows, columns, diagonals)
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Final state of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win(PlayerId),
    Draw,
}

/// Whether any winning line holds `token` in all three cells.
pub fn match_pattern(board: &Board, token: Token) -> bool {
    winning_line(board, token).is_some()
}

/// The first winning line completed by `token`, if any.
pub fn winning_line(board: &Board, token: Token) -> Option<[usize; 3]> {
    WINNING_LINES
        .iter()
        .find(|line| line.iter().all(|&cell| board.get(cell) == Some(token)))
        .copied()
}

/// 勝敗判定. `None` while the round is still running.
pub fn outcome(board: &Board) -> Option<Outcome> {
    if match_pattern(board, Token::A) {
        Some(Outcome::Win(PlayerId::PlayerA))
    } else if match_pattern(board, Token::B) {
        Some(Outcome::Win(PlayerId::PlayerB))
    } else if board.is_full() {
        Some(Outcome::Draw)
    } else {
        None
    }
}

/// 合法手生成
pub fn legal_moves(board: &Board) -> Vec<usize> {
    if outcome(board).is_some() {
        return Vec::new();
    }
    board.empty_cells().collect()
}

/// Static score from PlayerA's perspective: +10 when A has a line,
/// -10 when B has one, 0 otherwise (running and drawn boards alike).
pub fn evaluate(board: &Board) -> i32 {
    if match_pattern(board, Token::A) {
        10
    } else if match_pattern(board, Token::B) {
        -10
    } else {
        0
    }
}
