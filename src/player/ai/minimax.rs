use crate::core::{Board, Token, CELL_COUNT};
use crate::logic::evaluate;
use crate::player::PlayerController;

/// Exhaustive minimax opponent playing [`Token::B`].
///
/// No pruning and no depth bonus: every leaf is +10, -10 or 0, so among
/// equally scored cells the lowest index wins.
pub struct MinimaxAI {
    pub name: String,
}

impl MinimaxAI {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Default for MinimaxAI {
    fn default() -> Self {
        Self::new("Minimax AI")
    }
}

/// Picks the cell for PlayerB, or `None` on a full board.
pub fn best_move(board: &Board) -> Option<usize> {
    let mut best: Option<(usize, i32)> = None;
    for (cell, value) in score_moves(board) {
        // strict '>' keeps the earliest cell on ties
        if best.map_or(true, |(_, best_value)| value > best_value) {
            best = Some((cell, value));
        }
    }
    best.map(|(cell, _)| cell)
}

/// Value of every empty cell from PlayerB's point of view, ascending by index.
pub fn score_moves(board: &Board) -> Vec<(usize, i32)> {
    let mut scratch = *board;
    let mut scores = Vec::new();
    for cell in 0..CELL_COUNT {
        if !scratch.is_empty_at(cell) {
            continue;
        }
        scratch.set(cell, Token::B);
        // PlayerA moves next and maximises; negate to get B's value
        let value = -minimax(&mut scratch, true);
        scratch.set(cell, Token::Empty);
        scores.push((cell, value));
    }
    scores
}

fn minimax(board: &mut Board, is_maximizing: bool) -> i32 {
    let score = evaluate(board);
    if score != 0 {
        return score;
    }

    let token = if is_maximizing { Token::A } else { Token::B };
    let mut best: Option<i32> = None;

    for cell in 0..CELL_COUNT {
        if !board.is_empty_at(cell) {
            continue;
        }
        board.set(cell, token);
        let eval = minimax(board, !is_maximizing);
        board.set(cell, Token::Empty);

        best = Some(match best {
            None => eval,
            Some(b) if is_maximizing => b.max(eval),
            Some(b) => b.min(eval),
        });
    }

    // 空きマスなし -> 引き分け
    best.unwrap_or(0)
}

impl PlayerController for MinimaxAI {
    fn choose_move(&self, board: &Board, legal_moves: &[usize]) -> Option<usize> {
        if legal_moves.is_empty() {
            return None;
        }
        best_move(board).filter(|cell| legal_moves.contains(cell))
    }

    fn name(&self) -> &str {
        &self.name
    }

}
