use super::types::Token;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CELL_COUNT: usize = 9;

/// 盤面
///
/// Always exactly nine cells in row-major order. The only mutation is
/// [`Board::set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [Token; CELL_COUNT],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a nine character string such as `"OO X     "`.
    /// `O` is [`Token::A`], `X` is [`Token::B`], anything else is empty.
    pub fn from_glyphs(glyphs: &str) -> Option<Self> {
        let chars: Vec<char> = glyphs.chars().collect();
        if chars.len() != CELL_COUNT {
            return None;
        }
        let mut board = Board::new();
        for (i, c) in chars.into_iter().enumerate() {
            let token = match c {
                'O' | 'o' => Token::A,
                'X' | 'x' => Token::B,
                _ => Token::Empty,
            };
            board.set(i, token);
        }
        Some(board)
    }

    pub fn get(&self, index: usize) -> Option<Token> {
        self.cells.get(index).copied()
    }

    /// Places `token` at `index`. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, token: Token) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = token;
        }
    }

    pub fn is_empty_at(&self, index: usize) -> bool {
        self.get(index) == Some(Token::Empty)
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == Token::Empty)
            .map(|(i, _)| i)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|t| *t != Token::Empty)
    }

    pub fn cells(&self) -> &[Token; CELL_COUNT] {
        &self.cells
    }

    pub fn clear(&mut self) {
        self.cells = [Token::Empty; CELL_COUNT];
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in 0..3 {
            let r = &self.cells[row * 3..row * 3 + 3];
            writeln!(f, " {} | {} | {} ", r[0], r[1], r[2])?;
            if row < 2 {
                writeln!(f, "---+---+---")?;
            }
        }
        Ok(())
    }
}
