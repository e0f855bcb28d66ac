use serde::{Deserialize, Serialize};
use std::fmt;

/// Contents of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Token {
    #[default]
    Empty,
    /// The local human ("O").
    A,
    /// The opponent, automated or remote ("X").
    B,
}

impl Token {
    pub fn glyph(self) -> char {
        match self {
            Token::Empty => ' ',
            Token::A => 'O',
            Token::B => 'X',
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

/// プレイヤーID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerId {
    #[default]
    PlayerA, // local human
    PlayerB, // opponent
}

impl PlayerId {
    pub fn opponent(self) -> PlayerId {
        match self {
            PlayerId::PlayerA => PlayerId::PlayerB,
            PlayerId::PlayerB => PlayerId::PlayerA,
        }
    }

    pub fn token(self) -> Token {
        match self {
            PlayerId::PlayerA => Token::A,
            PlayerId::PlayerB => Token::B,
        }
    }
}

/// 盤面座標 (0-indexed, row-major)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    pub fn index(self) -> usize {
        self.row * 3 + self.col
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
