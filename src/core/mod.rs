pub mod board;
pub mod types;

pub use board::{Board, CELL_COUNT};
pub use types::{PlayerId, Position, Token};
