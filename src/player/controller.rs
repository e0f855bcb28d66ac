use crate::core::Board;

/// プレイヤー操作のtrait
pub trait PlayerController {
    fn choose_move(&self, board: &Board, legal_moves: &[usize]) -> Option<usize>;
    fn name(&self) -> &str;
}
