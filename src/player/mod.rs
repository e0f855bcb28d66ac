pub mod ai;
pub mod controller;

pub use ai::MinimaxAI;
pub use controller::PlayerController;
