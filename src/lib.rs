pub mod config;
pub mod core;
pub mod display;
pub mod engine;
pub mod error;
pub mod game;
pub mod logic;
pub mod network;
pub mod player;

#[cfg(test)]
mod logic_tests;

pub use config::EngineConfig;
pub use engine::{GameHost, Mode, OpponentEngine, OpponentState, Phase};
pub use error::{EngineError, GameError, ProtocolViolation, TransportError};
pub use network::Notification;
