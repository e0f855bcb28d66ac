use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_PATH: &str = "engine_config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cosmetic "thinking" pause before the automated opponent answers.
    pub think_delay_ms: u64,
    /// How long a decided round stays on screen before the board clears.
    pub round_reset_ms: u64,
    /// Reject remote moves on taken cells or out of turn.
    pub validate_remote_moves: bool,
    /// Verbose logging and the debug panel.
    pub debug: bool,
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub bind_host: String,
    pub connect_timeout_ms: u64,
}

impl EngineConfig {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_str = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|_| Self::default())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            think_delay_ms: 100,
            round_reset_ms: 500,
            validate_remote_moves: true,
            debug: false,
            network: NetworkConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            bind_host: "127.0.0.1".to_string(),
            connect_timeout_ms: 5_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!(
            "tictactoe_adaptive_config_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"debug": true, "network": {"bind_host": "0.0.0.0"}}"#).unwrap();

        let config = EngineConfig::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(config.debug);
        assert_eq!(config.think_delay_ms, 100);
        assert_eq!(config.network.bind_host, "0.0.0.0");
        assert_eq!(config.network.connect_timeout_ms, 5_000);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(EngineConfig::load_from("/nonexistent/engine_config.json").is_err());
    }
}
