use crate::network::ConnectionHandle;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which opponent backend is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Automated,
    Remote,
}

impl Mode {
    pub fn toggled(self) -> Mode {
        match self {
            Mode::Automated => Mode::Remote,
            Mode::Remote => Mode::Automated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    Automated,
    AwaitingConnection,
    Connected,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Phase::Automated => "automated",
            Phase::AwaitingConnection => "remote/awaiting",
            Phase::Connected => "remote/connected",
        };
        f.write_str(s)
    }
}

/// Snapshot of the opponent engine. Only the engine mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OpponentState {
    pub mode: Mode,
    /// Our address for the peer to connect to (remote mode only).
    pub local_identifier: Option<String>,
    pub remote_identifier: Option<String>,
    pub connection: Option<ConnectionHandle>,
    pub connection_reliable: Option<bool>,
    /// Display only. Never used to reconnect.
    pub last_remote_identifier: Option<String>,
    /// Bumped on every transition; pending work from older generations is stale.
    pub generation: u64,
}

impl OpponentState {
    pub fn phase(&self) -> Phase {
        match (self.mode, self.connection) {
            (Mode::Automated, _) => Phase::Automated,
            (Mode::Remote, None) => Phase::AwaitingConnection,
            (Mode::Remote, Some(_)) => Phase::Connected,
        }
    }

    pub(crate) fn reset_to_automated(&mut self) {
        let last_remote = self
            .remote_identifier
            .take()
            .or_else(|| self.last_remote_identifier.take());
        *self = OpponentState {
            mode: Mode::Automated,
            last_remote_identifier: last_remote,
            generation: self.generation + 1,
            ..OpponentState::default()
        };
    }

    pub(crate) fn enter_remote(&mut self, local_identifier: String) {
        let last_remote = self
            .remote_identifier
            .take()
            .or_else(|| self.last_remote_identifier.take());
        *self = OpponentState {
            mode: Mode::Remote,
            local_identifier: Some(local_identifier),
            last_remote_identifier: last_remote,
            generation: self.generation + 1,
            ..OpponentState::default()
        };
    }

    pub(crate) fn connected(&mut self, handle: ConnectionHandle, remote: String, reliable: bool) {
        self.remote_identifier = Some(remote);
        self.connection = Some(handle);
        self.connection_reliable = Some(reliable);
        self.generation += 1;
    }

    pub(crate) fn disconnected(&mut self) {
        if let Some(remote) = self.remote_identifier.take() {
            self.last_remote_identifier = Some(remote);
        }
        self.connection = None;
        self.connection_reliable = None;
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(connection: u64) -> ConnectionHandle {
        ConnectionHandle {
            session: 1,
            connection,
        }
    }

    #[test]
    fn test_phase_follows_mode_and_connection() {
        let mut state = OpponentState::default();
        assert_eq!(state.phase(), Phase::Automated);

        state.enter_remote("mem-1".to_string());
        assert_eq!(state.phase(), Phase::AwaitingConnection);

        state.connected(handle(1), "mem-2".to_string(), true);
        assert_eq!(state.phase(), Phase::Connected);
        assert_eq!(state.connection_reliable, Some(true));

        state.disconnected();
        assert_eq!(state.phase(), Phase::AwaitingConnection);
        assert_eq!(state.remote_identifier, None);
        assert_eq!(state.local_identifier.as_deref(), Some("mem-1"));
    }

    #[test]
    fn test_automated_keeps_only_last_remote() {
        let mut state = OpponentState::default();
        state.enter_remote("mem-1".to_string());
        state.connected(handle(3), "mem-2".to_string(), false);
        state.reset_to_automated();

        assert_eq!(state.mode, Mode::Automated);
        assert_eq!(state.local_identifier, None);
        assert_eq!(state.remote_identifier, None);
        assert_eq!(state.connection, None);
        assert_eq!(state.connection_reliable, None);
        assert_eq!(state.last_remote_identifier.as_deref(), Some("mem-2"));

        // survives repeated resets
        state.reset_to_automated();
        assert_eq!(state.last_remote_identifier.as_deref(), Some("mem-2"));
    }

    #[test]
    fn test_every_transition_bumps_generation() {
        let mut state = OpponentState::default();
        let mut last = state.generation;
        let mut check = |state: &OpponentState| {
            assert!(state.generation > last);
            last = state.generation;
        };

        state.enter_remote("mem-1".to_string());
        check(&state);
        state.connected(handle(1), "mem-2".to_string(), true);
        check(&state);
        state.disconnected();
        check(&state);
        state.reset_to_automated();
        check(&state);
    }

    #[test]
    fn test_mode_toggle() {
        assert_eq!(Mode::Automated.toggled(), Mode::Remote);
        assert_eq!(Mode::Remote.toggled(), Mode::Automated);
    }
}
