//! Adaptive opponent engine.
//!
//! One owner for the opponent state: the automated minimax player and the
//! remote peer sit behind the same `notify` / `set_mode` / `connect_to` API.
//! Transport events and delayed automated moves are processed only from
//! [`OpponentEngine::pump`] (or the finer grained `handle_event` /
//! `poll_timers`), so every mutation happens on the caller's thread.

pub mod host;
pub mod router;
pub mod state;

pub use host::GameHost;
pub use router::{Delivery, Route};
pub use state::{Mode, OpponentState, Phase};

use crate::config::EngineConfig;
use crate::error::{EngineError, ProtocolViolation};
use crate::logic::legal_moves;
use crate::network::{
    ConnectionHandle, EventReceiver, Notification, PeerTransport, TransportEvent,
};
use crate::player::{MinimaxAI, PlayerController};
use router::{route_outgoing, validate_incoming};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Inbound,
    Outbound,
}

/// A delayed automated move, valid only for the generation it was made in.
#[derive(Debug, Clone, Copy)]
struct SearchTicket {
    generation: u64,
    due: Instant,
}

pub struct OpponentEngine<T: PeerTransport> {
    config: EngineConfig,
    transport: T,
    events: EventReceiver,
    state: OpponentState,
    pending: HashMap<ConnectionHandle, Direction>,
    tickets: VecDeque<SearchTicket>,
    searcher: Box<dyn PlayerController + Send>,
}

impl<T: PeerTransport> OpponentEngine<T> {
    /// `events` must be the receiving end of the sender `transport` reports to.
    pub fn new(config: EngineConfig, transport: T, events: EventReceiver) -> Self {
        Self {
            config,
            transport,
            events,
            state: OpponentState::default(),
            pending: HashMap::new(),
            tickets: VecDeque::new(),
            searcher: Box::new(MinimaxAI::default()),
        }
    }

    pub fn state(&self) -> OpponentState {
        self.state.clone()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Switches backend. Always tears down and rebuilds, even when `mode`
    /// is already active.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), EngineError> {
        self.teardown();
        match mode {
            Mode::Automated => {
                self.state.reset_to_automated();
                self.trace_state("switched to automated opponent");
                Ok(())
            }
            Mode::Remote => match self.transport.open_session() {
                Ok(identifier) => {
                    self.state.enter_remote(identifier);
                    self.trace_state("listening for remote peer");
                    Ok(())
                }
                Err(e) => {
                    warn!(error = %e, "could not open transport session");
                    self.state.reset_to_automated();
                    Err(e.into())
                }
            },
        }
    }

    /// Back to the automated opponent, closing any connection.
    pub fn reset(&mut self) {
        self.teardown();
        self.state.reset_to_automated();
        self.trace_state("engine reset");
    }

    /// Starts an outbound connection. Replaces the live connection once open.
    pub fn connect_to(&mut self, identifier: &str) -> Result<ConnectionHandle, EngineError> {
        if self.state.mode != Mode::Remote || !self.transport.has_session() {
            warn!(identifier, "connect requested without a local session");
            return Err(EngineError::TransportUninitialized);
        }
        let identifier = identifier.trim();
        if self.state.local_identifier.as_deref() == Some(identifier) {
            warn!(identifier, "refusing to connect to our own session");
            return Err(EngineError::SelfConnection(identifier.to_string()));
        }
        let handle = self.transport.connect(identifier)?;
        self.pending.insert(handle, Direction::Outbound);
        info!(%handle, identifier, "connecting to peer");
        Ok(handle)
    }

    /// Passes on a move the local player just made.
    pub fn notify(&mut self, payload: Notification) -> Delivery {
        match route_outgoing(&self.state) {
            Route::Search => {
                let due = Instant::now() + Duration::from_millis(self.config.think_delay_ms);
                self.tickets.push_back(SearchTicket {
                    generation: self.state.generation,
                    due,
                });
                debug!(?payload, "automated reply scheduled");
                Delivery::Scheduled
            }
            Route::Send(handle) => match self.transport.send(handle, &payload) {
                Ok(()) => {
                    debug!(%handle, ?payload, "sent to peer");
                    Delivery::Sent
                }
                Err(e) => {
                    warn!(%handle, error = %e, "send failed");
                    Delivery::Dropped
                }
            },
            Route::Drop => {
                debug!(?payload, "no peer connected, notification dropped");
                Delivery::Dropped
            }
        }
    }

    /// Drains transport events and fires due automated moves.
    pub fn pump<H: GameHost + ?Sized>(&mut self, host: &mut H) {
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event, host);
        }
        self.poll_timers(host, Instant::now());
    }

    /// When the next automated move is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tickets.front().map(|t| t.due)
    }

    pub fn poll_timers<H: GameHost + ?Sized>(&mut self, host: &mut H, now: Instant) {
        while let Some(ticket) = self.tickets.front().copied() {
            if ticket.due > now {
                break;
            }
            self.tickets.pop_front();
            if ticket.generation != self.state.generation || self.state.mode != Mode::Automated {
                debug!(generation = ticket.generation, "stale automated move discarded");
                continue;
            }
            self.play_automated(host);
        }
    }

    pub fn handle_event<H: GameHost + ?Sized>(&mut self, event: TransportEvent, host: &mut H) {
        let handle = event.handle();
        if self.state.mode != Mode::Remote || self.transport.session() != Some(handle.session) {
            debug!(%handle, "event from a stale session ignored");
            return;
        }

        match event {
            TransportEvent::Incoming(handle) => {
                debug!(%handle, "incoming connection");
                self.pending.insert(handle, Direction::Inbound);
            }
            TransportEvent::Open {
                handle,
                remote,
                reliable,
            } => self.on_open(handle, remote, reliable, host),
            TransportEvent::Message { handle, payload } => {
                if self.state.connection != Some(handle) {
                    debug!(%handle, "message on an inactive connection ignored");
                    return;
                }
                self.receive(payload, host);
            }
            TransportEvent::Closed(handle) => {
                if self.state.connection == Some(handle) {
                    self.state.disconnected();
                    self.trace_state("peer disconnected");
                } else {
                    self.pending.remove(&handle);
                }
            }
            TransportEvent::Malformed { handle, reason } => {
                if self.state.connection != Some(handle) {
                    debug!(%handle, "garbage on an inactive connection ignored");
                    return;
                }
                warn!(%handle, %reason, "undecodable frame from peer");
                host.protocol_violation(ProtocolViolation::Malformed);
            }
            TransportEvent::Failed { handle, reason } => {
                if self.pending.remove(&handle).is_some() {
                    warn!(%handle, %reason, "connection attempt failed");
                }
            }
        }
    }

    fn on_open<H: GameHost + ?Sized>(
        &mut self,
        handle: ConnectionHandle,
        remote: String,
        reliable: bool,
        host: &mut H,
    ) {
        let Some(direction) = self.pending.remove(&handle) else {
            debug!(%handle, "open for an unknown connection ignored");
            return;
        };

        if let Some(live) = self.state.connection {
            match direction {
                Direction::Inbound => {
                    info!(%handle, %remote, "already connected, refusing peer");
                    self.transport.close(handle);
                    return;
                }
                Direction::Outbound => {
                    info!(%live, "replacing live connection");
                    self.transport.close(live);
                    self.state.disconnected();
                }
            }
        }

        self.state.connected(handle, remote, reliable);
        self.trace_state("peer connected");
        host.peer_connected();
        if direction == Direction::Inbound {
            // the accepting side plays second
            host.give_opponent_first_move();
        }
    }

    fn receive<H: GameHost + ?Sized>(&mut self, payload: Notification, host: &mut H) {
        match payload {
            Notification::Play { cell } => {
                if self.config.validate_remote_moves {
                    if let Err(violation) =
                        validate_incoming(&host.board(), cell, host.is_opponent_turn())
                    {
                        warn!(%violation, "remote move rejected");
                        host.protocol_violation(violation);
                        return;
                    }
                }
                debug!(cell, "remote move");
                host.apply_opponent_move(cell);
            }
        }
    }

    fn play_automated<H: GameHost + ?Sized>(&mut self, host: &mut H) {
        let board = host.board();
        let moves = legal_moves(&board);
        match self.searcher.choose_move(&board, &moves) {
            Some(cell) => {
                debug!(cell, searcher = self.searcher.name(), "automated move");
                host.apply_opponent_move(cell);
            }
            None => debug!("no move available for the automated opponent"),
        }
    }

    fn teardown(&mut self) {
        self.tickets.clear();
        if let Some(handle) = self.state.connection {
            self.transport.close(handle);
        }
        for (handle, _) in self.pending.drain() {
            self.transport.close(handle);
        }
        self.transport.destroy_session();
    }

    fn trace_state(&self, what: &str) {
        if self.config.debug {
            info!(state = ?self.state, "{}", what);
        } else {
            info!(phase = %self.state.phase(), "{}", what);
        }
    }
}
