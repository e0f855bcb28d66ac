use std::time::{Duration, Instant};
use tictactoe_adaptive::config::EngineConfig;
use tictactoe_adaptive::core::{PlayerId, Token};
use tictactoe_adaptive::engine::{Delivery, GameHost, Mode, OpponentEngine, Phase};
use tictactoe_adaptive::game::Game;
use tictactoe_adaptive::logic::Outcome;
use tictactoe_adaptive::network::{event_channel, MemoryNetwork, MemoryTransport};
use tictactoe_adaptive::{Notification, ProtocolViolation};

fn engine(network: &MemoryNetwork, config: EngineConfig) -> OpponentEngine<MemoryTransport> {
    let (tx, rx) = event_channel();
    OpponentEngine::new(config, MemoryTransport::new(network.clone(), tx), rx)
}

fn later() -> Instant {
    Instant::now() + Duration::from_secs(1)
}

#[test]
fn test_minimax_never_loses_to_center_opening() {
    let network = MemoryNetwork::new();
    let mut engine = engine(&network, EngineConfig::default());
    let mut game = Game::default();

    // the human always takes the lowest free cell after opening in the center
    let mut next = Some(4);
    while let Some(cell) = next {
        let notification = game.play_local(cell).unwrap();
        assert_eq!(engine.notify(notification), Delivery::Scheduled);
        engine.poll_timers(&mut game, later());
        if game.outcome.is_some() {
            break;
        }
        next = game.board.empty_cells().next();
    }

    assert_ne!(game.outcome, Some(Outcome::Win(PlayerId::PlayerA)));
    assert!(game.outcome.is_some());
}

#[test]
fn test_automated_block() {
    let network = MemoryNetwork::new();
    let mut engine = engine(&network, EngineConfig::default());
    let mut game = Game::default();

    let n = game.play_local(0).unwrap();
    engine.notify(n);
    engine.poll_timers(&mut game, later());
    let first_reply: Vec<usize> = (0..9)
        .filter(|&i| game.board.get(i) == Some(Token::B))
        .collect();
    assert_eq!(first_reply.len(), 1);

    // threaten the top row or the left column, whichever the reply left open
    let threat = if game.board.is_empty_at(1) && game.board.is_empty_at(2) {
        1
    } else {
        3
    };
    let block = if threat == 1 { 2 } else { 6 };
    let n = game.play_local(threat).unwrap();
    engine.notify(n);
    engine.poll_timers(&mut game, later());
    assert_eq!(game.board.get(block), Some(Token::B));
}

#[test]
fn test_two_engines_play_a_remote_round() {
    let network = MemoryNetwork::new();
    let mut host_engine = engine(&network, EngineConfig::default());
    let mut guest_engine = engine(&network, EngineConfig::default());
    let mut host_game = Game::new(Duration::ZERO);
    let mut guest_game = Game::new(Duration::ZERO);

    host_engine.set_mode(Mode::Remote).unwrap();
    guest_engine.set_mode(Mode::Remote).unwrap();
    assert_eq!(host_engine.phase(), Phase::AwaitingConnection);

    let code = host_engine.state().local_identifier.unwrap();
    guest_engine.connect_to(&code).unwrap();
    host_engine.pump(&mut host_game);
    guest_engine.pump(&mut guest_game);

    assert_eq!(host_engine.phase(), Phase::Connected);
    assert_eq!(guest_engine.phase(), Phase::Connected);
    assert_eq!(
        guest_engine.state().remote_identifier.as_deref(),
        Some(code.as_str())
    );
    // the joining side opens
    assert!(host_game.is_opponent_turn());
    assert!(guest_game.is_local_turn());

    // guest takes the top row, host plays the middle row
    for (guest_cell, host_cell) in [(0, 3), (1, 4)] {
        let n = guest_game.play_local(guest_cell).unwrap();
        assert_eq!(guest_engine.notify(n), Delivery::Sent);
        host_engine.pump(&mut host_game);

        let n = host_game.play_local(host_cell).unwrap();
        assert_eq!(host_engine.notify(n), Delivery::Sent);
        guest_engine.pump(&mut guest_game);
    }
    let n = guest_game.play_local(2).unwrap();
    guest_engine.notify(n);
    host_engine.pump(&mut host_game);

    assert_eq!(guest_game.outcome, Some(Outcome::Win(PlayerId::PlayerA)));
    assert_eq!(host_game.outcome, Some(Outcome::Win(PlayerId::PlayerB)));
    assert_eq!(host_game.board.get(2), Some(Token::B));
    assert_eq!(guest_game.board.get(4), Some(Token::B));

    // the loser opens the next round on both sides
    assert!(host_game.tick(Instant::now(), Mode::Remote));
    assert!(guest_game.tick(Instant::now(), Mode::Remote));
    assert!(host_game.is_local_turn());
    assert!(guest_game.is_opponent_turn());
}

#[test]
fn test_out_of_turn_remote_move_is_reported() {
    let network = MemoryNetwork::new();
    let mut host_engine = engine(&network, EngineConfig::default());
    let mut guest_engine = engine(&network, EngineConfig::default());
    let mut host_game = Game::default();
    let mut guest_game = Game::default();

    host_engine.set_mode(Mode::Remote).unwrap();
    guest_engine.set_mode(Mode::Remote).unwrap();
    let code = host_engine.state().local_identifier.unwrap();
    guest_engine.connect_to(&code).unwrap();
    host_engine.pump(&mut host_game);
    guest_engine.pump(&mut guest_game);

    let n = guest_game.play_local(4).unwrap();
    guest_engine.notify(n);
    // a second move before the host answered
    guest_engine.notify(Notification::play(5));
    host_engine.pump(&mut host_game);

    assert_eq!(host_game.board.get(4), Some(Token::B));
    assert_eq!(host_game.board.get(5), Some(Token::Empty));
    assert_eq!(
        host_game.last_violation,
        Some(ProtocolViolation::OutOfTurn { cell: 5 })
    );
}

#[test]
fn test_peer_leaving_reopens_the_session() {
    let network = MemoryNetwork::new();
    let mut host_engine = engine(&network, EngineConfig::default());
    let mut guest_engine = engine(&network, EngineConfig::default());
    let mut host_game = Game::default();
    let mut guest_game = Game::default();

    host_engine.set_mode(Mode::Remote).unwrap();
    guest_engine.set_mode(Mode::Remote).unwrap();
    let code = host_engine.state().local_identifier.unwrap();
    guest_engine.connect_to(&code).unwrap();
    host_engine.pump(&mut host_game);
    guest_engine.pump(&mut guest_game);

    guest_engine.set_mode(Mode::Automated).unwrap();
    host_engine.pump(&mut host_game);

    let state = host_engine.state();
    assert_eq!(state.phase(), Phase::AwaitingConnection);
    assert_eq!(state.local_identifier.as_deref(), Some(code.as_str()));
    assert!(state.last_remote_identifier.is_some());
    assert_eq!(network.link_count(), 0);

    // nobody to tell
    assert_eq!(
        host_engine.notify(Notification::play(0)),
        Delivery::Dropped
    );
}

#[test]
fn test_new_peer_starts_on_a_clean_board() {
    let network = MemoryNetwork::new();
    let mut host_engine = engine(&network, EngineConfig::default());
    let mut first_engine = engine(&network, EngineConfig::default());
    let mut second_engine = engine(&network, EngineConfig::default());
    let mut host_game = Game::default();
    let mut first_game = Game::default();
    let mut second_game = Game::default();

    host_engine.set_mode(Mode::Remote).unwrap();
    first_engine.set_mode(Mode::Remote).unwrap();
    let code = host_engine.state().local_identifier.unwrap();
    first_engine.connect_to(&code).unwrap();
    host_engine.pump(&mut host_game);
    first_engine.pump(&mut first_game);

    // the first guest leaves mid-round
    let n = first_game.play_local(4).unwrap();
    first_engine.notify(n);
    host_engine.pump(&mut host_game);
    assert_eq!(host_game.board.get(4), Some(Token::B));
    first_engine.set_mode(Mode::Automated).unwrap();
    host_engine.pump(&mut host_game);
    assert_eq!(host_engine.phase(), Phase::AwaitingConnection);

    second_engine.set_mode(Mode::Remote).unwrap();
    second_engine.connect_to(&code).unwrap();
    host_engine.pump(&mut host_game);
    second_engine.pump(&mut second_game);

    assert_eq!(host_game.board, second_game.board);
    assert_eq!(host_game.board.get(4), Some(Token::Empty));
    assert!(host_game.is_opponent_turn());

    let n = second_game.play_local(4).unwrap();
    assert_eq!(second_engine.notify(n), Delivery::Sent);
    host_engine.pump(&mut host_game);
    assert_eq!(host_game.board.get(4), Some(Token::B));
    assert_eq!(host_game.last_violation, None);
}
