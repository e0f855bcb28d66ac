mod ui;

use crossterm::event::{self, Event, KeyCode};
use crossterm::{execute, terminal};
use std::fs::File;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tictactoe_adaptive::config::EngineConfig;
use tictactoe_adaptive::core::PlayerId;
use tictactoe_adaptive::display::{render, DisplayState};
use tictactoe_adaptive::engine::{Mode, OpponentEngine, Phase};
use tictactoe_adaptive::game::Game;
use tictactoe_adaptive::network::{event_channel, TcpTransport};
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_PATH: &str = "tictactoe_adaptive.log";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = EngineConfig::load_or_default();
    init_tracing(&config)?;

    // ターミナル初期化
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen)?;

    let res = run(config);

    // ターミナル復帰
    execute!(io::stdout(), terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    res
}

/// The screen is owned by the game, so logs go to a file.
fn init_tracing(config: &EngineConfig) -> anyhow::Result<()> {
    let file = File::create(LOG_PATH)?;
    let default_level = if config.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;
    Ok(())
}

fn run(config: EngineConfig) -> anyhow::Result<()> {
    let (tx, rx) = event_channel();
    let transport = TcpTransport::new(config.network.clone(), tx);
    let mut engine = OpponentEngine::new(config.clone(), transport, rx);
    let mut game = Game::new(Duration::from_millis(config.round_reset_ms));
    let mut display = DisplayState::new(config.debug);

    info!(?config, "started");

    loop {
        engine.pump(&mut game);
        game.tick(Instant::now(), engine.state().mode);
        render(&game, &engine.state(), &display)?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        match key.code {
            KeyCode::Char(c @ '1'..='9') => {
                let cell = c as usize - '1' as usize;
                if engine.phase() == Phase::AwaitingConnection {
                    display.status_msg = Some("Waiting for the other player".to_string());
                    continue;
                }
                match game.play_local(cell) {
                    Ok(notification) => {
                        engine.notify(notification);
                        display.status_msg = None;
                    }
                    Err(e) => display.status_msg = Some(e.to_string()),
                }
            }
            KeyCode::Char('m') => {
                let mode = engine.state().mode.toggled();
                display.status_msg = match engine.set_mode(mode) {
                    Ok(()) => None,
                    Err(e) => Some(format!("Multiplayer unavailable: {}", e)),
                };
                game.reset_stats();
                game.new_round(PlayerId::PlayerA);
            }
            KeyCode::Char('j') => {
                if engine.state().mode != Mode::Remote {
                    display.status_msg = Some("Switch to multiplayer first ([m])".to_string());
                    continue;
                }
                let Some(code) = ui::read_line("Enter the other player's code")? else {
                    continue;
                };
                display.status_msg = match engine.connect_to(&code) {
                    Ok(_) => Some(format!("Connecting to {}...", code)),
                    Err(e) => Some(e.to_string()),
                };
            }
            KeyCode::Char('r') => {
                engine.reset();
                game.reset_stats();
                game.new_round(PlayerId::PlayerA);
                display.status_msg = None;
            }
            KeyCode::Char('d') => display.debug = !display.debug,
            KeyCode::Char('q') => {
                engine.reset();
                break;
            }
            _ => {}
        }
    }

    info!("bye");
    Ok(())
}
