use crate::core::{PlayerId, Position, Token};
use crate::engine::{OpponentState, Phase};
use crate::game::Game;
use crate::logic::{winning_line, Outcome};
use crossterm::{cursor, execute, style::Stylize, terminal};
use std::io::{self, stdout};

#[derive(Default)]
pub struct DisplayState {
    pub status_msg: Option<String>,
    pub debug: bool,
}

impl DisplayState {
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            ..Self::default()
        }
    }
}

pub fn render(game: &Game, opponent: &OpponentState, state: &DisplayState) -> io::Result<()> {
    let mut out = stdout();

    // 画面クリア（スクロール防止）
    execute!(
        out,
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(0, 0)
    )?;

    print!("=== Tic-Tac-Toe ===\r\n");
    if let Some(msg) = &state.status_msg {
        print!("{}\r\n", msg.clone().bold().yellow());
    } else {
        print!("\r\n");
    }
    print!("\r\n");

    render_board(game);

    let turn = match (game.outcome, game.current_player) {
        (Some(Outcome::Win(PlayerId::PlayerA)), _) => "YOU WIN".to_string(),
        (Some(Outcome::Win(PlayerId::PlayerB)), _) => "OPPONENT WINS".to_string(),
        (Some(Outcome::Draw), _) => "DRAW".to_string(),
        (None, PlayerId::PlayerA) => "YOUR TURN".to_string(),
        (None, PlayerId::PlayerB) => "OPPONENT'S TURN".to_string(),
    };
    print!("\r\n{}\r\n\r\n", turn.bold());

    print!(
        "Score  you {}  -  {} opponent   (draws {})\r\n",
        game.score.a.to_string().cyan(),
        game.score.b.to_string().magenta(),
        game.score.draws
    );

    match opponent.phase() {
        Phase::Automated => print!("Mode: single-player\r\n"),
        Phase::AwaitingConnection => {
            print!("Mode: multiplayer\r\n");
            if let Some(id) = &opponent.local_identifier {
                print!("YOUR CODE: {}\r\n", id.as_str().green());
            }
        }
        Phase::Connected => {
            print!("Mode: multiplayer\r\n");
            print!("{}\r\n", "THE OTHER PLAYER IS CONNECTED".green());
        }
    }

    if let Some(violation) = &game.last_violation {
        print!("{}\r\n", violation.to_string().red());
    }

    print!(
        "\r\n[1-9]: Play | [m]: {} | [j]: Join | [r]: Reset | [d]: Debug | [q]: Quit\r\n",
        if opponent.phase() == Phase::Automated {
            "Multiplayer"
        } else {
            "Single-player"
        }
    );

    if state.debug {
        render_debug(game, opponent);
    }
    Ok(())
}

fn render_board(game: &Game) {
    let line = game
        .outcome
        .and_then(|_| winning_line(&game.board, Token::A).or(winning_line(&game.board, Token::B)));

    print!("   +-----------+\r\n");
    for row in 0..3 {
        print!("   |");
        for col in 0..3 {
            let index = Position::new(row, col).index();
            let token = game.board.get(index).unwrap_or_default();
            let text = match token {
                // 空きマスはキー番号を表示
                Token::Empty => format!(" {} ", index + 1).dark_grey(),
                Token::A => format!(" {} ", token).cyan(),
                Token::B => format!(" {} ", token).magenta(),
            };
            if line.is_some_and(|l| l.contains(&index)) {
                print!("{}", text.bold().on_dark_yellow());
            } else {
                print!("{}", text);
            }
            print!("{}", if col < 2 { "|" } else { "" });
        }
        print!("|\r\n");
        if row < 2 {
            print!("   |---+---+---|\r\n");
        }
    }
    print!("   +-----------+\r\n");
}

fn render_debug(game: &Game, opponent: &OpponentState) {
    print!("\r\n--- debug ---\r\n");
    print!("{} - {}\r\n", game.score.a, game.score.b);
    print!("has to play: {:?}\r\n", game.current_player);
    print!("phase: {}\r\n", opponent.phase());
    match serde_json::to_value(opponent) {
        Ok(serde_json::Value::Object(fields)) => {
            for (key, value) in fields {
                print!("{}: {}\r\n", key, value);
            }
        }
        _ => print!("{:?}\r\n", opponent),
    }
}
