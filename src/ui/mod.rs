use crossterm::event::{self, Event, KeyCode};
use std::io::{self, Write};
use std::time::Duration;

/// Reads one line in raw mode. `Esc` cancels and returns `None`.
pub fn read_line(prompt: &str) -> anyhow::Result<Option<String>> {
    print!("\r\n{}: \r\n> ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    loop {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Enter => {
                        print!("\r\n");
                        let trimmed = input.trim();
                        if trimmed.is_empty() {
                            return Ok(None);
                        }
                        return Ok(Some(trimmed.to_string()));
                    }
                    KeyCode::Char(c) => {
                        input.push(c);
                        print!("{}", c);
                        io::stdout().flush()?;
                    }
                    KeyCode::Backspace => {
                        if !input.is_empty() {
                            input.pop();
                            print!("\u{0008} \u{0008}");
                            io::stdout().flush()?;
                        }
                    }
                    KeyCode::Esc => return Ok(None),
                    _ => {}
                }
            }
        }
    }
}
