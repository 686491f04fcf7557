use crate::app::controller::Intent;
use crate::error::{AppError, Result};

pub const HELP_TEXT: &str = "\
Commands:
  list               Show the instrument catalog
  select <symbol>    Choose the instrument to query
  window <minutes>   Set the averaging window
  submit             Fetch current price and history for the selection
  show               Redraw the dashboard
  help               Show this list
  exit               Leave the dashboard";

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Select(String),
    Window(i64),
    Submit,
    Show,
    Help,
    Exit,
}

impl Command {
    /// The coordinator intent carried by this command, if any.
    pub fn intent(&self) -> Option<Intent> {
        match self {
            Command::Select(symbol) => Some(Intent::SelectInstrument(symbol.clone())),
            Command::Window(minutes) => Some(Intent::SetWindowMinutes(*minutes)),
            Command::Submit => Some(Intent::Submit),
            Command::List | Command::Show | Command::Help | Command::Exit => None,
        }
    }
}

/// Parse a line of input. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((head, args)) = parts.split_first() else {
        return Ok(None);
    };

    let command = match head.to_lowercase().as_str() {
        "list" | "ls" => Command::List,
        "select" | "use" => match args {
            [symbol] => Command::Select(symbol.to_string()),
            _ => return Err(AppError::message("Usage: select <symbol>")),
        },
        "window" => match args {
            [minutes] => {
                let minutes = minutes.parse::<i64>().map_err(|_| {
                    AppError::message(format!("`{minutes}` is not a whole number of minutes"))
                })?;
                Command::Window(minutes)
            }
            _ => return Err(AppError::message("Usage: window <minutes>")),
        },
        "submit" | "fetch" => Command::Submit,
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "exit" | "quit" => Command::Exit,
        other => {
            return Err(AppError::message(format!(
                "Unknown command `{other}`, type `help` for the list"
            )))
        }
    };

    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_command("list").unwrap(), Some(Command::List));
        assert_eq!(
            parse_command("  SELECT AAPL ").unwrap(),
            Some(Command::Select("AAPL".to_string()))
        );
        assert_eq!(parse_command("window 15").unwrap(), Some(Command::Window(15)));
        assert_eq!(parse_command("window -5").unwrap(), Some(Command::Window(-5)));
        assert_eq!(parse_command("submit").unwrap(), Some(Command::Submit));
        assert_eq!(parse_command("exit").unwrap(), Some(Command::Exit));
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse_command("select").is_err());
        assert!(parse_command("select AAPL TSLA").is_err());
        assert!(parse_command("window soon").is_err());
        assert!(parse_command("refresh").is_err());
    }

    #[test]
    fn maps_commands_to_intents() {
        assert_eq!(
            Command::Select("TSLA".to_string()).intent(),
            Some(Intent::SelectInstrument("TSLA".to_string()))
        );
        assert_eq!(Command::Window(10).intent(), Some(Intent::SetWindowMinutes(10)));
        assert_eq!(Command::Submit.intent(), Some(Intent::Submit));
        assert_eq!(Command::Show.intent(), None);
    }
}
