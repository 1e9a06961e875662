//! REPL input parsing.

use std::str::FromStr;

use regent_core::game::Advisor;
use thiserror::Error;

/// Every slash command, in completion order.
pub const COMMANDS: [&str; 20] = [
    "/key", "/model", "/new", "/lens", "/chapters", "/chapter", "/follow", "/ask", "/skip",
    "/event", "/answer", "/back", "/next", "/state", "/resume", "/audit", "/abandon", "/exit",
    "/quit", "/help",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetKey(String),
    SetModel(String),
    NewGame,
    Lens(String),
    Chapters,
    Chapter(String),
    /// A decree issued while following one advisor's counsel.
    Follow(Advisor, String),
    Ask(Advisor, String),
    Skip,
    Event,
    /// Choice id for the held realm event.
    Answer(String),
    Back,
    Next,
    State,
    Resume,
    Audit,
    Abandon,
    Exit,
    Quit,
    Help,
    Decree(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Unknown command {0}. Type /help for the list.")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Unknown advisor '{0}'. Choose lion, fox or balance.")]
    UnknownAdvisor(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if !line.starts_with('/') {
            return Ok(Command::Decree(line.to_string()));
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let command = match name {
            "/key" => Command::SetKey(required(rest, "/key <api-key>")?),
            // An empty model clears it.
            "/model" => Command::SetModel(rest.to_string()),
            "/new" => Command::NewGame,
            "/lens" => Command::Lens(required(rest, "/lens <lens-key>")?),
            "/chapters" => Command::Chapters,
            "/chapter" => Command::Chapter(required(rest, "/chapter <chapter-id>")?),
            "/follow" => {
                let (advisor, decree) = advisor_and_text(rest, "/follow <advisor> <decree>")?;
                Command::Follow(advisor, decree)
            }
            "/ask" => {
                let (advisor, message) = advisor_and_text(rest, "/ask <advisor> <message>")?;
                Command::Ask(advisor, message)
            }
            "/skip" => Command::Skip,
            "/event" => Command::Event,
            "/answer" => Command::Answer(required(rest, "/answer <choice-id>")?),
            "/back" => Command::Back,
            "/next" => Command::Next,
            "/state" => Command::State,
            "/resume" => Command::Resume,
            "/audit" => Command::Audit,
            "/abandon" => Command::Abandon,
            "/exit" => Command::Exit,
            "/quit" => Command::Quit,
            "/help" => Command::Help,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}

fn required(rest: &str, usage: &'static str) -> Result<String, CommandError> {
    if rest.is_empty() {
        Err(CommandError::Usage(usage))
    } else {
        Ok(rest.to_string())
    }
}

fn advisor_and_text(rest: &str, usage: &'static str) -> Result<(Advisor, String), CommandError> {
    let (advisor, text) = rest
        .split_once(char::is_whitespace)
        .ok_or(CommandError::Usage(usage))?;
    let advisor = Advisor::from_str(advisor)
        .map_err(|_| CommandError::UnknownAdvisor(advisor.to_string()))?;
    Ok((advisor, required(text.trim(), usage)?))
}

pub const HELP: &str = "\
/key <api-key>              store your API key
/model [name]               choose the model (blank clears)
/new                        start a new game
/lens <key>                 choose your observation lens
/chapters                   list chapters
/chapter <id>               enter a chapter
<decree>                    issue a decree
/follow <advisor> <decree>  issue a decree following an advisor
/ask <advisor> <message>    private audience with an advisor
/skip                       defer the last decree's consequences
/event                      show the realm event awaiting your answer
/answer <choice-id>         answer the realm event
/back, /next                return to the chapter list
/state                      show the realm
/resume                     refresh the realm from the server
/audit                      load the final audit
/abandon                    delete this game on the server and exit it
/exit                       leave the game (keeps your key)
/quit                       close the program";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_is_decree() {
        assert_eq!(
            "  Open the granaries ".parse::<Command>().unwrap(),
            Command::Decree("Open the granaries".into())
        );
    }

    #[test]
    fn test_follow_parses_advisor_and_decree() {
        assert_eq!(
            "/follow FOX Bribe the captain".parse::<Command>().unwrap(),
            Command::Follow(Advisor::Fox, "Bribe the captain".into())
        );
        assert_eq!(
            "/ask balance".parse::<Command>(),
            Err(CommandError::Usage("/ask <advisor> <message>"))
        );
        assert_eq!(
            "/ask wolf hello".parse::<Command>(),
            Err(CommandError::UnknownAdvisor("wolf".into()))
        );
    }

    #[test]
    fn test_argument_checks() {
        assert_eq!(
            "/chapter".parse::<Command>(),
            Err(CommandError::Usage("/chapter <chapter-id>"))
        );
        assert_eq!("/model".parse::<Command>().unwrap(), Command::SetModel(String::new()));
        assert_eq!(
            "/answer".parse::<Command>(),
            Err(CommandError::Usage("/answer <choice-id>"))
        );
        assert_eq!(
            "/answer  feed ".parse::<Command>().unwrap(),
            Command::Answer("feed".into())
        );
        assert_eq!(
            "/teleport".parse::<Command>(),
            Err(CommandError::Unknown("/teleport".into()))
        );
    }
}
