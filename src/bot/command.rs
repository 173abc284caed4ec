//! Chat command parsing

use crate::market::ReportKind;
use crate::types::Direction;

/// Commands understood by the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Buy,
    Sell,
    Average,
    Start,
    Help,
    Unknown(String),
}

impl Command {
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "p2pbuy" => Command::Buy,
            "p2psell" => Command::Sell,
            "promedio" => Command::Average,
            "start" => Command::Start,
            "help" | "ayuda" => Command::Help,
            other => Command::Unknown(other.to_string()),
        }
    }

    /// Market report requested by this command, if any
    pub fn report_kind(&self) -> Option<ReportKind> {
        match self {
            Command::Buy => Some(ReportKind::Listing(Direction::Buy)),
            Command::Sell => Some(ReportKind::Listing(Direction::Sell)),
            Command::Average => Some(ReportKind::Average),
            _ => None,
        }
    }
}

/// A slash command with its first argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Command name as typed, without slash or @botname suffix
    pub name: String,
    pub command: Command,
    pub arg: Option<String>,
}

impl ParsedCommand {
    /// Parse `/name[@bot] [arg ...]`. Returns None for plain text.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let head = parts.next()?.strip_prefix('/')?;
        let name = head.split('@').next().unwrap_or(head);
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_lowercase(),
            command: Command::from_name(name),
            arg: parts.next().map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_with_argument() {
        let parsed = ParsedCommand::parse("/p2pbuy 15").unwrap();
        assert_eq!(parsed.command, Command::Buy);
        assert_eq!(parsed.arg.as_deref(), Some("15"));
    }

    #[test]
    fn strips_bot_mention_and_ignores_extra_args() {
        let parsed = ParsedCommand::parse("/P2PSell@MiBot 5 extra").unwrap();
        assert_eq!(parsed.name, "p2psell");
        assert_eq!(parsed.command, Command::Sell);
        assert_eq!(parsed.arg.as_deref(), Some("5"));
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert!(ParsedCommand::parse("hola").is_none());
        assert!(ParsedCommand::parse("").is_none());
        assert!(ParsedCommand::parse("/").is_none());
    }

    #[test]
    fn maps_commands_to_reports() {
        assert_eq!(
            Command::from_name("promedio").report_kind(),
            Some(ReportKind::Average)
        );
        assert_eq!(Command::from_name("ayuda"), Command::Help);
        assert_eq!(Command::Start.report_kind(), None);
        assert_eq!(
            Command::from_name("precio"),
            Command::Unknown("precio".to_string())
        );
    }
}
