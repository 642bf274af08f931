use regex::Regex;

use crate::model::event::UserId;

/// A recognized bot command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New,
    Show,
    Edit(Option<String>),
    Cancel,
    Undo,
    Help,
    Vanquish,
    Tz(Option<String>),
    Notify(Option<String>),
    Room(Option<String>),
    Threads(Option<String>),
}

/// Recognizes `!standupbot`, `!su`, `<localpart>:` and `@<localpart>`
/// prefixed messages
pub struct CommandParser {
    bare: Vec<Regex>,
    with_args: Vec<Regex>,
}

impl CommandParser {
    pub fn new(bot: &UserId) -> Result<Self, regex::Error> {
        let local = regex::escape(bot.localpart());
        let server = regex::escape(bot.state_key().split_once(':').map_or("", |(_, s)| s));
        Ok(CommandParser {
            bare: vec![Regex::new(r"^!standupbot:?$")?, Regex::new(r"^!su:?$")?],
            with_args: vec![
                Regex::new(r"^!standupbot:? (.*)$")?,
                Regex::new(r"^!su:? (.*)$")?,
                Regex::new(&format!(r"^{}:(.*)$", local))?,
                Regex::new(&format!(r"^@{}(?::{})?:?(.*)$", local, server))?,
            ],
        })
    }

    /// Parse a message body. `None` when the message is not addressed to
    /// the bot.
    pub fn parse(&self, body: &str) -> Option<Command> {
        let body = body.trim();
        if self.bare.iter().any(|re| re.is_match(body)) {
            return Some(Command::Help);
        }
        let rest = self
            .with_args
            .iter()
            .find_map(|re| re.captures(body))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())?;
        Some(parse_args(rest))
    }
}

fn parse_args(rest: &str) -> Command {
    let mut parts = rest.split_whitespace();
    let Some(name) = parts.next() else {
        return Command::Help;
    };
    let args: Vec<&str> = parts.collect();
    let first = args.first().map(|a| a.to_string());
    match name.to_lowercase().as_str() {
        "new" => Command::New,
        "show" => Command::Show,
        "edit" => Command::Edit(first),
        "cancel" => Command::Cancel,
        "undo" => Command::Undo,
        "vanquish" => Command::Vanquish,
        "tz" => Command::Tz(first),
        "notify" => Command::Notify(first),
        "room" => Command::Room(first),
        "threads" => Command::Threads(first),
        _ => Command::Help,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> CommandParser {
        CommandParser::new(&UserId::from("@standupbot:example.org")).unwrap()
    }

    #[test]
    fn test_prefixes() {
        let p = parser();
        assert_eq!(p.parse("!standupbot new"), Some(Command::New));
        assert_eq!(p.parse("!standupbot: new"), Some(Command::New));
        assert_eq!(p.parse("!su show"), Some(Command::Show));
        assert_eq!(p.parse("standupbot: undo"), Some(Command::Undo));
        assert_eq!(p.parse("@standupbot cancel"), Some(Command::Cancel));
        assert_eq!(p.parse("@standupbot:example.org: new"), Some(Command::New));
    }

    #[test]
    fn test_bare_prefix_is_help() {
        let p = parser();
        assert_eq!(p.parse("!standupbot"), Some(Command::Help));
        assert_eq!(p.parse("!su"), Some(Command::Help));
        assert_eq!(p.parse("standupbot:"), Some(Command::Help));
        assert_eq!(p.parse("!su dance"), Some(Command::Help));
    }

    #[test]
    fn test_arguments() {
        let p = parser();
        assert_eq!(
            p.parse("!su edit Blockers"),
            Some(Command::Edit(Some("Blockers".into())))
        );
        assert_eq!(p.parse("!su edit"), Some(Command::Edit(None)));
        assert_eq!(
            p.parse("!su tz America/New_York"),
            Some(Command::Tz(Some("America/New_York".into())))
        );
        assert_eq!(
            p.parse("!su  NOTIFY  09:30"),
            Some(Command::Notify(Some("09:30".into())))
        );
        assert_eq!(
            p.parse("!su room #standup:example.org"),
            Some(Command::Room(Some("#standup:example.org".into())))
        );
    }

    #[test]
    fn test_plain_messages_are_not_commands() {
        let p = parser();
        assert_eq!(p.parse("Fixed bug"), None);
        assert_eq!(p.parse("talked to standupbot about it"), None);
        assert_eq!(p.parse("!sudo new"), None);
    }
}
