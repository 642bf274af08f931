use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

use crate::engine::StandupEngine;
use crate::model::event::{CANCEL_KEY, DONE_KEY, EventId, InboundEvent, MessageContent, RoomId, UserId};

/// One line of console input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Event(InboundEvent),
    /// Fire the daily notification now
    Notify,
    Quit,
}

/// Turns typed lines into chat events from one user in one room.
///
/// Plain lines are messages. Slash commands produce the other event kinds:
///
/// ```text
/// /react <id> <key|done|cancel>
/// /edit <id> <text>
/// /redact <id>
/// /reply <id> <text>
/// /thread <root-id> <text>
/// /notify
/// /quit
/// ```
pub struct ConsoleSession {
    pub user: UserId,
    pub room: RoomId,
    next_id: u64,
}

impl ConsoleSession {
    pub fn new(user: UserId, room: RoomId) -> Self {
        ConsoleSession {
            user,
            room,
            next_id: 0,
        }
    }

    fn mint(&mut self) -> EventId {
        self.next_id += 1;
        EventId::new(format!("$in{}", self.next_id))
    }

    /// Parse a line. `None` for blank lines and malformed slash commands.
    pub fn parse_line(&mut self, line: &str) -> Option<ConsoleInput> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(rest) = line.strip_prefix('/') else {
            let event_id = self.mint();
            return Some(ConsoleInput::Event(InboundEvent::PlainMessage {
                sender: self.user.clone(),
                room: self.room.clone(),
                event_id,
                content: MessageContent::text(line),
            }));
        };

        let (cmd, args) = rest.split_once(' ').unwrap_or((rest, ""));
        let (first, text) = args.trim().split_once(' ').unwrap_or((args.trim(), ""));
        let first = (!first.is_empty()).then(|| EventId::from(first));
        let text = text.trim();

        let event = match (cmd, first) {
            ("notify", _) => return Some(ConsoleInput::Notify),
            ("quit", _) => return Some(ConsoleInput::Quit),
            ("react", Some(target)) if !text.is_empty() => {
                let key = match text {
                    "done" => DONE_KEY,
                    "cancel" => CANCEL_KEY,
                    other => other,
                };
                InboundEvent::Reaction {
                    sender: self.user.clone(),
                    room: self.room.clone(),
                    event_id: self.mint(),
                    target,
                    key: key.to_string(),
                }
            }
            ("edit", Some(target)) if !text.is_empty() => InboundEvent::EditRelation {
                sender: self.user.clone(),
                room: self.room.clone(),
                event_id: self.mint(),
                target,
                new_content: MessageContent::text(text),
            },
            ("redact", Some(redacts)) => InboundEvent::Redaction {
                sender: self.user.clone(),
                room: self.room.clone(),
                event_id: self.mint(),
                redacts,
            },
            ("reply", Some(in_reply_to)) if !text.is_empty() => InboundEvent::ReplyRelation {
                sender: self.user.clone(),
                room: self.room.clone(),
                event_id: self.mint(),
                in_reply_to,
                content: MessageContent::text(text),
            },
            ("thread", Some(thread_root)) if !text.is_empty() => InboundEvent::ThreadRelation {
                sender: self.user.clone(),
                room: self.room.clone(),
                event_id: self.mint(),
                thread_root,
                in_reply_to: None,
                content: MessageContent::text(text),
            },
            _ => return None,
        };
        Some(ConsoleInput::Event(event))
    }
}

/// Feed lines from `reader` to the engine until EOF or `/quit`
pub async fn run<R>(engine: &StandupEngine, session: &mut ConsoleSession, reader: R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        match session.parse_line(&line) {
            Some(ConsoleInput::Event(event)) => {
                println!("> {}", event.event_id());
                engine.handle_event(event).await;
            }
            Some(ConsoleInput::Notify) => {
                if let Err(e) = engine.notify_user(&session.user, &session.room).await {
                    eprintln!("error: {}", e);
                }
            }
            Some(ConsoleInput::Quit) => break,
            None => {
                if line.trim().starts_with('/') {
                    eprintln!("error: could not parse {:?}", line.trim());
                }
            }
        }
    }
    info!("console input closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session() -> ConsoleSession {
        ConsoleSession::new("@me:x".into(), "!dm:x".into())
    }

    #[test]
    fn test_plain_line_is_a_message() {
        let mut s = session();
        assert_eq!(
            s.parse_line("Fixed bug"),
            Some(ConsoleInput::Event(InboundEvent::PlainMessage {
                sender: "@me:x".into(),
                room: "!dm:x".into(),
                event_id: "$in1".into(),
                content: MessageContent::text("Fixed bug"),
            }))
        );
        assert_eq!(s.parse_line("   "), None);
    }

    #[test]
    fn test_react_shortcuts() {
        let mut s = session();
        let Some(ConsoleInput::Event(InboundEvent::Reaction { target, key, .. })) =
            s.parse_line("/react $evt3 done")
        else {
            panic!("expected a reaction");
        };
        assert_eq!(target.as_str(), "$evt3");
        assert_eq!(key, DONE_KEY);
    }

    #[test]
    fn test_edit_keeps_full_text() {
        let mut s = session();
        let Some(ConsoleInput::Event(InboundEvent::EditRelation {
            target,
            new_content,
            ..
        })) = s.parse_line("/edit $in2 Wrote more tests")
        else {
            panic!("expected an edit");
        };
        assert_eq!(target.as_str(), "$in2");
        assert_eq!(new_content.plain, "Wrote more tests");
    }

    #[test]
    fn test_thread_and_redact() {
        let mut s = session();
        assert!(matches!(
            s.parse_line("/thread $evt5 Waiting on review"),
            Some(ConsoleInput::Event(InboundEvent::ThreadRelation { .. }))
        ));
        assert!(matches!(
            s.parse_line("/redact $in1"),
            Some(ConsoleInput::Event(InboundEvent::Redaction { .. }))
        ));
    }

    #[test]
    fn test_malformed_commands() {
        let mut s = session();
        assert_eq!(s.parse_line("/react"), None);
        assert_eq!(s.parse_line("/edit $1"), None);
        assert_eq!(s.parse_line("/dance"), None);
        assert_eq!(s.parse_line("/notify"), Some(ConsoleInput::Notify));
        assert_eq!(s.parse_line("/quit"), Some(ConsoleInput::Quit));
    }
}
