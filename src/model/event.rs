use serde::{Deserialize, Serialize};

/// Reaction key that means "done" / "send"
pub const DONE_KEY: &str = "✅";
/// Reaction key that means "cancel"
pub const CANCEL_KEY: &str = "❌";

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                $name(id.to_string())
            }
        }
    };
}

string_id!(
    /// A chat user, e.g. `@alice:example.org`
    UserId
);
string_id!(
    /// A chat room, e.g. `!abc:example.org`
    RoomId
);
string_id!(
    /// A message, reaction or redaction event
    EventId
);

impl UserId {
    /// The user ID without the leading sigil. Used as the state key for
    /// per-user room state.
    pub fn state_key(&self) -> &str {
        self.0.strip_prefix('@').unwrap_or(&self.0)
    }

    /// The localpart (`alice` for `@alice:example.org`)
    pub fn localpart(&self) -> &str {
        let key = self.state_key();
        key.split(':').next().unwrap_or(key)
    }
}

/// Whether an outbound message is a regular message or a bot notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Notice,
}

/// Text content in plain and (optionally) rich form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
    pub kind: MessageKind,
    pub plain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich: Option<String>,
}

impl MessageContent {
    pub fn text(plain: impl Into<String>) -> Self {
        MessageContent {
            kind: MessageKind::Text,
            plain: plain.into(),
            rich: None,
        }
    }

    pub fn notice(plain: impl Into<String>) -> Self {
        MessageContent {
            kind: MessageKind::Notice,
            plain: plain.into(),
            rich: None,
        }
    }

    pub fn with_rich(mut self, rich: impl Into<String>) -> Self {
        self.rich = Some(rich.into());
        self
    }

    /// The rich rendering, falling back to plain text
    pub fn rich_or_plain(&self) -> &str {
        self.rich.as_deref().unwrap_or(&self.plain)
    }

    /// Fallback body for a replace-relation edit (` * ` prefixed)
    pub fn edit_fallback(&self) -> MessageContent {
        MessageContent {
            kind: self.kind,
            plain: format!(" * {}", self.plain),
            rich: self.rich.as_ref().map(|r| format!(" * {}", r)),
        }
    }
}

/// An inbound chat event, classified by its relation.
///
/// Every variant carries the sender, the room it arrived in, and its own
/// unique event ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A message with no relation
    PlainMessage {
        sender: UserId,
        room: RoomId,
        event_id: EventId,
        content: MessageContent,
    },
    /// A replacement of an earlier message's content
    EditRelation {
        sender: UserId,
        room: RoomId,
        event_id: EventId,
        target: EventId,
        new_content: MessageContent,
    },
    /// A rich reply to an earlier message (outside of a thread)
    ReplyRelation {
        sender: UserId,
        room: RoomId,
        event_id: EventId,
        in_reply_to: EventId,
        content: MessageContent,
    },
    /// A message posted in a thread. `in_reply_to` is set when the message
    /// also quotes a specific message inside the thread.
    ThreadRelation {
        sender: UserId,
        room: RoomId,
        event_id: EventId,
        thread_root: EventId,
        in_reply_to: Option<EventId>,
        content: MessageContent,
    },
    /// An annotation (emoji reaction) on an earlier message
    Reaction {
        sender: UserId,
        room: RoomId,
        event_id: EventId,
        target: EventId,
        key: String,
    },
    /// Retraction of an earlier message
    Redaction {
        sender: UserId,
        room: RoomId,
        event_id: EventId,
        redacts: EventId,
    },
}

impl InboundEvent {
    pub fn sender(&self) -> &UserId {
        match self {
            InboundEvent::PlainMessage { sender, .. }
            | InboundEvent::EditRelation { sender, .. }
            | InboundEvent::ReplyRelation { sender, .. }
            | InboundEvent::ThreadRelation { sender, .. }
            | InboundEvent::Reaction { sender, .. }
            | InboundEvent::Redaction { sender, .. } => sender,
        }
    }

    pub fn room(&self) -> &RoomId {
        match self {
            InboundEvent::PlainMessage { room, .. }
            | InboundEvent::EditRelation { room, .. }
            | InboundEvent::ReplyRelation { room, .. }
            | InboundEvent::ThreadRelation { room, .. }
            | InboundEvent::Reaction { room, .. }
            | InboundEvent::Redaction { room, .. } => room,
        }
    }

    pub fn event_id(&self) -> &EventId {
        match self {
            InboundEvent::PlainMessage { event_id, .. }
            | InboundEvent::EditRelation { event_id, .. }
            | InboundEvent::ReplyRelation { event_id, .. }
            | InboundEvent::ThreadRelation { event_id, .. }
            | InboundEvent::Reaction { event_id, .. }
            | InboundEvent::Redaction { event_id, .. } => event_id,
        }
    }

    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::PlainMessage { .. } => "message",
            InboundEvent::EditRelation { .. } => "edit",
            InboundEvent::ReplyRelation { .. } => "reply",
            InboundEvent::ThreadRelation { .. } => "thread",
            InboundEvent::Reaction { .. } => "reaction",
            InboundEvent::Redaction { .. } => "redaction",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_parts() {
        let user = UserId::from("@alice:example.org");
        assert_eq!(user.state_key(), "alice:example.org");
        assert_eq!(user.localpart(), "alice");
    }

    #[test]
    fn test_edit_fallback_prefixes_both_renderings() {
        let content = MessageContent::text("hello").with_rich("<b>hello</b>");
        let fallback = content.edit_fallback();
        assert_eq!(fallback.plain, " * hello");
        assert_eq!(fallback.rich.as_deref(), Some(" * <b>hello</b>"));
    }

    #[test]
    fn test_rich_or_plain() {
        assert_eq!(MessageContent::text("a").rich_or_plain(), "a");
        assert_eq!(MessageContent::text("a").with_rich("b").rich_or_plain(), "b");
    }

    #[test]
    fn test_accessors_cover_every_variant() {
        let event = InboundEvent::Redaction {
            sender: "@bob:x".into(),
            room: "!r:x".into(),
            event_id: "$3".into(),
            redacts: "$1".into(),
        };
        assert_eq!(event.sender().as_str(), "@bob:x");
        assert_eq!(event.room().as_str(), "!r:x");
        assert_eq!(event.event_id().as_str(), "$3");
        assert_eq!(event.kind(), "redaction");
    }
}
