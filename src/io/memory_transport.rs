use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::io::transport::{ChatTransport, TransportError};
use crate::model::event::{EventId, MessageContent, RoomId, UserId};

/// A message posted through the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub room: RoomId,
    pub event_id: EventId,
    pub content: MessageContent,
    /// Set when the message replaces an earlier one
    pub replaces: Option<EventId>,
}

/// A reaction posted through the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedReaction {
    pub room: RoomId,
    pub target: EventId,
    pub key: String,
}

/// In-process chat network. Records everything sent through it, resolves
/// aliases registered with [`MemoryTransport::add_alias`], and can be told to
/// fail calls.
#[derive(Default)]
pub struct MemoryTransport {
    inner: Mutex<Inner>,
    echo: bool,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    messages: Vec<PostedMessage>,
    reactions: Vec<PostedReaction>,
    redactions: Vec<(RoomId, EventId)>,
    state: HashMap<(RoomId, String, String), Value>,
    members: HashMap<RoomId, Vec<UserId>>,
    default_members: Vec<UserId>,
    aliases: HashMap<String, RoomId>,
    joined: HashSet<RoomId>,
    failing_rooms: HashSet<RoomId>,
    fail_next: u32,
}

impl Inner {
    fn mint(&mut self) -> EventId {
        self.next_id += 1;
        EventId::new(format!("$evt{}", self.next_id))
    }

    fn check(&mut self, op: &'static str, room: Option<&RoomId>) -> Result<(), TransportError> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(TransportError::failed(op, "injected failure"));
        }
        if let Some(room) = room
            && self.failing_rooms.contains(room)
        {
            return Err(TransportError::failed(op, format!("{} is unreachable", room)));
        }
        Ok(())
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        MemoryTransport::default()
    }

    /// A transport that also prints outbound traffic to stdout
    pub fn echoing() -> Self {
        MemoryTransport {
            echo: true,
            ..Default::default()
        }
    }

    // -- setup --

    pub async fn set_members(&self, room: &RoomId, members: Vec<UserId>) {
        self.inner.lock().await.members.insert(room.clone(), members);
    }

    /// Members reported for rooms without an explicit member list
    pub async fn set_default_members(&self, members: Vec<UserId>) {
        self.inner.lock().await.default_members = members;
    }

    pub async fn add_alias(&self, alias: &str, room: &RoomId) {
        self.inner
            .lock()
            .await
            .aliases
            .insert(alias.to_string(), room.clone());
    }

    /// Fail every call that touches `room`
    pub async fn fail_room(&self, room: &RoomId) {
        self.inner.lock().await.failing_rooms.insert(room.clone());
    }

    pub async fn heal_room(&self, room: &RoomId) {
        self.inner.lock().await.failing_rooms.remove(room);
    }

    /// Fail the next `count` calls regardless of room
    pub async fn fail_next(&self, count: u32) {
        self.inner.lock().await.fail_next = count;
    }

    // -- inspection --

    pub async fn messages(&self) -> Vec<PostedMessage> {
        self.inner.lock().await.messages.clone()
    }

    pub async fn messages_in(&self, room: &RoomId) -> Vec<PostedMessage> {
        self.inner
            .lock()
            .await
            .messages
            .iter()
            .filter(|m| &m.room == room)
            .cloned()
            .collect()
    }

    pub async fn last_message_in(&self, room: &RoomId) -> Option<PostedMessage> {
        self.messages_in(room).await.pop()
    }

    pub async fn message(&self, id: &EventId) -> Option<PostedMessage> {
        self.inner
            .lock()
            .await
            .messages
            .iter()
            .find(|m| &m.event_id == id)
            .cloned()
    }

    pub async fn reactions_on(&self, target: &EventId) -> Vec<String> {
        self.inner
            .lock()
            .await
            .reactions
            .iter()
            .filter(|r| &r.target == target)
            .map(|r| r.key.clone())
            .collect()
    }

    pub async fn redactions(&self) -> Vec<(RoomId, EventId)> {
        self.inner.lock().await.redactions.clone()
    }

    pub async fn is_redacted(&self, target: &EventId) -> bool {
        self.inner
            .lock()
            .await
            .redactions
            .iter()
            .any(|(_, id)| id == target)
    }

    pub async fn state(&self, room: &RoomId, event_type: &str, state_key: &str) -> Option<Value> {
        self.inner
            .lock()
            .await
            .state
            .get(&(room.clone(), event_type.to_string(), state_key.to_string()))
            .cloned()
    }

    pub async fn has_joined(&self, room: &RoomId) -> bool {
        self.inner.lock().await.joined.contains(room)
    }

    fn print(&self, line: String) {
        if self.echo {
            println!("{}", line);
        }
    }
}

#[async_trait]
impl ChatTransport for MemoryTransport {
    async fn send(&self, room: &RoomId, content: &MessageContent) -> Result<EventId, TransportError> {
        let mut inner = self.inner.lock().await;
        inner.check("send", Some(room))?;
        let event_id = inner.mint();
        debug!(room = %room, event_id = %event_id, "send");
        inner.messages.push(PostedMessage {
            room: room.clone(),
            event_id: event_id.clone(),
            content: content.clone(),
            replaces: None,
        });
        self.print(format!("[{}] {}: {}", room, event_id, content.plain));
        Ok(event_id)
    }

    async fn send_edit(
        &self,
        room: &RoomId,
        target: &EventId,
        content: &MessageContent,
    ) -> Result<EventId, TransportError> {
        let mut inner = self.inner.lock().await;
        inner.check("send_edit", Some(room))?;
        let event_id = inner.mint();
        debug!(room = %room, event_id = %event_id, target = %target, "send_edit");
        inner.messages.push(PostedMessage {
            room: room.clone(),
            event_id: event_id.clone(),
            content: content.clone(),
            replaces: Some(target.clone()),
        });
        self.print(format!(
            "[{}] {} (edits {}): {}",
            room,
            event_id,
            target,
            content.edit_fallback().plain
        ));
        Ok(event_id)
    }

    async fn react(&self, room: &RoomId, target: &EventId, key: &str) -> Result<EventId, TransportError> {
        let mut inner = self.inner.lock().await;
        inner.check("react", Some(room))?;
        let event_id = inner.mint();
        inner.reactions.push(PostedReaction {
            room: room.clone(),
            target: target.clone(),
            key: key.to_string(),
        });
        self.print(format!("[{}] {} reacted {}", room, target, key));
        Ok(event_id)
    }

    async fn redact(&self, room: &RoomId, target: &EventId) -> Result<EventId, TransportError> {
        let mut inner = self.inner.lock().await;
        inner.check("redact", Some(room))?;
        let event_id = inner.mint();
        inner.redactions.push((room.clone(), target.clone()));
        self.print(format!("[{}] {} redacted", room, target));
        Ok(event_id)
    }

    async fn join(&self, room_ref: &str) -> Result<RoomId, TransportError> {
        let mut inner = self.inner.lock().await;
        inner.check("join", None)?;
        let room = if room_ref.starts_with('#') {
            inner
                .aliases
                .get(room_ref)
                .cloned()
                .ok_or_else(|| TransportError::failed("join", format!("unknown alias {}", room_ref)))?
        } else if room_ref.starts_with('!') {
            RoomId::from(room_ref)
        } else {
            return Err(TransportError::failed(
                "join",
                format!("{} is not a room ID or alias", room_ref),
            ));
        };
        inner.check("join", Some(&room))?;
        inner.joined.insert(room.clone());
        Ok(room)
    }

    async fn leave(&self, room: &RoomId) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().await;
        inner.check("leave", Some(room))?;
        inner.joined.remove(room);
        self.print(format!("left {}", room));
        Ok(())
    }

    async fn room_members(&self, room: &RoomId) -> Result<Vec<UserId>, TransportError> {
        let mut inner = self.inner.lock().await;
        inner.check("room_members", Some(room))?;
        Ok(inner
            .members
            .get(room)
            .cloned()
            .unwrap_or_else(|| inner.default_members.clone()))
    }

    async fn get_room_state(
        &self,
        room: &RoomId,
        event_type: &str,
        state_key: &str,
    ) -> Result<Option<Value>, TransportError> {
        let mut inner = self.inner.lock().await;
        inner.check("get_room_state", Some(room))?;
        Ok(inner
            .state
            .get(&(room.clone(), event_type.to_string(), state_key.to_string()))
            .cloned())
    }

    async fn set_room_state(
        &self,
        room: &RoomId,
        event_type: &str,
        state_key: &str,
        value: Value,
    ) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().await;
        inner.check("set_room_state", Some(room))?;
        inner
            .state
            .insert((room.clone(), event_type.to_string(), state_key.to_string()), value);
        Ok(())
    }
}
