use async_trait::async_trait;
use serde_json::Value;

use crate::model::event::{EventId, MessageContent, RoomId, UserId};

/// Error type for outbound chat calls
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("{op} failed: {reason}")]
    Failed { op: &'static str, reason: String },
    #[error("{op} failed after {attempts} attempts")]
    RetriesExhausted { op: &'static str, attempts: u32 },
}

impl TransportError {
    pub fn failed(op: &'static str, reason: impl Into<String>) -> Self {
        TransportError::Failed {
            op,
            reason: reason.into(),
        }
    }
}

/// The chat network, as seen by the engine
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Post a message, returning its event ID
    async fn send(&self, room: &RoomId, content: &MessageContent) -> Result<EventId, TransportError>;

    /// Post a replacement of `target`'s content
    async fn send_edit(
        &self,
        room: &RoomId,
        target: &EventId,
        content: &MessageContent,
    ) -> Result<EventId, TransportError>;

    /// Annotate a message with a reaction key
    async fn react(&self, room: &RoomId, target: &EventId, key: &str) -> Result<EventId, TransportError>;

    /// Retract a message
    async fn redact(&self, room: &RoomId, target: &EventId) -> Result<EventId, TransportError>;

    /// Join a room by ID or alias, returning the resolved room ID
    async fn join(&self, room_ref: &str) -> Result<RoomId, TransportError>;

    async fn leave(&self, room: &RoomId) -> Result<(), TransportError>;

    async fn room_members(&self, room: &RoomId) -> Result<Vec<UserId>, TransportError>;

    /// Read a custom room-state value. `Ok(None)` when never set.
    async fn get_room_state(
        &self,
        room: &RoomId,
        event_type: &str,
        state_key: &str,
    ) -> Result<Option<Value>, TransportError>;

    async fn set_room_state(
        &self,
        room: &RoomId,
        event_type: &str,
        state_key: &str,
        value: Value,
    ) -> Result<(), TransportError>;
}
