use chrono::Weekday;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event::{EventId, RoomId};
use super::item::StandupItem;

/// Room state event type holding the last sent post for a user
pub const PREVIOUS_POST_STATE: &str = "com.nevarro.standupbot.previous_post";

/// Durable record of the last post sent to the send room.
///
/// Stored as per-user room state in the room the flow ran in, so it survives
/// the in-memory flow being replaced. It is the only way to undo or edit a
/// sent post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRecord {
    /// The message posted to the send room (edits target this ID)
    pub message_id: EventId,
    /// The room the post went to. Edits and redactions go here even if the
    /// user's send room changed since.
    pub send_room: RoomId,
    pub flow_id: Uuid,
    /// The user's local weekday when the post was sent
    pub day: Weekday,
    pub today_items: Vec<StandupItem>,
}

impl SendRecord {
    /// Decode a stored record. An empty or differently-shaped state value
    /// (e.g. the `{}` left behind by undo) is treated as no record.
    pub fn from_state(value: &serde_json::Value) -> Option<SendRecord> {
        serde_json::from_value(value.clone()).ok()
    }

    pub fn to_state(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// The value written to clear a record
    pub fn cleared_state() -> serde_json::Value {
        serde_json::json!({})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleared_state_is_not_a_record() {
        assert!(SendRecord::from_state(&SendRecord::cleared_state()).is_none());
        assert!(SendRecord::from_state(&serde_json::Value::Null).is_none());
    }

    #[test]
    fn test_state_round_trip() {
        let record = SendRecord {
            message_id: "$post".into(),
            send_room: "!team:example.org".into(),
            flow_id: Uuid::new_v4(),
            day: Weekday::Tue,
            today_items: vec![StandupItem::new("$1".into(), "Review PRs".into(), None)],
        };
        let back = SendRecord::from_state(&record.to_state()).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_record_without_send_room_is_not_a_record() {
        let value = serde_json::json!({
            "message_id": "$post",
            "flow_id": Uuid::new_v4(),
            "day": "Tue",
            "today_items": [],
        });
        assert!(SendRecord::from_state(&value).is_none());
    }
}
