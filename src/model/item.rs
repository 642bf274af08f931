use serde::{Deserialize, Serialize};

use super::event::{EventId, MessageContent};

/// One collected line of standup content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandupItem {
    /// The inbound event that produced (or last touched) this item
    pub origin_id: EventId,
    pub plain_text: String,
    /// Rich rendering; `plain_text` is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_text: Option<String>,
}

impl StandupItem {
    pub fn new(origin_id: EventId, plain_text: String, rich_text: Option<String>) -> Self {
        StandupItem {
            origin_id,
            plain_text,
            rich_text: rich_text.filter(|r| !r.is_empty()),
        }
    }

    /// Build an item from a message's content
    pub fn from_content(origin_id: EventId, content: &MessageContent) -> Self {
        StandupItem::new(origin_id, content.plain.clone(), content.rich.clone())
    }
}
