use serde::{Deserialize, Serialize};

use super::event::RoomId;

/// Per-user settings kept by the settings store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    /// IANA timezone name (e.g. `America/New_York`). UTC when unset.
    #[serde(default)]
    pub timezone: Option<String>,
    /// Notification time in minutes after local midnight
    #[serde(default)]
    pub notify_minutes: Option<u32>,
    /// Room the finished post is sent to
    #[serde(default)]
    pub send_room: Option<RoomId>,
    /// Collect sections in parallel threads instead of sequential prompts
    #[serde(default)]
    pub use_threads: bool,
    /// Room where the user last issued a command
    #[serde(default)]
    pub config_room: Option<RoomId>,
}
