//! Shared harness for engine integration tests.
//!
//! Drives a `StandupEngine` over an in-memory transport with a fixed clock,
//! speaking as one user in one direct-message room.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use standupbot::engine::StandupEngine;
use standupbot::io::memory_transport::{MemoryTransport, PostedMessage};
use standupbot::io::transport::ChatTransport;
use standupbot::io::settings_store::{MemorySettingsStore, SettingsStore};
use standupbot::model::event::{
    CANCEL_KEY, DONE_KEY, EventId, InboundEvent, MessageContent, RoomId, UserId,
};
use standupbot::model::flow::StandupFlow;
use standupbot::model::record::{PREVIOUS_POST_STATE, SendRecord};
use standupbot::model::settings::UserSettings;
use standupbot::ops::calendar::FixedClock;

pub const BOT: &str = "@standupbot:example.org";
pub const USER: &str = "@alice:example.org";
pub const ROOM: &str = "!dm:example.org";
pub const SEND_ROOM: &str = "!team:example.org";

/// Tuesday 2024-01-02, midday UTC
pub fn tuesday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap()
}

/// Monday 2024-01-01, midday UTC
pub fn monday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

pub struct Harness {
    pub engine: Arc<StandupEngine>,
    pub net: Arc<MemoryTransport>,
    pub settings: Arc<MemorySettingsStore>,
    pub user: UserId,
    pub room: RoomId,
    pub send_room: RoomId,
    next_id: u64,
}

impl Harness {
    pub async fn new(now: DateTime<Utc>) -> Harness {
        let net = Arc::new(MemoryTransport::new());
        let settings = Arc::new(MemorySettingsStore::new());
        let engine = Arc::new(
            StandupEngine::new(
                UserId::from(BOT),
                net.clone(),
                settings.clone(),
                Arc::new(FixedClock(now)),
            )
            .unwrap(),
        );
        Harness {
            engine,
            net,
            settings,
            user: UserId::from(USER),
            room: RoomId::from(ROOM),
            send_room: RoomId::from(SEND_ROOM),
            next_id: 0,
        }
    }

    /// Harness whose user has a send room they are a member of
    pub async fn with_send_room(now: DateTime<Utc>) -> Harness {
        let h = Harness::new(now).await;
        h.update_settings(|s| s.send_room = Some(RoomId::from(SEND_ROOM)))
            .await;
        h.net
            .set_members(&h.send_room, vec![h.user.clone()])
            .await;
        h
    }

    pub async fn update_settings(&self, f: impl FnOnce(&mut UserSettings)) {
        let mut settings = self.settings.get(&self.user).await.unwrap();
        f(&mut settings);
        self.settings.put(&self.user, settings).await.unwrap();
    }

    pub async fn user_settings(&self) -> UserSettings {
        self.settings.get(&self.user).await.unwrap()
    }

    fn mint(&mut self) -> EventId {
        self.next_id += 1;
        EventId::new(format!("$user{}", self.next_id))
    }

    // -- inbound --

    pub async fn say(&mut self, text: &str) -> EventId {
        let room = self.room.clone();
        self.say_in(&room, text).await
    }

    pub async fn say_in(&mut self, room: &RoomId, text: &str) -> EventId {
        let event_id = self.mint();
        self.engine
            .handle_event(InboundEvent::PlainMessage {
                sender: self.user.clone(),
                room: room.clone(),
                event_id: event_id.clone(),
                content: MessageContent::text(text),
            })
            .await;
        event_id
    }

    pub async fn react(&mut self, target: &EventId, key: &str) {
        let event_id = self.mint();
        self.engine
            .handle_event(InboundEvent::Reaction {
                sender: self.user.clone(),
                room: self.room.clone(),
                event_id,
                target: target.clone(),
                key: key.to_string(),
            })
            .await;
    }

    pub async fn done(&mut self, target: &EventId) {
        self.react(target, DONE_KEY).await;
    }

    pub async fn cancel(&mut self, target: &EventId) {
        self.react(target, CANCEL_KEY).await;
    }

    pub async fn edit(&mut self, target: &EventId, text: &str) {
        let event_id = self.mint();
        self.engine
            .handle_event(InboundEvent::EditRelation {
                sender: self.user.clone(),
                room: self.room.clone(),
                event_id,
                target: target.clone(),
                new_content: MessageContent::text(text),
            })
            .await;
    }

    pub async fn redact(&mut self, target: &EventId) {
        let event_id = self.mint();
        self.engine
            .handle_event(InboundEvent::Redaction {
                sender: self.user.clone(),
                room: self.room.clone(),
                event_id,
                redacts: target.clone(),
            })
            .await;
    }

    pub async fn thread_reply(&mut self, root: &EventId, text: &str) -> EventId {
        let event_id = self.mint();
        self.engine
            .handle_event(InboundEvent::ThreadRelation {
                sender: self.user.clone(),
                room: self.room.clone(),
                event_id: event_id.clone(),
                thread_root: root.clone(),
                in_reply_to: None,
                content: MessageContent::text(text),
            })
            .await;
        event_id
    }

    // -- inspection --

    pub async fn flow(&self) -> StandupFlow {
        self.engine.flow(&self.user).await.unwrap()
    }

    /// The newest message the bot posted in the DM room
    pub async fn last_reply(&self) -> PostedMessage {
        self.net.last_message_in(&self.room).await.unwrap()
    }

    pub async fn last_reply_text(&self) -> String {
        self.last_reply().await.content.plain
    }

    pub async fn preview_id(&self) -> EventId {
        self.flow().await.preview_id.unwrap()
    }

    /// Overwrite the stored send record as the chat server would see it
    pub async fn set_record_state(&self, value: serde_json::Value) {
        self.net
            .set_room_state(&self.room, PREVIOUS_POST_STATE, self.user.state_key(), value)
            .await
            .unwrap();
    }

    pub async fn record(&self) -> Option<SendRecord> {
        self.net
            .state(&self.room, PREVIOUS_POST_STATE, self.user.state_key())
            .await
            .and_then(|v| SendRecord::from_state(&v))
    }

    /// Run `new` and answer every sequential section with the given items,
    /// ending in `Confirm`
    pub async fn write_post(&mut self, sections: &[&[&str]]) {
        self.say("!su new").await;
        for items in sections {
            let prompt = self.last_reply().await.event_id;
            for item in *items {
                self.say(item).await;
            }
            self.done(&prompt).await;
        }
    }
}
