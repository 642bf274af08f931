use tracing::{debug, error, info, warn};

use super::{EngineError, StandupEngine, flow_room, transition};
use crate::model::event::{RoomId, UserId};
use crate::model::flow::{FlowState, StandupFlow};
use crate::model::record::{PREVIOUS_POST_STATE, SendRecord};
use crate::model::section::Section;
use crate::render::{RenderOptions, notices, render_post};

impl StandupEngine {
    /// The room the finished post goes to, after checking the user can post
    /// there
    async fn checked_send_room(&self, user: &UserId) -> Result<RoomId, EngineError> {
        let settings = self.settings.get(user).await?;
        let send_room = settings.send_room.ok_or(EngineError::NoSendRoom)?;
        self.check_member(user, &send_room).await?;
        Ok(send_room)
    }

    async fn check_member(&self, user: &UserId, send_room: &RoomId) -> Result<(), EngineError> {
        let members = self.transport.room_members(send_room).await?;
        if !members.contains(user) {
            return Err(EngineError::NotSendRoomMember(send_room.clone()));
        }
        Ok(())
    }

    /// Post the finished report to the send room and record it. The flow
    /// only moves to `Sent` once the record is stored.
    pub(super) async fn send_post(
        &self,
        user: &UserId,
        room: &RoomId,
        flow: &mut StandupFlow,
    ) -> Result<(), EngineError> {
        let send_room = self.checked_send_room(user).await?;
        let day = self.weekday(&self.settings.get(user).await?);
        let post = render_post(user, &flow.items, RenderOptions::final_post());
        let message_id = self
            .transport
            .send(&send_room, &post)
            .await
            .map_err(|source| EngineError::SendFailed {
                room: send_room.clone(),
                is_edit: false,
                source,
            })?;
        info!(user = %user, send_room = %send_room, message_id = %message_id, "standup post sent");

        let record = SendRecord {
            message_id,
            send_room,
            flow_id: flow.flow_id,
            day,
            today_items: flow.items.items(Section::Today).to_vec(),
        };
        if let Err(e) = self.store_record(room, user, &record).await {
            warn!(user = %user, error = %e, "send record not stored, withdrawing post");
            if let Err(redact_err) = self
                .transport
                .redact(&record.send_room, &record.message_id)
                .await
            {
                error!(
                    user = %user,
                    send_room = %record.send_room,
                    message_id = %record.message_id,
                    error = %redact_err,
                    "could not withdraw unrecorded post"
                );
            }
            return Err(e);
        }

        transition(user, flow, FlowState::Sent);
        flow.clear_reactables();
        flow.resend_pending_id = None;
        self.transport
            .send(room, &notices::sent_to(&record.send_room, false))
            .await?;
        Ok(())
    }

    /// Re-post the current content as an edit of the sent post, in the room
    /// it was sent to
    pub(super) async fn resend_edit(
        &self,
        user: &UserId,
        room: &RoomId,
        flow: &mut StandupFlow,
    ) -> Result<(), EngineError> {
        let Some(mut record) = self.load_record(room, user).await? else {
            warn!(user = %user, "sent flow has no send record");
            *flow = StandupFlow::new();
            self.transport
                .send(room, &notices::invalid_argument("No previous post info found!"))
                .await?;
            return Ok(());
        };
        if record.flow_id != flow.flow_id {
            debug!(
                user = %user,
                flow_id = %flow.flow_id,
                record_flow_id = %record.flow_id,
                "stale re-send ignored"
            );
            return Ok(());
        }

        self.check_member(user, &record.send_room).await?;
        let post = render_post(user, &flow.items, RenderOptions::final_post());
        self.transport
            .send_edit(&record.send_room, &record.message_id, &post)
            .await
            .map_err(|source| EngineError::SendFailed {
                room: record.send_room.clone(),
                is_edit: true,
                source,
            })?;
        info!(user = %user, send_room = %record.send_room, message_id = %record.message_id, "standup post edit sent");

        record.today_items = flow.items.items(Section::Today).to_vec();
        self.store_record(room, user, &record).await?;
        flow.resend_pending_id = None;
        flow.clear_reactables();
        self.transport
            .send(room, &notices::sent_to(&record.send_room, true))
            .await?;
        Ok(())
    }

    /// Retract the sent post and go back to confirming
    pub async fn undo(&self, user: &UserId, room: &RoomId) -> Result<(), EngineError> {
        let handle = self.flows.get(user).await.ok_or(EngineError::NothingToUndo)?;
        let mut flow = handle.lock().await;
        if flow.state != FlowState::Sent {
            return Err(EngineError::NothingToUndo);
        }
        let room = flow_room(&flow, room);
        let record = self
            .load_record(&room, user)
            .await?
            .ok_or(EngineError::NoPreviousPost)?;

        self.transport
            .redact(&record.send_room, &record.message_id)
            .await
            .map_err(EngineError::RedactFailed)?;
        info!(user = %user, send_room = %record.send_room, message_id = %record.message_id, "standup post redacted");
        self.transport
            .send(&room, &notices::redacted(record.message_id.as_str()))
            .await?;
        self.clear_record(&room, user).await?;

        flow.resend_pending_id = None;
        self.show_confirmation(user, &room, &mut flow, RenderOptions::confirmation(false))
            .await?;
        transition(user, &mut flow, FlowState::Confirm);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Send record
    // -----------------------------------------------------------------------

    /// The last send record for a user in a room. A cleared or malformed
    /// record reads as none.
    pub(super) async fn load_record(
        &self,
        room: &RoomId,
        user: &UserId,
    ) -> Result<Option<SendRecord>, EngineError> {
        let value = self
            .transport
            .get_room_state(room, PREVIOUS_POST_STATE, user.state_key())
            .await?;
        Ok(value.as_ref().and_then(SendRecord::from_state))
    }

    async fn store_record(
        &self,
        room: &RoomId,
        user: &UserId,
        record: &SendRecord,
    ) -> Result<(), EngineError> {
        self.transport
            .set_room_state(room, PREVIOUS_POST_STATE, user.state_key(), record.to_state())
            .await?;
        Ok(())
    }

    async fn clear_record(&self, room: &RoomId, user: &UserId) -> Result<(), EngineError> {
        self.transport
            .set_room_state(
                room,
                PREVIOUS_POST_STATE,
                user.state_key(),
                SendRecord::cleared_state(),
            )
            .await?;
        Ok(())
    }
}
