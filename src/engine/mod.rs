pub mod command;
pub mod registry;
pub mod send;

use std::sync::Arc;

use chrono::Weekday;
use tracing::{debug, info, warn};

use crate::io::settings_store::{SettingsError, SettingsStore};
use crate::io::transport::{ChatTransport, TransportError};
use crate::model::event::{
    CANCEL_KEY, DONE_KEY, EventId, InboundEvent, MessageContent, RoomId, UserId,
};
use crate::model::flow::{FlowState, StandupFlow};
use crate::model::item::StandupItem;
use crate::model::section::Section;
use crate::model::settings::UserSettings;
use crate::ops::calendar::{self, Clock};
use crate::ops::flow_ops::{self, Advance, EditRequestError};
use crate::ops::{item_ops, thread_ops};
use crate::render::{RenderOptions, notices, render_post};

use command::{Command, CommandParser};
use registry::FlowRegistry;

/// Error type for engine operations. Every variant has a user-facing notice.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no send room configured")]
    NoSendRoom,
    #[error("not a member of send room {0}")]
    NotSendRoomMember(RoomId),
    #[error("no standup post to {0}")]
    NoFlow(&'static str),
    #[error("no sent standup post to undo")]
    NothingToUndo,
    #[error("no previous standup post record")]
    NoPreviousPost,
    #[error(transparent)]
    EditRequest(#[from] EditRequestError),
    #[error("sending to {room} failed: {source}")]
    SendFailed {
        room: RoomId,
        is_edit: bool,
        source: TransportError,
    },
    #[error("redacting the sent post failed: {0}")]
    RedactFailed(TransportError),
    #[error("could not join {room_ref}: {source}")]
    JoinFailed {
        room_ref: String,
        source: TransportError,
    },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl EngineError {
    /// The chat message that reports this error to the user
    pub fn notice(&self) -> MessageContent {
        match self {
            EngineError::NoSendRoom => MessageContent::text(
                "No send room set! Set one using `!standupbot room [room ID or alias]`",
            )
            .with_rich(
                "No send room set! Set one using <code>!standupbot room [room ID or alias]</code>",
            ),
            EngineError::NotSendRoomMember(_) => MessageContent::text(
                "You are not a member of the configured send room! Refusing to send a message to the room. Set a new one using `!standupbot room [room ID or alias]`.",
            )
            .with_rich(
                "<b>You are not a member of the configured send room!</b> Refusing to send a message to the room. Set a new one using <code>!standupbot room [room ID or alias]</code>.",
            ),
            EngineError::NoFlow(action) => {
                MessageContent::notice(format!("No standup post to {}.", action))
            }
            EngineError::NothingToUndo => MessageContent::notice("No sent standup post to undo."),
            EngineError::NoPreviousPost => {
                MessageContent::notice("No previous standup post to undo.")
            }
            EngineError::EditRequest(e) => MessageContent::notice(e.to_string()),
            EngineError::SendFailed { room, is_edit, .. } => notices::failed_to_send(room, *is_edit),
            EngineError::RedactFailed(_) => {
                MessageContent::notice("Failed to redact the standup post!")
            }
            EngineError::JoinFailed { room_ref, .. } => {
                MessageContent::notice(format!("Could not join {}.", room_ref))
            }
            EngineError::Transport(_) | EngineError::Settings(_) => MessageContent::notice(
                "Something went wrong while talking to the chat server. Please try again.",
            ),
        }
    }
}

/// Drives every user's standup flow from inbound chat events
pub struct StandupEngine {
    bot: UserId,
    transport: Arc<dyn ChatTransport>,
    settings: Arc<dyn SettingsStore>,
    flows: FlowRegistry,
    clock: Arc<dyn Clock>,
    commands: CommandParser,
}

impl StandupEngine {
    pub fn new(
        bot: UserId,
        transport: Arc<dyn ChatTransport>,
        settings: Arc<dyn SettingsStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, regex::Error> {
        let commands = CommandParser::new(&bot)?;
        Ok(StandupEngine {
            bot,
            transport,
            settings,
            flows: FlowRegistry::new(),
            clock,
            commands,
        })
    }

    pub fn flows(&self) -> &FlowRegistry {
        &self.flows
    }

    /// A copy of a user's current flow
    pub async fn flow(&self, user: &UserId) -> Option<StandupFlow> {
        match self.flows.get(user).await {
            Some(handle) => Some(handle.lock().await.clone()),
            None => None,
        }
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Handle one inbound event. Failures are reported to the user in the
    /// event's room and never propagate.
    pub async fn handle_event(&self, event: InboundEvent) {
        debug!(
            kind = event.kind(),
            sender = %event.sender(),
            room = %event.room(),
            event_id = %event.event_id(),
            "inbound event"
        );
        if event.sender() == &self.bot {
            return;
        }
        let room = event.room().clone();
        if let Err(e) = self.dispatch(event).await {
            warn!(room = %room, error = %e, "event handling failed");
            if let Err(send_err) = self.transport.send(&room, &e.notice()).await {
                warn!(room = %room, error = %send_err, "could not report failure");
            }
        }
    }

    async fn dispatch(&self, event: InboundEvent) -> Result<(), EngineError> {
        match event {
            InboundEvent::PlainMessage {
                sender,
                room,
                event_id,
                content,
            } => match self.commands.parse(&content.plain) {
                Some(command) => self.run_command(&sender, &room, command).await,
                None => self.handle_message(&sender, &room, &event_id, &content).await,
            },
            InboundEvent::EditRelation {
                sender,
                room,
                target,
                new_content,
                ..
            } => self.handle_edit_event(&sender, &room, &target, &new_content).await,
            InboundEvent::ReplyRelation {
                sender,
                room,
                event_id,
                in_reply_to,
                content,
            } => {
                self.handle_reply_event(&sender, &room, &event_id, &[&in_reply_to], &content)
                    .await
            }
            InboundEvent::ThreadRelation {
                sender,
                room,
                event_id,
                thread_root,
                in_reply_to,
                content,
            } => {
                let mut candidates = vec![&thread_root];
                if let Some(quoted) = &in_reply_to {
                    candidates.push(quoted);
                }
                self.handle_reply_event(&sender, &room, &event_id, &candidates, &content)
                    .await
            }
            InboundEvent::Reaction {
                sender,
                room,
                target,
                key,
                ..
            } => match key.as_str() {
                DONE_KEY => self.advance_on_done_reaction(&sender, &room, &target).await,
                CANCEL_KEY => self.cancel_on_reaction(&sender, &room, &target).await,
                _ => Ok(()),
            },
            InboundEvent::Redaction {
                sender,
                room,
                redacts,
                ..
            } => self.handle_redaction_event(&sender, &room, &redacts).await,
        }
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    async fn run_command(
        &self,
        user: &UserId,
        room: &RoomId,
        command: Command,
    ) -> Result<(), EngineError> {
        info!(user = %user, room = %room, command = ?command, "command");
        let mut settings = self.settings.get(user).await?;
        if settings.config_room.as_ref() != Some(room) {
            settings.config_room = Some(room.clone());
            self.settings.put(user, settings.clone()).await?;
        }

        match command {
            Command::New => self.start(user, room).await,
            Command::Show => {
                let content = self
                    .render_current(user)
                    .await
                    .ok_or(EngineError::NoFlow("show"))?;
                self.transport.send(room, &content).await?;
                Ok(())
            }
            Command::Edit(section) => self.edit_request(user, room, section.as_deref()).await,
            Command::Cancel => self.cancel(user, room).await,
            Command::Undo => self.undo(user, room).await,
            Command::Help => {
                self.transport.send(room, &notices::help()).await?;
                Ok(())
            }
            Command::Vanquish => {
                info!(room = %room, "leaving room");
                self.transport.leave(room).await?;
                Ok(())
            }
            Command::Tz(zone) => self.set_timezone(user, room, settings, zone).await,
            Command::Notify(time) => self.set_notify_time(user, room, settings, time).await,
            Command::Room(room_ref) => self.set_send_room(user, room, settings, room_ref).await,
            Command::Threads(mode) => self.set_threads(user, room, settings, mode).await,
        }
    }

    async fn set_timezone(
        &self,
        user: &UserId,
        room: &RoomId,
        mut settings: UserSettings,
        zone: Option<String>,
    ) -> Result<(), EngineError> {
        let reply = match zone {
            None => notices::timezone_status(settings.timezone.as_deref()),
            Some(zone) => match calendar::parse_timezone(&zone) {
                Some(tz) => {
                    settings.timezone = Some(tz.name().to_string());
                    self.settings.put(user, settings.clone()).await?;
                    notices::timezone_status(settings.timezone.as_deref())
                }
                None => notices::invalid_argument(format!(
                    "{} is not a recognized timezone. Use the name corresponding to a file in the IANA Time Zone database, such as 'America/New_York'",
                    zone
                )),
            },
        };
        self.transport.send(room, &reply).await?;
        Ok(())
    }

    async fn set_notify_time(
        &self,
        user: &UserId,
        room: &RoomId,
        mut settings: UserSettings,
        time: Option<String>,
    ) -> Result<(), EngineError> {
        let reply = match time {
            None => notices::notify_status(
                settings
                    .notify_minutes
                    .map(calendar::format_notify_time)
                    .as_deref(),
            ),
            Some(time) => match calendar::parse_notify_time(&time) {
                Some(minutes) => {
                    settings.notify_minutes = Some(minutes);
                    self.settings.put(user, settings).await?;
                    notices::notify_status(Some(&calendar::format_notify_time(minutes)))
                }
                None => notices::invalid_argument(format!(
                    "{} is not a valid time. Please specify it in 24-hour time like: 13:30.",
                    time
                )),
            },
        };
        self.transport.send(room, &reply).await?;
        Ok(())
    }

    async fn set_send_room(
        &self,
        user: &UserId,
        room: &RoomId,
        mut settings: UserSettings,
        room_ref: Option<String>,
    ) -> Result<(), EngineError> {
        let Some(room_ref) = room_ref else {
            self.transport
                .send(room, &notices::send_room_status(settings.send_room.as_ref()))
                .await?;
            return Ok(());
        };

        let send_room = self
            .transport
            .join(&room_ref)
            .await
            .map_err(|source| EngineError::JoinFailed {
                room_ref: room_ref.clone(),
                source,
            })?;
        info!(user = %user, send_room = %send_room, "send room set");
        settings.send_room = Some(send_room.clone());
        self.settings.put(user, settings).await?;
        self.transport
            .send(room, &notices::send_room_status(Some(&send_room)))
            .await?;

        // A pending confirmation now goes somewhere else; ask again
        if let Some(handle) = self.flows.get(user).await {
            let mut flow = handle.lock().await;
            if flow.state == FlowState::Confirm {
                let target = flow_room(&flow, room);
                self.show_confirmation(user, &target, &mut flow, RenderOptions::confirmation(false))
                    .await?;
            }
        }
        Ok(())
    }

    async fn set_threads(
        &self,
        user: &UserId,
        room: &RoomId,
        mut settings: UserSettings,
        mode: Option<String>,
    ) -> Result<(), EngineError> {
        let enabled = match mode.as_deref().map(str::to_lowercase).as_deref() {
            None => None,
            Some("on" | "true" | "yes") => Some(true),
            Some("off" | "false" | "no") => Some(false),
            Some(other) => {
                self.transport
                    .send(
                        room,
                        &notices::invalid_argument(format!(
                            "{} is not a valid thread mode. Use `on` or `off`.",
                            other
                        )),
                    )
                    .await?;
                return Ok(());
            }
        };
        if let Some(enabled) = enabled {
            settings.use_threads = enabled;
            self.settings.put(user, settings.clone()).await?;
        }
        self.transport
            .send(room, &notices::threads_status(settings.use_threads))
            .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Flow state machine
    // -----------------------------------------------------------------------

    /// Discard any existing flow and open the first section of a new one
    pub async fn start(&self, user: &UserId, room: &RoomId) -> Result<(), EngineError> {
        let settings = self.settings.get(user).await?;
        let weekday = self.weekday(&settings);
        let handle = self.flows.handle(user).await;
        let mut flow = handle.lock().await;

        *flow = StandupFlow::new();
        flow.room = Some(room.clone());
        let first = flow_ops::first_state(settings.use_threads, weekday);
        info!(user = %user, flow_id = %flow.flow_id, weekday = %weekday, "new standup flow");

        match first.active_section() {
            Some(section) => self.prompt_section(user, room, &mut flow, section).await,
            None => self.open_threads(user, room, &mut flow, first).await,
        }
    }

    /// Scheduler entry point: prompt the user to write today's post
    pub async fn notify_user(&self, user: &UserId, room: &RoomId) -> Result<(), EngineError> {
        if let Some(handle) = self.flows.get(user).await {
            let state = handle.lock().await.state;
            if !matches!(state, FlowState::Idle | FlowState::Sent) {
                debug!(user = %user, state = %state, "notification skipped");
                self.transport.send(room, &notices::already_writing()).await?;
                return Ok(());
            }
        }
        self.transport.send(room, &notices::time_to_write()).await?;
        self.start(user, room).await
    }

    /// Handle a ✅ reaction. Only reactions on a reactable message count.
    pub async fn advance_on_done_reaction(
        &self,
        user: &UserId,
        room: &RoomId,
        target: &EventId,
    ) -> Result<(), EngineError> {
        let Some(handle) = self.flows.get(user).await else {
            return Ok(());
        };
        let mut flow = handle.lock().await;
        if !flow.is_reactable(target) {
            debug!(user = %user, target = %target, "reaction on non-reactable message ignored");
            return Ok(());
        }
        let room = flow_room(&flow, room);

        // Done with a section re-opened by `edit`
        if flow.state.active_section().is_some() && flow.preview_id.is_some() {
            return self.finish_reedit(user, &room, &mut flow).await;
        }

        let on_preview = flow.preview_id.as_ref() == Some(target);
        match flow_ops::advance(flow.state, on_preview) {
            Advance::Prompt(next) => self.prompt_section(user, &room, &mut flow, next).await,
            Advance::Confirm => {
                self.show_confirmation(user, &room, &mut flow, RenderOptions::confirmation(false))
                    .await?;
                transition(user, &mut flow, FlowState::Confirm);
                Ok(())
            }
            Advance::Send => self.send_post(user, &room, &mut flow).await,
            Advance::ResendEdit => self.resend_edit(user, &room, &mut flow).await,
            Advance::Ignore => Ok(()),
        }
    }

    async fn cancel_on_reaction(
        &self,
        user: &UserId,
        room: &RoomId,
        target: &EventId,
    ) -> Result<(), EngineError> {
        let Some(handle) = self.flows.get(user).await else {
            return Ok(());
        };
        let mut flow = handle.lock().await;
        if !flow.is_reactable(target) || !flow_ops::can_cancel_by_reaction(flow.state) {
            debug!(user = %user, target = %target, state = %flow.state, "cancel reaction ignored");
            return Ok(());
        }
        let room = flow_room(&flow, room);
        self.reset(user, &room, &mut flow).await
    }

    /// `cancel` command: discard the flow from any active state
    pub async fn cancel(&self, user: &UserId, room: &RoomId) -> Result<(), EngineError> {
        let handle = self.flows.get(user).await.ok_or(EngineError::NoFlow("cancel"))?;
        let mut flow = handle.lock().await;
        if flow.is_idle() {
            return Err(EngineError::NoFlow("cancel"));
        }
        self.reset(user, room, &mut flow).await
    }

    async fn reset(
        &self,
        user: &UserId,
        room: &RoomId,
        flow: &mut StandupFlow,
    ) -> Result<(), EngineError> {
        info!(user = %user, flow_id = %flow.flow_id, state = %flow.state, "standup flow cancelled");
        *flow = StandupFlow::new();
        self.transport.send(room, &notices::cancelled()).await?;
        Ok(())
    }

    /// Re-open a section of the current post for new items
    pub async fn edit_request(
        &self,
        user: &UserId,
        room: &RoomId,
        section_name: Option<&str>,
    ) -> Result<(), EngineError> {
        let settings = self.settings.get(user).await?;
        let weekday = self.weekday(&settings);
        let handle = self.flows.get(user).await;
        let mut guard = match &handle {
            Some(h) => Some(h.lock().await),
            None => None,
        };
        let section = flow_ops::check_edit_request(guard.as_deref(), section_name, weekday)?;
        let Some(flow) = guard.as_deref_mut() else {
            return Err(EngineError::NoFlow("edit"));
        };
        let room = flow_room(flow, room);
        self.prompt_section(user, &room, flow, section).await
    }

    /// ✅ after an `edit`: show the post again instead of stepping through
    /// the remaining sections
    async fn finish_reedit(
        &self,
        user: &UserId,
        room: &RoomId,
        flow: &mut StandupFlow,
    ) -> Result<(), EngineError> {
        let already_sent = self
            .load_record(room, user)
            .await?
            .is_some_and(|r| r.flow_id == flow.flow_id);
        if already_sent {
            let preview = self
                .show_confirmation(user, room, flow, RenderOptions::confirmation(true))
                .await?;
            flow.resend_pending_id = Some(preview);
            transition(user, flow, FlowState::Sent);
        } else {
            self.show_confirmation(user, room, flow, RenderOptions::confirmation(false))
                .await?;
            transition(user, flow, FlowState::Confirm);
        }
        Ok(())
    }

    /// A preview of the current post, without the send/cancel footer
    pub async fn render_current(&self, user: &UserId) -> Option<MessageContent> {
        let handle = self.flows.get(user).await?;
        let flow = handle.lock().await;
        if flow.is_idle() {
            return None;
        }
        Some(render_post(user, &flow.items, RenderOptions::preview()))
    }

    // -----------------------------------------------------------------------
    // Collection
    // -----------------------------------------------------------------------

    async fn handle_message(
        &self,
        user: &UserId,
        room: &RoomId,
        event_id: &EventId,
        content: &MessageContent,
    ) -> Result<(), EngineError> {
        let settings = self.settings.get(user).await?;
        if settings.config_room.as_ref() != Some(room) {
            debug!(user = %user, room = %room, "message outside config room ignored");
            return Ok(());
        }
        let Some(handle) = self.flows.get(user).await else {
            return Ok(());
        };
        let mut flow = handle.lock().await;
        let item = StandupItem::from_content(event_id.clone(), content);
        let Some(section) = item_ops::append(&mut flow, item) else {
            debug!(user = %user, state = %flow.state, "no active section, message ignored");
            return Ok(());
        };
        debug!(user = %user, section = %section, event_id = %event_id, "item appended");
        self.transport.react(room, event_id, DONE_KEY).await?;
        flow.add_reactable(event_id.clone());
        Ok(())
    }

    /// Apply an edit of an earlier message to the item it produced
    pub async fn handle_edit_event(
        &self,
        user: &UserId,
        room: &RoomId,
        target: &EventId,
        new_content: &MessageContent,
    ) -> Result<(), EngineError> {
        let Some(handle) = self.flows.get(user).await else {
            return Ok(());
        };
        let mut flow = handle.lock().await;
        if flow.is_idle() {
            return Ok(());
        }
        let Some(section) = item_ops::edit(&mut flow.items, target, new_content) else {
            debug!(user = %user, target = %target, "edit matches no item");
            return Ok(());
        };
        info!(user = %user, section = %section, target = %target, "item edited");
        let room = flow_room(&flow, room);
        self.refresh_preview(user, &room, &mut flow).await
    }

    /// Collect a reply posted in one of the section threads
    pub async fn handle_reply_event(
        &self,
        user: &UserId,
        room: &RoomId,
        event_id: &EventId,
        relates_to: &[&EventId],
        content: &MessageContent,
    ) -> Result<(), EngineError> {
        let Some(handle) = self.flows.get(user).await else {
            return Ok(());
        };
        let mut flow = handle.lock().await;
        if !thread_ops::is_thread_aware(&flow) {
            debug!(user = %user, state = %flow.state, "reply outside thread collection ignored");
            return Ok(());
        }
        let Some(section) = thread_ops::route_reply(&flow, relates_to) else {
            debug!(user = %user, event_id = %event_id, "reply matches no thread");
            return Ok(());
        };

        item_ops::append_to(
            &mut flow.items,
            section,
            StandupItem::from_content(event_id.clone(), content),
        );
        thread_ops::track_reply(&mut flow, section, event_id.clone());
        debug!(user = %user, section = %section, event_id = %event_id, "thread reply collected");

        self.transport.react(room, event_id, DONE_KEY).await?;
        if flow.state.is_threaded_collection() {
            flow.add_reactable(event_id.clone());
        }
        let room = flow_room(&flow, room);
        self.refresh_preview(user, &room, &mut flow).await
    }

    /// Remove the item produced by a retracted message
    pub async fn handle_redaction_event(
        &self,
        user: &UserId,
        room: &RoomId,
        redacts: &EventId,
    ) -> Result<(), EngineError> {
        let Some(handle) = self.flows.get(user).await else {
            return Ok(());
        };
        let mut flow = handle.lock().await;
        if flow.is_idle() {
            return Ok(());
        }
        let Some((section, _)) = item_ops::remove(&mut flow.items, redacts) else {
            debug!(user = %user, redacts = %redacts, "redaction matches no item");
            return Ok(());
        };
        info!(user = %user, section = %section, redacts = %redacts, "item removed");
        flow.reactable_ids.shift_remove(redacts);
        let room = flow_room(&flow, room);
        self.refresh_preview(user, &room, &mut flow).await
    }

    // -----------------------------------------------------------------------
    // Outbound helpers
    // -----------------------------------------------------------------------

    async fn prompt_section(
        &self,
        user: &UserId,
        room: &RoomId,
        flow: &mut StandupFlow,
        section: Section,
    ) -> Result<(), EngineError> {
        let prompt = self
            .transport
            .send(room, &notices::section_prompt(section))
            .await?;
        transition(user, flow, FlowState::collecting(section));
        flow.clear_reactables();
        flow.add_reactable(prompt.clone());
        self.transport.react(room, &prompt, DONE_KEY).await?;
        Ok(())
    }

    async fn open_threads(
        &self,
        user: &UserId,
        room: &RoomId,
        flow: &mut StandupFlow,
        state: FlowState,
    ) -> Result<(), EngineError> {
        let instructions = self
            .transport
            .send(room, &notices::thread_instructions())
            .await?;
        transition(user, flow, state);
        flow.clear_reactables();
        flow.add_reactable(instructions.clone());
        self.transport.react(room, &instructions, DONE_KEY).await?;

        for section in thread_ops::thread_sections(state) {
            let root = self
                .transport
                .send(room, &notices::thread_root(*section))
                .await?;
            thread_ops::record_root(flow, *section, root);
        }
        self.show_confirmation(user, room, flow, RenderOptions::collecting())
            .await?;
        flow.add_reactable(instructions);
        Ok(())
    }

    /// Post a fresh preview with the send/cancel footer, withdrawing the
    /// previous one. The new preview is the only reactable message.
    async fn show_confirmation(
        &self,
        user: &UserId,
        room: &RoomId,
        flow: &mut StandupFlow,
        opts: RenderOptions,
    ) -> Result<EventId, EngineError> {
        if let Some(old) = flow.preview_id.take()
            && let Err(e) = self.transport.redact(room, &old).await
        {
            warn!(user = %user, preview = %old, error = %e, "could not withdraw old preview");
        }
        let content = render_post(user, &flow.items, opts);
        let preview = self.transport.send(room, &content).await?;
        flow.preview_id = Some(preview.clone());
        flow.clear_reactables();
        flow.add_reactable(preview.clone());
        self.transport.react(room, &preview, DONE_KEY).await?;
        if opts.cancellable {
            self.transport.react(room, &preview, CANCEL_KEY).await?;
        }
        Ok(preview)
    }

    /// Bring the visible preview up to date after the items changed
    async fn refresh_preview(
        &self,
        user: &UserId,
        room: &RoomId,
        flow: &mut StandupFlow,
    ) -> Result<(), EngineError> {
        match flow.state {
            FlowState::Confirm | FlowState::Threads | FlowState::ThreadsFriday => {
                let opts = live_preview_options(flow.state);
                let Some(preview) = flow.preview_id.clone() else {
                    self.show_confirmation(user, room, flow, opts).await?;
                    return Ok(());
                };
                let content = render_post(user, &flow.items, opts);
                let edit = self.transport.send_edit(room, &preview, &content).await?;
                debug!(user = %user, preview = %preview, "preview updated in place");
                flow.add_reactable(edit);
            }
            FlowState::Sent => {
                let preview = self
                    .show_confirmation(user, room, flow, RenderOptions::confirmation(true))
                    .await?;
                flow.resend_pending_id = Some(preview);
                debug!(user = %user, "sent post changed, waiting for re-send confirmation");
            }
            _ => {}
        }
        Ok(())
    }

    fn weekday(&self, settings: &UserSettings) -> Weekday {
        calendar::local_weekday(settings.timezone.as_deref(), self.clock.now())
    }
}

/// Where a flow's messages go: the room it was started in, else `fallback`
fn flow_room(flow: &StandupFlow, fallback: &RoomId) -> RoomId {
    flow.room.clone().unwrap_or_else(|| fallback.clone())
}

/// Footer for the live preview: send only while thread replies are still
/// being collected, send or cancel once confirming
fn live_preview_options(state: FlowState) -> RenderOptions {
    if state.is_threaded_collection() {
        RenderOptions::collecting()
    } else {
        RenderOptions::confirmation(false)
    }
}

fn transition(user: &UserId, flow: &mut StandupFlow, state: FlowState) {
    if flow.state != state {
        info!(user = %user, flow_id = %flow.flow_id, from = %flow.state, to = %state, "state transition");
        flow.state = state;
    }
}
