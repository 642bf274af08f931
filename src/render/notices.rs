use crate::model::event::{DONE_KEY, MessageContent, RoomId};
use crate::model::section::Section;

// ---------------------------------------------------------------------------
// Collection prompts
// ---------------------------------------------------------------------------

/// The question that opens a section in sequential mode
pub fn section_prompt(section: Section) -> MessageContent {
    MessageContent::text(format!(
        "{} *Enter one item per message. React with {} when done.*",
        section.question(),
        DONE_KEY
    ))
    .with_rich(format!(
        "{} <i>Enter one item per message. React with {} when done.</i>",
        section.question(),
        DONE_KEY
    ))
}

/// The instruction message posted before the thread roots
pub fn thread_instructions() -> MessageContent {
    MessageContent::text(
        "**Fill out the standup post by replying in each thread.** *Enter one item per message.*",
    )
    .with_rich(
        "<b>Fill out the standup post by replying in each thread.</b> <i>Enter one item per message.</i>",
    )
}

/// The root message of a section's thread
pub fn thread_root(section: Section) -> MessageContent {
    MessageContent::text(format!("**{}** (thread)", section.label()))
        .with_rich(format!("<b>{}</b> <i>(thread)</i>", section.label()))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

pub fn time_to_write() -> MessageContent {
    MessageContent::notice("Time to write your standup post!")
}

pub fn already_writing() -> MessageContent {
    MessageContent::notice(
        "Looks like you are already writing a standup post! If you want to start over, type `!standupbot new`",
    )
    .with_rich(
        "Looks like you are already writing a standup post! If you want to start over, type <code>!standupbot new</code>",
    )
}

pub fn cancelled() -> MessageContent {
    MessageContent::notice("Standup post cancelled")
}

pub fn sent_to(room: &RoomId, is_edit: bool) -> MessageContent {
    let edit = if is_edit { " edit" } else { "" };
    MessageContent::text(format!("Sent standup post{} to {}", edit, room))
}

pub fn failed_to_send(room: &RoomId, is_edit: bool) -> MessageContent {
    let edit = if is_edit { " edit" } else { "" };
    MessageContent::text(format!("Failed to send standup post{} to {}", edit, room))
}

pub fn redacted(message_id: &str) -> MessageContent {
    MessageContent::notice(format!("Redacted standup post with ID: {}", message_id))
}

pub fn timezone_status(timezone: Option<&str>) -> MessageContent {
    match timezone {
        Some(tz) => MessageContent::notice(format!("Timezone is set to {}", tz)),
        None => MessageContent::notice("Timezone is not set"),
    }
}

pub fn notify_status(time: Option<&str>) -> MessageContent {
    match time {
        Some(t) => MessageContent::notice(format!("Notification time set to {}", t)),
        None => MessageContent::notice("Notification time is not set"),
    }
}

pub fn send_room_status(room: Option<&RoomId>) -> MessageContent {
    match room {
        Some(r) => MessageContent::notice(format!("Send room is set to {}", r)),
        None => MessageContent::notice("Send room is not set"),
    }
}

pub fn threads_status(enabled: bool) -> MessageContent {
    let mode = if enabled { "enabled" } else { "disabled" };
    MessageContent::notice(format!("Thread mode is {}", mode))
}

/// Reply to an argument that could not be understood
pub fn invalid_argument(text: impl Into<String>) -> MessageContent {
    MessageContent::notice(text)
}

// ---------------------------------------------------------------------------
// Help
// ---------------------------------------------------------------------------

const COMMANDS: [(&str, &str); 11] = [
    ("new", "prepare a new standup post"),
    ("show", "show the current standup post"),
    (
        "edit [Friday|Weekend|Yesterday|Today|Blockers|Notes]",
        "edit the given section of the standup post",
    ),
    ("cancel", "cancel the current standup post"),
    ("undo", "undo sending the current standup post to the send room"),
    ("help", "show this help"),
    ("vanquish", "tell the bot to leave the room"),
    (
        "tz [timezone]",
        "show or set the timezone to use for configuring notifications",
    ),
    (
        "notify [time]",
        "show or set the time at which the standup notification will be sent",
    ),
    (
        "room [room alias or ID]",
        "show or set the room where your standup post will be sent",
    ),
    (
        "threads [on|off]",
        "show or set whether sections are collected in threads",
    ),
];

/// The command list
pub fn help() -> MessageContent {
    let version = env!("CARGO_PKG_VERSION");
    let plain: Vec<String> = COMMANDS
        .iter()
        .map(|(cmd, desc)| format!("* {} -- {}", cmd, desc))
        .collect();
    let rich: String = COMMANDS
        .iter()
        .map(|(cmd, desc)| format!("<li><b>{}</b> &mdash; {}</li>", cmd, desc))
        .collect();
    MessageContent::notice(format!(
        "COMMANDS:\n{}\n\nVersion {}.",
        plain.join("\n"),
        version
    ))
    .with_rich(format!(
        "<b>COMMANDS:</b>\n<ul>\n{}\n</ul>\n\nVersion {}.",
        rich, version
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::event::MessageKind;

    #[test]
    fn test_section_prompt() {
        let prompt = section_prompt(Section::Yesterday);
        assert_eq!(
            prompt.plain,
            "What did you do yesterday? *Enter one item per message. React with ✅ when done.*"
        );
        assert_eq!(prompt.kind, MessageKind::Text);
    }

    #[test]
    fn test_thread_root() {
        let root = thread_root(Section::Blockers);
        assert_eq!(root.plain, "**Blockers** (thread)");
        assert_eq!(root.rich.as_deref(), Some("<b>Blockers</b> <i>(thread)</i>"));
    }

    #[test]
    fn test_help_lists_every_command() {
        let help = help();
        for (cmd, _) in COMMANDS {
            assert!(help.plain.contains(&format!("* {} --", cmd)));
        }
        assert_eq!(help.kind, MessageKind::Notice);
    }

    #[test]
    fn test_send_notices() {
        let room = RoomId::from("!team:example.org");
        assert_eq!(sent_to(&room, false).plain, "Sent standup post to !team:example.org");
        assert_eq!(
            failed_to_send(&room, true).plain,
            "Failed to send standup post edit to !team:example.org"
        );
    }
}
