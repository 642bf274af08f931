use chrono::Weekday;

use crate::model::flow::{FlowState, StandupFlow};
use crate::model::section::Section;

/// Why an `edit <section>` request was refused. The messages are shown to
/// the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditRequestError {
    #[error(
        "Invalid item to edit! Must be one of Friday, Weekend, Yesterday, Today, Blockers, or Notes"
    )]
    MissingSection,
    #[error("{0} is not a section. Must be one of Friday, Weekend, Yesterday, Today, Blockers, or Notes")]
    UnknownSection(String),
    #[error("No standup post to edit.")]
    NoFlow,
    #[error("You are using threads. Edit your standup post by replying in the section threads.")]
    Threaded,
    #[error("It's not Monday, so you can't go back to edit {}.", monday_only_target(.0))]
    NotMonday(Section),
    #[error("It's Monday, so you can't go back to edit yesterday. Edit Friday or Weekend instead.")]
    IsMonday,
}

fn monday_only_target(section: &Section) -> &'static str {
    match section {
        Section::Weekend => "the weekend",
        _ => "Friday",
    }
}

/// What a ✅ reaction does in the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Open the next section with a new prompt
    Prompt(Section),
    /// Show the confirmation preview and wait in `Confirm`
    Confirm,
    /// Post to the send room
    Send,
    /// Re-post the current content as an edit of the sent post
    ResendEdit,
    /// Nothing to do
    Ignore,
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// The state a fresh flow starts in
pub fn first_state(use_threads: bool, weekday: Weekday) -> FlowState {
    let monday = weekday == Weekday::Mon;
    match (use_threads, monday) {
        (true, true) => FlowState::ThreadsFriday,
        (true, false) => FlowState::Threads,
        (false, true) => FlowState::Friday,
        (false, false) => FlowState::Yesterday,
    }
}

/// Sequential section order: Yesterday/Friday/Weekend → Today → Blockers → Notes
pub fn next_section(section: Section) -> Option<Section> {
    match section {
        Section::Friday => Some(Section::Weekend),
        Section::Yesterday | Section::Weekend => Some(Section::Today),
        Section::Today => Some(Section::Blockers),
        Section::Blockers => Some(Section::Notes),
        Section::Notes => None,
    }
}

/// Decide what a ✅ reaction does.
///
/// `on_preview` is true when the reaction targets the live preview, which in
/// thread mode carries the send/cancel footer.
pub fn advance(state: FlowState, on_preview: bool) -> Advance {
    match state {
        FlowState::Idle => Advance::Ignore,
        FlowState::Threads | FlowState::ThreadsFriday => {
            if on_preview {
                Advance::Send
            } else {
                Advance::Confirm
            }
        }
        FlowState::Confirm => Advance::Send,
        FlowState::Sent => Advance::ResendEdit,
        collecting => match collecting.active_section().and_then(next_section) {
            Some(next) => Advance::Prompt(next),
            None => Advance::Confirm,
        },
    }
}

/// Whether the ❌ reaction (or the state of the flow) allows cancelling
pub fn can_cancel_by_reaction(state: FlowState) -> bool {
    state.is_terminal()
}

/// Validate an `edit <section>` request against the flow and the user's
/// current local weekday.
pub fn check_edit_request(
    flow: Option<&StandupFlow>,
    section_name: Option<&str>,
    weekday: Weekday,
) -> Result<Section, EditRequestError> {
    let name = section_name.ok_or(EditRequestError::MissingSection)?;
    let section =
        Section::parse(name).ok_or_else(|| EditRequestError::UnknownSection(name.to_string()))?;

    let flow = flow
        .filter(|f| !f.is_idle())
        .ok_or(EditRequestError::NoFlow)?;
    if flow.is_threaded() {
        return Err(EditRequestError::Threaded);
    }

    let monday = weekday == Weekday::Mon;
    if section.is_monday_only() && !monday {
        return Err(EditRequestError::NotMonday(section));
    }
    if section == Section::Yesterday && monday {
        return Err(EditRequestError::IsMonday);
    }
    Ok(section)
}
