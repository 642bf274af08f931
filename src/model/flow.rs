use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event::{EventId, RoomId};
use super::item::StandupItem;
use super::section::{SECTION_ORDER, Section};

/// Where a flow is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    /// No post in progress
    Idle,
    Yesterday,
    Friday,
    Weekend,
    Today,
    Blockers,
    Notes,
    /// Thread mode: every section collected in parallel threads
    Threads,
    /// Thread mode on the first weekday (Friday + Weekend instead of Yesterday)
    ThreadsFriday,
    /// Waiting for the user to send or cancel
    Confirm,
    /// Posted to the send room
    Sent,
}

impl FlowState {
    /// The collection state for a section
    pub fn collecting(section: Section) -> FlowState {
        match section {
            Section::Yesterday => FlowState::Yesterday,
            Section::Friday => FlowState::Friday,
            Section::Weekend => FlowState::Weekend,
            Section::Today => FlowState::Today,
            Section::Blockers => FlowState::Blockers,
            Section::Notes => FlowState::Notes,
        }
    }

    /// The section accepting plain appends in this state (sequential mode only)
    pub fn active_section(self) -> Option<Section> {
        match self {
            FlowState::Yesterday => Some(Section::Yesterday),
            FlowState::Friday => Some(Section::Friday),
            FlowState::Weekend => Some(Section::Weekend),
            FlowState::Today => Some(Section::Today),
            FlowState::Blockers => Some(Section::Blockers),
            FlowState::Notes => Some(Section::Notes),
            _ => None,
        }
    }

    pub fn is_threaded_collection(self) -> bool {
        matches!(self, FlowState::Threads | FlowState::ThreadsFriday)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, FlowState::Confirm | FlowState::Sent)
    }
}

impl std::fmt::Display for FlowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FlowState::Idle => "idle",
            FlowState::Yesterday => "yesterday",
            FlowState::Friday => "friday",
            FlowState::Weekend => "weekend",
            FlowState::Today => "today",
            FlowState::Blockers => "blockers",
            FlowState::Notes => "notes",
            FlowState::Threads => "threads",
            FlowState::ThreadsFriday => "threads_friday",
            FlowState::Confirm => "confirm",
            FlowState::Sent => "sent",
        };
        write!(f, "{}", name)
    }
}

/// Ordered per-section item lists. Every section in [`SECTION_ORDER`] is
/// always present (possibly empty), in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStore {
    sections: IndexMap<Section, Vec<StandupItem>>,
}

impl Default for ItemStore {
    fn default() -> Self {
        ItemStore {
            sections: SECTION_ORDER.iter().map(|s| (*s, Vec::new())).collect(),
        }
    }
}

impl ItemStore {
    /// Items in a section, in insertion order
    pub fn items(&self, section: Section) -> &[StandupItem] {
        self.sections.get(&section).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mutable item list for a section
    pub fn items_mut(&mut self, section: Section) -> &mut Vec<StandupItem> {
        self.sections.entry(section).or_default()
    }

    /// Iterate sections in canonical order, including empty ones
    pub fn iter(&self) -> impl Iterator<Item = (Section, &[StandupItem])> {
        SECTION_ORDER.into_iter().map(|s| (s, self.items(s)))
    }

    /// Iterate only sections that have items, in canonical order
    pub fn non_empty(&self) -> impl Iterator<Item = (Section, &[StandupItem])> {
        self.iter().filter(|(_, items)| !items.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.sections.values().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }
}

/// Per-section event IDs that identify a collection thread in thread mode.
/// The first ID of each section is the thread root; replies are appended so
/// that sub-replies keep matching.
pub type ThreadRoots = IndexMap<Section, Vec<EventId>>;

/// One user's standup post and its collection state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandupFlow {
    /// Minted on every `new`; distinguishes this flow from an earlier sent one
    pub flow_id: Uuid,
    pub state: FlowState,
    /// Room the flow's prompts and previews are posted in
    #[serde(default)]
    pub room: Option<RoomId>,
    #[serde(default)]
    pub items: ItemStore,
    /// Messages that currently accept a control reaction
    #[serde(default)]
    pub reactable_ids: IndexSet<EventId>,
    /// The live preview / confirmation message, if one is shown
    #[serde(default)]
    pub preview_id: Option<EventId>,
    #[serde(default)]
    pub thread_roots: ThreadRoots,
    /// Confirmation prompt for re-sending an edit of an already sent post
    #[serde(default)]
    pub resend_pending_id: Option<EventId>,
}

impl Default for StandupFlow {
    fn default() -> Self {
        StandupFlow::new()
    }
}

impl StandupFlow {
    /// A blank, idle flow with a freshly minted flow ID
    pub fn new() -> Self {
        StandupFlow {
            flow_id: Uuid::new_v4(),
            state: FlowState::Idle,
            room: None,
            items: ItemStore::default(),
            reactable_ids: IndexSet::new(),
            preview_id: None,
            thread_roots: ThreadRoots::new(),
            resend_pending_id: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == FlowState::Idle
    }

    /// Whether this flow collects through threads
    pub fn is_threaded(&self) -> bool {
        self.state.is_threaded_collection() || !self.thread_roots.is_empty()
    }

    pub fn is_reactable(&self, id: &EventId) -> bool {
        self.reactable_ids.contains(id)
    }

    pub fn add_reactable(&mut self, id: EventId) {
        self.reactable_ids.insert(id);
    }

    pub fn clear_reactables(&mut self) {
        self.reactable_ids.clear();
    }
}
