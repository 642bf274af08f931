use crate::model::event::{EventId, MessageContent};
use crate::model::flow::{ItemStore, StandupFlow};
use crate::model::item::StandupItem;
use crate::model::section::{SECTION_ORDER, Section};

// ---------------------------------------------------------------------------
// Append
// ---------------------------------------------------------------------------

/// Append an item to the section that is currently collecting.
/// Returns the section it went into, or None when the flow has no active
/// section (the item is dropped).
pub fn append(flow: &mut StandupFlow, item: StandupItem) -> Option<Section> {
    let section = flow.state.active_section()?;
    flow.items.items_mut(section).push(item);
    Some(section)
}

/// Append an item to a specific section regardless of state (thread replies).
pub fn append_to(store: &mut ItemStore, section: Section, item: StandupItem) {
    store.items_mut(section).push(item);
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Replace the text of the first item whose origin matches `origin_id`,
/// scanning sections in canonical order. Returns the section that held it.
pub fn edit(store: &mut ItemStore, origin_id: &EventId, new_content: &MessageContent) -> Option<Section> {
    for section in SECTION_ORDER {
        if let Some(item) = store
            .items_mut(section)
            .iter_mut()
            .find(|i| &i.origin_id == origin_id)
        {
            item.plain_text = new_content.plain.clone();
            item.rich_text = new_content.rich.clone().filter(|r| !r.is_empty());
            return Some(section);
        }
    }
    None
}

/// Remove the first item whose origin matches `origin_id`, scanning sections
/// in canonical order. Returns the section and the removed item.
pub fn remove(store: &mut ItemStore, origin_id: &EventId) -> Option<(Section, StandupItem)> {
    for section in SECTION_ORDER {
        let items = store.items_mut(section);
        if let Some(idx) = items.iter().position(|i| &i.origin_id == origin_id) {
            return Some((section, items.remove(idx)));
        }
    }
    None
}
