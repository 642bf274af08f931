use crate::model::event::EventId;
use crate::model::flow::{FlowState, StandupFlow};
use crate::model::section::Section;

/// Sections that get a thread when a threaded flow opens, in display order
pub fn thread_sections(state: FlowState) -> &'static [Section] {
    match state {
        FlowState::ThreadsFriday => &[
            Section::Friday,
            Section::Weekend,
            Section::Today,
            Section::Blockers,
            Section::Notes,
        ],
        FlowState::Threads => &[
            Section::Yesterday,
            Section::Today,
            Section::Blockers,
            Section::Notes,
        ],
        _ => &[],
    }
}

/// Record the root message that opened a section's thread. Replaces any
/// earlier root for that section.
pub fn record_root(flow: &mut StandupFlow, section: Section, root_id: EventId) {
    flow.thread_roots.insert(section, vec![root_id]);
}

/// Whether replies should currently be collected into sections
pub fn is_thread_aware(flow: &StandupFlow) -> bool {
    !flow.thread_roots.is_empty()
        && matches!(
            flow.state,
            FlowState::Threads | FlowState::ThreadsFriday | FlowState::Confirm | FlowState::Sent
        )
}

/// Match a reply against the known thread messages. `candidates` are the IDs
/// the reply relates to (thread root and/or quoted message); the first one
/// that belongs to a section's thread wins.
pub fn route_reply(flow: &StandupFlow, candidates: &[&EventId]) -> Option<Section> {
    candidates.iter().find_map(|candidate| {
        flow.thread_roots
            .iter()
            .find(|(_, ids)| ids.contains(candidate))
            .map(|(section, _)| *section)
    })
}

/// Track a collected reply so that replies quoting it still match its thread
pub fn track_reply(flow: &mut StandupFlow, section: Section, reply_id: EventId) {
    let ids = flow.thread_roots.entry(section).or_default();
    if !ids.contains(&reply_id) {
        ids.push(reply_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threaded_flow(state: FlowState) -> StandupFlow {
        let mut flow = StandupFlow::new();
        flow.state = state;
        for (i, section) in thread_sections(state).iter().enumerate() {
            record_root(&mut flow, *section, EventId::new(format!("$root{}", i)));
        }
        flow
    }

    #[test]
    fn test_thread_sections_on_monday() {
        assert_eq!(
            thread_sections(FlowState::ThreadsFriday),
            &[
                Section::Friday,
                Section::Weekend,
                Section::Today,
                Section::Blockers,
                Section::Notes
            ]
        );
        assert_eq!(thread_sections(FlowState::Threads)[0], Section::Yesterday);
        assert!(thread_sections(FlowState::Today).is_empty());
    }

    #[test]
    fn test_route_reply_to_root() {
        let flow = threaded_flow(FlowState::Threads);
        let root = EventId::from("$root2");
        assert_eq!(route_reply(&flow, &[&root]), Some(Section::Blockers));
        let unrelated = EventId::from("$other");
        assert_eq!(route_reply(&flow, &[&unrelated]), None);
    }

    #[test]
    fn test_tracked_reply_keeps_matching() {
        let mut flow = threaded_flow(FlowState::Threads);
        let reply = EventId::from("$reply");
        track_reply(&mut flow, Section::Today, reply.clone());
        track_reply(&mut flow, Section::Today, reply.clone());
        assert_eq!(flow.thread_roots[&Section::Today].len(), 2);

        let unrelated = EventId::from("$nope");
        assert_eq!(route_reply(&flow, &[&unrelated, &reply]), Some(Section::Today));
    }

    #[test]
    fn test_thread_awareness() {
        let mut flow = threaded_flow(FlowState::ThreadsFriday);
        assert!(is_thread_aware(&flow));
        flow.state = FlowState::Confirm;
        assert!(is_thread_aware(&flow));
        flow.state = FlowState::Idle;
        assert!(!is_thread_aware(&flow));

        let mut sequential = StandupFlow::new();
        sequential.state = FlowState::Confirm;
        assert!(!is_thread_aware(&sequential));
    }
}
