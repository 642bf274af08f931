use serde::{Deserialize, Serialize};

/// A named category of standup content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Yesterday,
    Friday,
    Weekend,
    Today,
    Blockers,
    Notes,
}

/// Canonical section order. Used for reconciliation scans and for display,
/// so the first match and the rendered order are always the same.
pub const SECTION_ORDER: [Section; 6] = [
    Section::Yesterday,
    Section::Friday,
    Section::Weekend,
    Section::Today,
    Section::Blockers,
    Section::Notes,
];

impl Section {
    /// Header label used in prompts, thread roots and rendered posts
    pub fn label(self) -> &'static str {
        match self {
            Section::Yesterday => "Yesterday",
            Section::Friday => "Friday",
            Section::Weekend => "Weekend",
            Section::Today => "Today",
            Section::Blockers => "Blockers",
            Section::Notes => "Notes",
        }
    }

    /// The question asked when collection of this section begins
    pub fn question(self) -> &'static str {
        match self {
            Section::Yesterday => "What did you do yesterday?",
            Section::Friday => "What did you do Friday?",
            Section::Weekend => "What did you do over the weekend?",
            Section::Today => "What are you planning to do today?",
            Section::Blockers => "Do you have any blockers?",
            Section::Notes => "Do you have any other notes?",
        }
    }

    /// Parse a section name (case-insensitive, surrounding whitespace ignored)
    pub fn parse(name: &str) -> Option<Section> {
        let name = name.trim();
        SECTION_ORDER
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(name))
    }

    /// Sections that only exist on the first weekday
    pub fn is_monday_only(self) -> bool {
        matches!(self, Section::Friday | Section::Weekend)
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Section::parse("blockers"), Some(Section::Blockers));
        assert_eq!(Section::parse(" WEEKEND "), Some(Section::Weekend));
        assert_eq!(Section::parse("Today"), Some(Section::Today));
        assert_eq!(Section::parse("tomorrow"), None);
        assert_eq!(Section::parse(""), None);
    }

    #[test]
    fn test_order_is_fixed() {
        let labels: Vec<&str> = SECTION_ORDER.iter().map(|s| s.label()).collect();
        assert_eq!(
            labels,
            vec!["Yesterday", "Friday", "Weekend", "Today", "Blockers", "Notes"]
        );
    }

    #[test]
    fn test_monday_only() {
        assert!(Section::Friday.is_monday_only());
        assert!(Section::Weekend.is_monday_only());
        assert!(!Section::Yesterday.is_monday_only());
        assert!(!Section::Notes.is_monday_only());
    }
}
