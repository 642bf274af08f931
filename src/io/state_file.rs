use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::event::UserId;
use crate::model::flow::StandupFlow;
use crate::model::settings::UserSettings;

/// Error type for the saved state file
#[derive(Debug, thiserror::Error)]
pub enum StateFileError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not serialize state: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Flows and settings saved across restarts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedState {
    #[serde(default)]
    pub flows: BTreeMap<UserId, StandupFlow>,
    #[serde(default)]
    pub settings: BTreeMap<UserId, UserSettings>,
}

/// Read the state file. A missing file is `Ok(None)`.
pub fn read_state(path: &Path) -> Result<Option<SavedState>, StateFileError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| StateFileError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let state = serde_json::from_str(&content).map_err(|e| StateFileError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(Some(state))
}

/// Write the state file atomically (temp file in the same directory, then
/// rename).
pub fn write_state(path: &Path, state: &SavedState) -> Result<(), StateFileError> {
    let content = serde_json::to_string_pretty(state)?;
    let write_err = |e: std::io::Error| StateFileError::WriteError {
        path: path.to_path_buf(),
        source: e,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::flow::FlowState;
    use crate::model::item::StandupItem;
    use crate::model::section::Section;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let user = UserId::from("@alice:x");
        let mut flow = StandupFlow::new();
        flow.state = FlowState::Blockers;
        flow.items
            .items_mut(Section::Today)
            .push(StandupItem::new("$1".into(), "Ship it".into(), None));
        let mut state = SavedState::default();
        state.flows.insert(user.clone(), flow);
        state.settings.insert(
            user.clone(),
            UserSettings {
                send_room: Some("!team:x".into()),
                ..Default::default()
            },
        );

        write_state(&path, &state).unwrap();
        assert_eq!(read_state(&path).unwrap(), Some(state));
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_state(&dir.path().join("nope.json")).unwrap().is_none());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json {{{").unwrap();
        assert!(matches!(
            read_state(&path),
            Err(StateFileError::ParseError { .. })
        ));
    }
}
