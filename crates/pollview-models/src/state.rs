use crate::user::UserId;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Pagination state of one answer's voter list, detached from any live
/// controller so it can outlive a results-view close/reopen cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedListState {
    /// Ids of the rows that were visible, in display order.
    pub rows: Vec<UserId>,
    /// Continuation cursor for the next fetch; empty means start-of-data.
    pub offset: String,
    /// Cursor value the preload buffer was committed for.
    pub load_for_offset: String,
    pub left_to_load: i32,
    pub full_count: i32,
    /// Ids fetched ahead of demand but not yet shown.
    pub preloaded: Vec<UserId>,
    /// Whether a fetch was in flight when the state was captured.
    pub was_loading: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct SavedSection {
    option: Bytes,
    state: SavedListState,
}

/// Saved pagination states for a whole results view, keyed by the answer
/// option each section was built for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsMemento {
    sections: Vec<SavedSection>,
}

impl ResultsMemento {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `state` under `option`, replacing any earlier entry.
    pub fn insert(&mut self, option: Bytes, state: SavedListState) {
        self.take(&option);
        self.sections.push(SavedSection { option, state });
    }

    /// Removes and returns the state saved under `option`, if any.
    pub fn take(&mut self, option: &[u8]) -> Option<SavedListState> {
        let index = self.sections.iter().position(|s| s.option == option)?;
        Some(self.sections.remove(index).state)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }
}
