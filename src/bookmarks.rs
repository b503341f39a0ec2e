use crate::catalog::{Catalog, ToolId, ToolRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookmarkState {
    Unsaved,
    Saved,
}

impl BookmarkState {
    pub fn toggled(self) -> Self {
        match self {
            BookmarkState::Unsaved => BookmarkState::Saved,
            BookmarkState::Saved => BookmarkState::Unsaved,
        }
    }
}

/// Tools saved during one browsing session.
///
/// Lives exactly as long as its session and is never shared between
/// sessions. Every tool starts out `Unsaved`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkSet {
    saved: HashSet<ToolId>,
}

impl BookmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, id: ToolId) -> BookmarkState {
        if self.is_saved(id) {
            BookmarkState::Saved
        } else {
            BookmarkState::Unsaved
        }
    }

    pub fn is_saved(&self, id: ToolId) -> bool {
        self.saved.contains(&id)
    }

    /// Returns false if the tool was already saved.
    pub fn save(&mut self, id: ToolId) -> bool {
        self.saved.insert(id)
    }

    /// Returns false if the tool was not saved.
    pub fn unsave(&mut self, id: ToolId) -> bool {
        self.saved.remove(&id)
    }

    /// Flip the tool's state and return the new one.
    pub fn toggle(&mut self, id: ToolId) -> BookmarkState {
        let next = self.state(id).toggled();
        match next {
            BookmarkState::Saved => self.save(id),
            BookmarkState::Unsaved => self.unsave(id),
        };
        next
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    /// Saved tools in catalog order. Ids missing from `catalog` are skipped.
    pub fn saved<'a>(&self, catalog: &'a Catalog) -> Vec<&'a ToolRecord> {
        if self.is_empty() {
            return vec![];
        }

        let mut ids = self.saved.iter().copied().collect::<Vec<_>>();
        ids.sort();
        ids.into_iter().filter_map(|id| catalog.get(id)).collect()
    }
}
