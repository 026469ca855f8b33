use serde::Serialize;

use super::domain::{EntryId, TechStackEntry};

/// Ordered tech-stack field array.
///
/// Identifiers are assigned at append time and follow their entry through removals and
/// moves. The first slot is permanent: it cannot be removed, and an empty sequence is
/// presented as a single blank slot at index 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechStack {
    entries: Vec<TechStackEntry>,
}

impl Default for TechStack {
    fn default() -> Self {
        Self {
            entries: vec![TechStackEntry::blank()],
        }
    }
}

/// Display projection of one tech-stack input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechStackSlot {
    pub index: usize,
    /// `None` for the fallback slot shown over an empty sequence.
    pub id: Option<EntryId>,
    pub value: String,
    pub removable: bool,
}

impl TechStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TechStackEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of inputs the host renders. Never less than one.
    pub fn slot_count(&self) -> usize {
        self.entries.len().max(1)
    }

    pub fn value_at(&self, index: usize) -> Option<&str> {
        match self.entries.get(index) {
            Some(entry) => Some(entry.value.as_str()),
            None if index == 0 => Some(""),
            None => None,
        }
    }

    pub fn append(&mut self) -> EntryId {
        let entry = TechStackEntry::blank();
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    /// Removes the entry at `index`. Index 0 and out-of-range indices are left alone.
    pub fn remove(&mut self, index: usize) -> Option<TechStackEntry> {
        if index == 0 || index >= self.entries.len() {
            return None;
        }
        Some(self.entries.remove(index))
    }

    /// Moves the entry at `from` so it ends up at `to`. Returns false when either index
    /// is out of range.
    pub fn move_entry(&mut self, from: usize, to: usize) -> bool {
        let len = self.entries.len();
        if from >= len || to >= len {
            return false;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        true
    }

    /// Writes the text of the slot at `index`.
    ///
    /// Writing to the fallback slot of an empty sequence materializes an entry with a
    /// fresh identifier, so an empty sequence behaves exactly like a one-blank-entry one.
    pub fn set_value(&mut self, index: usize, value: String) -> Option<EntryId> {
        if self.entries.is_empty() && index == 0 {
            self.entries.push(TechStackEntry::blank());
        }
        let entry = self.entries.get_mut(index)?;
        entry.value = value;
        Some(entry.id)
    }

    pub fn replace(&mut self, entries: Vec<TechStackEntry>) {
        self.entries = entries;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn slots(&self) -> Vec<TechStackSlot> {
        if self.entries.is_empty() {
            return vec![TechStackSlot {
                index: 0,
                id: None,
                value: String::new(),
                removable: false,
            }];
        }

        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| TechStackSlot {
                index,
                id: Some(entry.id),
                value: entry.value.clone(),
                removable: index > 0,
            })
            .collect()
    }

    /// Entries as they are submitted. The fallback slot contributes a blank entry.
    pub fn submitted_entries(&self) -> Vec<TechStackEntry> {
        if self.entries.is_empty() {
            return vec![TechStackEntry::blank()];
        }
        self.entries.clone()
    }
}

/// Index an entry ends up at after `move_entry(from, to)`, for an entry previously at `index`.
pub(crate) fn index_after_move(index: usize, from: usize, to: usize) -> usize {
    if index == from {
        return to;
    }
    let without = if index > from { index - 1 } else { index };
    if without >= to {
        without + 1
    } else {
        without
    }
}
