//! Bounded, deduplicated undo history of whole-document snapshots.
//!
//! History is a linear sequence of [`Snapshot`]s plus a cursor. Snapshots
//! are created only by explicit commits; live keystroke edits go through
//! [`History::amend`], which rewrites the current slot instead of growing
//! the sequence, keeping undo granularity at the level of discrete user
//! intentions.
//!
//! Restores are modelled as an explicit state: between [`History::begin_undo`]
//! and [`History::finish_restore`], commits are suppressed. The write-through
//! persistence of a restored document therefore cannot feed back into history
//! as a new edit.

use std::sync::Arc;

use crate::models::{Project, SectionNode};

/// Maximum number of snapshots retained per project.
pub const DEFAULT_CAPACITY: usize = 50;

/// An immutable full copy of a project's editable state at one commit point.
///
/// Holds the section forest plus the scalar fields needed to restore it.
/// Cloning is cheap: the forest is `Arc`-shared, not deep-copied.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub title: String,
    pub context: String,
    pub sections: Vec<Arc<SectionNode>>,
}

impl Snapshot {
    pub fn of(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            context: project.context.clone(),
            sections: project.sections.clone(),
        }
    }

    /// Restore this snapshot's state into a live project.
    pub fn restore_into(&self, project: &mut Project) {
        project.title = self.title.clone();
        project.context = self.context.clone();
        project.sections = self.sections.clone();
    }
}

/// The outcome of a commit or amend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// Appended as the new head of history.
    Appended,
    /// Rewrote the snapshot under the cursor without growing history.
    Amended,
    /// Equal to the current head; history unchanged.
    Unchanged,
    /// A restore is in progress; the commit was ignored.
    Suppressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Restoring,
}

/// Bounded snapshot history with a cursor.
#[derive(Debug)]
pub struct History {
    snapshots: Vec<Snapshot>,
    cursor: usize,
    capacity: usize,
    state: State,
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            cursor: 0,
            capacity: capacity.max(1),
            state: State::Idle,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn is_restoring(&self) -> bool {
        self.state == State::Restoring
    }

    /// Record a committing edit.
    ///
    /// Discards any redo branch past the cursor, dedups against the head
    /// (committing an identical snapshot leaves history untouched), appends,
    /// and evicts the oldest snapshot once capacity is exceeded.
    pub fn commit(&mut self, snapshot: Snapshot) -> Commit {
        if self.state == State::Restoring {
            return Commit::Suppressed;
        }

        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.cursor + 1);
        }

        if self.snapshots.last() == Some(&snapshot) {
            self.cursor = self.snapshots.len() - 1;
            return Commit::Unchanged;
        }

        self.snapshots.push(snapshot);
        if self.snapshots.len() > self.capacity {
            self.snapshots.remove(0);
        }
        self.cursor = self.snapshots.len() - 1;
        Commit::Appended
    }

    /// Rewrite the snapshot under the cursor in place.
    ///
    /// This is the keystroke-debounce path: intermediate edits keep the
    /// current slot up to date without growing history. Amending also
    /// discards any redo branch, and on empty history it behaves as a
    /// first commit.
    pub fn amend(&mut self, snapshot: Snapshot) -> Commit {
        if self.state == State::Restoring {
            return Commit::Suppressed;
        }
        if self.snapshots.is_empty() {
            return self.commit(snapshot);
        }
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots[self.cursor] = snapshot;
        Commit::Amended
    }

    /// Step the cursor back and hand out the snapshot to restore.
    ///
    /// Returns `None` when there is nothing to undo (cursor at the oldest
    /// retained snapshot) or when a restore is already in progress; state is
    /// unchanged in both cases. On success the history enters the restoring
    /// state, and the caller must call [`History::finish_restore`] after the
    /// restored state has fully propagated, including the persistence write.
    pub fn begin_undo(&mut self) -> Option<Snapshot> {
        if self.state == State::Restoring || self.cursor == 0 || self.snapshots.is_empty() {
            return None;
        }
        self.cursor -= 1;
        self.state = State::Restoring;
        Some(self.snapshots[self.cursor].clone())
    }

    /// Leave the restoring state; commits are accepted again.
    pub fn finish_restore(&mut self) {
        self.state = State::Idle;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
