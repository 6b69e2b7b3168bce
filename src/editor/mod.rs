//! The editing engine.
//!
//! An [`Editor`] owns the live [`Project`], its undo [`History`], and a
//! handle to the persisted [`Store`]. Every committing edit follows the same
//! path: mutate the tree, snapshot into history, write through to the store.
//! Live (keystroke) edits amend the current history slot instead and skip
//! the store write, so undo stays at the granularity of user intentions.
//!
//! Undo restores a snapshot into the live project and then persists it. The
//! persistence write happens while the history is in its restoring state, so
//! it cannot be recorded as a new edit: the feedback loop between undo and
//! write-through is broken structurally, not by callback ordering.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use crate::history::{History, Snapshot};
use crate::models::*;
use crate::outline;
use crate::store::Store;
use crate::tree;

pub struct Editor {
    project: Project,
    history: History,
    store: Store,
}

impl Editor {
    /// Load a project from the store and seed history with its current
    /// state, so a freshly opened project has nothing to undo into.
    pub fn open(store: Store, project_id: Uuid) -> Result<Option<Self>> {
        let Some(project) = store.get_project(project_id)? else {
            return Ok(None);
        };
        let mut history = History::new();
        history.commit(Snapshot::of(&project));
        Ok(Some(Self {
            project,
            history,
            store,
        }))
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Snapshot the live state and write it through to the store.
    fn commit_and_persist(&mut self) -> Result<()> {
        self.project.updated_at = Utc::now();
        self.history.commit(Snapshot::of(&self.project));
        self.store.put_project(&self.project)
    }

    // ============================================================
    // Project metadata
    // ============================================================

    /// Apply a metadata update (title, context, settings). Committing.
    pub fn update_meta(&mut self, input: UpdateProjectInput) -> Result<&Project> {
        if let Some(title) = input.title {
            self.project.title = title;
        }
        if let Some(context) = input.context {
            self.project.context = context;
        }
        if let Some(team) = input.team {
            self.project.team = Some(team);
        }
        if let Some(institution) = input.institution {
            self.project.institution = Some(institution);
        }
        if let Some(settings) = input.settings {
            self.project.settings = settings;
        }
        self.commit_and_persist()?;
        Ok(&self.project)
    }

    // ============================================================
    // Section operations
    // ============================================================

    pub fn find_section(&self, id: Uuid) -> Option<Arc<SectionNode>> {
        tree::find(&self.project.sections, id)
    }

    pub fn numbering(&self, id: Uuid) -> Option<String> {
        tree::numbering(&self.project.sections, id)
    }

    /// Insert a new section. Returns `None` when the parent id is missing.
    /// Committing.
    pub fn insert_section(
        &mut self,
        input: CreateSectionInput,
    ) -> Result<Option<Arc<SectionNode>>> {
        let now = Utc::now();
        let prompt = match input.prompt {
            Some(prompt) => prompt,
            None => outline::default_prompt(&input.name, &self.project),
        };
        let node = SectionNode::new(&input.name, prompt, now);
        let id = node.id;

        let Some(sections) =
            tree::insert(&self.project.sections, input.parent_id, node, input.position, now)
        else {
            return Ok(None);
        };
        self.project.sections = sections;
        self.commit_and_persist()?;
        Ok(self.find_section(id))
    }

    /// Patch a section. Returns `None` when the id is missing.
    ///
    /// `commit` selects the edit's weight: `true` appends a history snapshot
    /// and writes through; `false` is a live keystroke edit that amends the
    /// current slot and defers persistence to the next commit point.
    pub fn update_section(
        &mut self,
        id: Uuid,
        patch: &SectionPatch,
        commit: bool,
    ) -> Result<Option<Arc<SectionNode>>> {
        let now = Utc::now();
        let Some(sections) = tree::update(&self.project.sections, id, patch, now) else {
            return Ok(None);
        };
        self.project.sections = sections;
        if commit {
            self.commit_and_persist()?;
        } else {
            self.history.amend(Snapshot::of(&self.project));
        }
        Ok(self.find_section(id))
    }

    /// Delete a section and its whole subtree. Returns `false` when the id
    /// is missing. Committing.
    pub fn delete_section(&mut self, id: Uuid) -> Result<bool> {
        let now = Utc::now();
        let Some(sections) = tree::delete(&self.project.sections, id, now) else {
            return Ok(false);
        };
        self.project.sections = sections;
        self.commit_and_persist()?;
        Ok(true)
    }

    // ============================================================
    // Outline replacement and generated content
    // ============================================================

    /// Replace the whole section tree with a converted outline. Committing.
    ///
    /// Callers validate first (see [`crate::outline::validate()`]); a rejected
    /// outline never reaches this method, leaving project and history
    /// untouched.
    pub fn replace_outline(&mut self, validated: &[OutlineNode]) -> Result<&Project> {
        self.project.sections = outline::convert(validated, &self.project);
        self.commit_and_persist()?;
        Ok(&self.project)
    }

    /// Store generator output verbatim as a section's content and stamp
    /// `last_generated_at`, the only path that sets it. Committing.
    pub fn set_generated_content(
        &mut self,
        id: Uuid,
        content: String,
    ) -> Result<Option<Arc<SectionNode>>> {
        let patch = SectionPatch {
            content: Some(content),
            last_generated_at: Some(Utc::now()),
            ..Default::default()
        };
        self.update_section(id, &patch, true)
    }

    // ============================================================
    // Undo
    // ============================================================

    /// Step back one snapshot. Returns `false` when there is nothing to
    /// undo. The store write of the restored state happens while history is
    /// restoring, so it cannot re-enter as a new commit.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(snapshot) = self.history.begin_undo() else {
            return Ok(false);
        };
        snapshot.restore_into(&mut self.project);
        self.project.updated_at = Utc::now();
        let written = self.store.put_project(&self.project);
        // Leave the restoring state even if the write failed, or the
        // session would refuse every later commit.
        self.history.finish_restore();
        written?;
        Ok(true)
    }
}
