//! Editor service - workspace operations over the persisted collection
//!
//! Project-level operations (new, rename, delete) write through the
//! repository immediately. File-level edits only touch the open project in
//! memory and arm the autosave timer; the collection is rewritten when the
//! timer fires or on a manual save.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use crate::domain::file_tree::{self, FolderView};
use crate::domain::result::Error;
use crate::domain::{Project, SaveState, Workspace};
use crate::ports::{PreviewResult, PreviewSandbox, SandboxBundle};
use crate::services::autosave::AutosaveTimer;
use crate::services::logging::{record, LogEvent, LoggingService};
use crate::services::project::{ProjectRepository, ProjectSummary};

/// Snapshot of what the status bar shows
#[derive(Debug, Clone, Serialize)]
pub struct StudioStatus {
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    pub save_state: SaveState,
    pub save_label: &'static str,
    pub project_count: usize,
    pub file_count: usize,
    pub selected_file: Option<String>,
    pub selected_lines: Option<usize>,
    pub autosave_pending: bool,
}

impl StudioStatus {
    /// "1 project" / "3 projects"
    pub fn project_count_label(&self) -> String {
        let suffix = if self.project_count == 1 { "" } else { "s" };
        format!("{} project{}", self.project_count, suffix)
    }
}

pub struct EditorService {
    repository: ProjectRepository,
    workspace: Workspace,
    autosave: AutosaveTimer,
    logger: Option<Arc<LoggingService>>,
}

impl EditorService {
    /// Load the collection and open its first project
    pub fn new(
        repository: ProjectRepository,
        autosave_delay: Duration,
        logger: Option<Arc<LoggingService>>,
    ) -> Self {
        let workspace = Workspace::new(repository.load_all());
        Self {
            repository,
            workspace,
            autosave: AutosaveTimer::new(autosave_delay),
            logger,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn projects(&self) -> &[Project] {
        self.workspace.projects()
    }

    pub fn active(&self) -> Option<&Project> {
        self.workspace.active()
    }

    pub fn selected(&self) -> &str {
        self.workspace.selected()
    }

    pub fn save_state(&self) -> SaveState {
        self.workspace.save_state()
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    // ------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------

    /// Open the project with `id`
    ///
    /// Unsaved edits to the current project are persisted first.
    pub fn open_project(&mut self, id: &str) -> Result<()> {
        if self.workspace.active_id() == Some(id) {
            return Ok(());
        }
        if self.repository.find_by_id(self.workspace.projects(), id).is_none() {
            return Err(Error::not_found(format!("project {}", id)).into());
        }
        self.persist_pending()?;
        self.workspace.open(id);
        Ok(())
    }

    /// Create a starter project, prepend it and open it
    pub fn new_project(&mut self) -> Result<Project> {
        self.persist_pending()?;
        let (collection, created) = self.repository.create(self.workspace.projects())?;
        self.workspace.open_created(collection, &created);
        Ok(created)
    }

    /// Rename a project; blank names and unknown ids are no-ops
    pub fn rename_project(&mut self, id: &str, new_name: &str) -> Result<()> {
        let collection = self
            .repository
            .rename(self.workspace.projects(), id, new_name)?;
        self.workspace.replace_projects(collection);
        Ok(())
    }

    /// Delete a project
    ///
    /// Deleting the open project opens the first remaining one and drops
    /// its pending autosave.
    pub fn delete_project(&mut self, id: &str) -> Result<()> {
        if self.repository.find_by_id(self.workspace.projects(), id).is_none() {
            return Err(Error::not_found(format!("project {}", id)).into());
        }
        let was_active = self.workspace.active_id() == Some(id);
        let collection = self.repository.remove(self.workspace.projects(), id)?;
        if was_active {
            self.autosave.cancel();
        }
        self.workspace.replace_projects(collection);
        Ok(())
    }

    pub fn project_summaries(&self) -> Vec<ProjectSummary> {
        let active_id = self.workspace.active_id();
        self.workspace
            .projects()
            .iter()
            .map(|p| ProjectSummary::from_project(p, active_id))
            .collect()
    }

    // ------------------------------------------------------------------
    // Files of the open project
    // ------------------------------------------------------------------

    pub fn select_file(&mut self, path: &str) -> bool {
        self.workspace.select(path)
    }

    pub fn create_file(&mut self, path: &str) -> bool {
        let changed = self.workspace.create_file(path);
        self.schedule_if(changed)
    }

    pub fn rename_file(&mut self, old_path: &str, new_path: &str) -> bool {
        let changed = self.workspace.rename_file(old_path, new_path);
        self.schedule_if(changed)
    }

    pub fn delete_file(&mut self, path: &str) -> bool {
        let changed = self.workspace.delete_file(path);
        self.schedule_if(changed)
    }

    pub fn update_content(&mut self, path: &str, code: &str) -> bool {
        let changed = self.workspace.update_content(path, code);
        self.schedule_if(changed)
    }

    fn schedule_if(&mut self, changed: bool) -> bool {
        if changed {
            self.autosave.schedule();
        }
        changed
    }

    /// Files of the open project grouped by first path segment
    pub fn folder_view(&self) -> FolderView {
        self.workspace
            .active()
            .map(|p| file_tree::group_by_folder(&p.files))
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------

    /// Persist now, regardless of the timer
    ///
    /// A pending autosave is left armed; when it fires it rewrites the
    /// same content.
    pub fn save(&mut self) -> Result<()> {
        let snapshot = self.workspace.snapshot();
        self.repository.save_all(&snapshot)?;
        self.workspace.mark_saved(snapshot);
        record(self.logger(), self.project_event("manual_save"));
        Ok(())
    }

    /// Autosave flush
    ///
    /// A failed write is logged and leaves the indicator at Unsaved so the
    /// next edit or a manual save can retry. Returns whether it persisted.
    pub fn flush(&mut self) -> bool {
        let snapshot = self.workspace.snapshot();
        match self.repository.save_all(&snapshot) {
            Ok(()) => {
                self.workspace.mark_saved(snapshot);
                record(self.logger(), self.project_event("autosave_flushed"));
                true
            }
            Err(e) => {
                eprintln!("[cipherstudio] Autosave failed: {:#}", e);
                record(
                    self.logger(),
                    self.project_event("autosave_failed")
                        .with_error("autosave write failed")
                        .with_error_details(format!("{:#}", e)),
                );
                false
            }
        }
    }

    /// Wait for the pending autosave and flush it
    ///
    /// Never resolves while nothing is pending.
    pub async fn next_autosave(&mut self) -> bool {
        self.autosave.due().await;
        self.flush()
    }

    /// Flush a pending autosave immediately (process shutdown)
    pub fn settle(&mut self) -> bool {
        if !self.autosave.is_pending() {
            return true;
        }
        self.autosave.cancel();
        self.flush()
    }

    fn persist_pending(&mut self) -> Result<()> {
        if self.workspace.is_saved() {
            return Ok(());
        }
        self.autosave.cancel();
        self.save()
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    pub fn status(&self) -> StudioStatus {
        let active = self.workspace.active();
        let selected = self.workspace.selected();
        let selected_node = active.and_then(|p| p.files.get(selected));

        StudioStatus {
            project_id: active.map(|p| p.id.clone()),
            project_name: active.map(|p| p.name.clone()),
            save_state: self.workspace.save_state(),
            save_label: self.workspace.save_state().label(),
            project_count: self.workspace.projects().len(),
            file_count: active.map(Project::file_count).unwrap_or(0),
            selected_file: selected_node.map(|_| selected.to_string()),
            selected_lines: selected_node.map(|n| n.line_count()),
            autosave_pending: self.autosave.is_pending(),
        }
    }

    /// Hand the open project's files to a preview sandbox
    pub fn preview(&self, sandbox: &dyn PreviewSandbox, template: &str) -> Result<PreviewResult> {
        let project = self
            .workspace
            .active()
            .ok_or_else(|| Error::not_found("no open project"))?;
        let bundle = SandboxBundle {
            template,
            files: &project.files,
        };
        Ok(sandbox.render(&bundle)?)
    }

    fn project_event(&self, name: &str) -> LogEvent {
        let event = LogEvent::new(name);
        match self.workspace.active_id() {
            Some(id) => event.with_project(id),
            None => event,
        }
    }

    fn logger(&self) -> Option<&LoggingService> {
        self.logger.as_deref()
    }
}
