//! Workspace state: the project collection, the open project, the selected
//! file and the save indicator.
//!
//! Invariants kept by every method:
//! - the open project is a member of `projects` (by id) unless the
//!   collection is empty, in which case nothing is open;
//! - `selected` is a key of the open project's files, or "" when it has none.

use serde::Serialize;

use super::file_tree;
use super::project::{find_by_id, merge_by_id, Project, ProjectCollection};

/// Save indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveState {
    Saved,
    Unsaved,
}

impl SaveState {
    pub fn label(&self) -> &'static str {
        match self {
            SaveState::Saved => "All changes saved",
            SaveState::Unsaved => "Unsaved changes",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Workspace {
    projects: ProjectCollection,
    active: Option<Project>,
    selected: String,
    save_state: SaveState,
}

impl Workspace {
    /// Open the first project of `projects`
    pub fn new(projects: ProjectCollection) -> Self {
        let active = projects.first().cloned();
        let selected = active.as_ref().map(Project::first_path).unwrap_or_default();
        Self {
            projects,
            active,
            selected,
            save_state: SaveState::Saved,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn active(&self) -> Option<&Project> {
        self.active.as_ref()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_ref().map(|p| p.id.as_str())
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn save_state(&self) -> SaveState {
        self.save_state
    }

    pub fn is_saved(&self) -> bool {
        self.save_state == SaveState::Saved
    }

    /// Make the project with `id` active and select its first file
    ///
    /// Returns false (and changes nothing) when `id` is unknown.
    pub fn open(&mut self, id: &str) -> bool {
        match find_by_id(&self.projects, id) {
            Some(project) => {
                self.selected = project.first_path();
                self.active = Some(project.clone());
                true
            }
            None => false,
        }
    }

    /// Select a file of the open project; unknown paths are ignored
    pub fn select(&mut self, path: &str) -> bool {
        match &self.active {
            Some(project) if project.files.contains_key(path) => {
                self.selected = path.to_string();
                true
            }
            _ => false,
        }
    }

    /// Swap in a collection returned by the repository
    ///
    /// Keeps the open project if it is still a member (taking the name from
    /// the new collection, keeping in-memory file edits); otherwise opens the
    /// first remaining project (with nothing pending), or nothing.
    pub fn replace_projects(&mut self, projects: ProjectCollection) {
        self.projects = projects;
        let still_present = self
            .active
            .as_ref()
            .and_then(|active| find_by_id(&self.projects, &active.id))
            .map(|p| p.name.clone());

        match still_present {
            Some(name) => {
                if let Some(active) = self.active.as_mut() {
                    active.name = name;
                }
            }
            None => {
                self.active = self.projects.first().cloned();
                self.selected = self
                    .active
                    .as_ref()
                    .map(Project::first_path)
                    .unwrap_or_default();
                self.save_state = SaveState::Saved;
            }
        }
    }

    /// Open a project that was just prepended by the repository
    pub fn open_created(&mut self, projects: ProjectCollection, created: &Project) {
        self.projects = projects;
        self.selected = created.first_path();
        self.active = Some(created.clone());
    }

    pub fn create_file(&mut self, path: &str) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        let next = file_tree::create_file(&active.files, path);
        if next.len() == active.files.len() {
            return false;
        }
        active.files = next;
        self.selected = path.to_string();
        self.save_state = SaveState::Unsaved;
        true
    }

    pub fn rename_file(&mut self, old_path: &str, new_path: &str) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if !active.files.contains_key(old_path) || active.files.contains_key(new_path) {
            return false;
        }
        let next = file_tree::rename_file(&active.files, old_path, new_path);
        if !next.contains_key(new_path) {
            return false;
        }
        active.files = next;
        if self.selected == old_path {
            self.selected = new_path.to_string();
        }
        self.save_state = SaveState::Unsaved;
        true
    }

    pub fn delete_file(&mut self, path: &str) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if !active.files.contains_key(path) {
            return false;
        }
        active.files = file_tree::delete_file(&active.files, path);
        self.selected = file_tree::reselect_after_delete(&active.files, &self.selected, path);
        self.save_state = SaveState::Unsaved;
        true
    }

    pub fn update_content(&mut self, path: &str, code: &str) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if !active.files.contains_key(path) {
            return false;
        }
        active.files = file_tree::update_content(&active.files, path, code);
        self.save_state = SaveState::Unsaved;
        true
    }

    /// Collection with the open project merged in by id
    pub fn snapshot(&self) -> ProjectCollection {
        match &self.active {
            Some(active) => merge_by_id(&self.projects, active),
            None => self.projects.clone(),
        }
    }

    /// Record that `persisted` is now what storage holds
    pub fn mark_saved(&mut self, persisted: ProjectCollection) {
        self.projects = persisted;
        self.save_state = SaveState::Saved;
    }
}
