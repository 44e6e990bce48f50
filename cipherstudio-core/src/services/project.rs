//! Project repository - the project collection against the key-value store
//!
//! Every mutating operation writes the whole collection under the
//! `projects` key. There is no incremental patching.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::project::{
    decode_collection, encode_collection, find_by_id, next_project_id, next_project_name,
};
use crate::domain::{Project, ProjectCollection};
use crate::ports::{keys, KeyValueStore};
use crate::services::logging::{now_ms, record, LogEvent, LoggingService};

/// Repository for the persisted project collection
pub struct ProjectRepository {
    store: Arc<dyn KeyValueStore>,
    logger: Option<Arc<LoggingService>>,
}

impl ProjectRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, logger: Option<Arc<LoggingService>>) -> Self {
        Self { store, logger }
    }

    /// Read the persisted collection
    ///
    /// Missing, unreadable or malformed data yields the default seed. An
    /// empty stored collection is seeded as well so that there is always a
    /// project to open.
    pub fn load_all(&self) -> ProjectCollection {
        let blob = match self.store.get(keys::PROJECTS) {
            Ok(Some(blob)) => blob,
            Ok(None) => return vec![Project::default_seed()],
            Err(e) => {
                self.log_load_failure("read failed", &e.to_string());
                return vec![Project::default_seed()];
            }
        };

        match decode_collection(&blob) {
            Ok(collection) if collection.is_empty() => vec![Project::default_seed()],
            Ok(collection) => {
                record(self.logger(), LogEvent::new("projects_loaded"));
                collection
            }
            Err(e) => {
                self.log_load_failure("malformed projects blob", &e.to_string());
                vec![Project::default_seed()]
            }
        }
    }

    fn log_load_failure(&self, message: &str, details: &str) {
        eprintln!("[cipherstudio] Failed to load projects: {}", details);
        record(
            self.logger(),
            LogEvent::new("projects_load_failed")
                .with_error(message)
                .with_error_details(details),
        );
    }

    /// Replace the persisted collection with `collection`
    pub fn save_all(&self, collection: &[Project]) -> Result<()> {
        let blob = encode_collection(collection)?;
        self.store
            .set(keys::PROJECTS, &blob)
            .context("Failed to write projects")?;
        Ok(())
    }

    /// Prepend a new starter project and persist
    pub fn create(&self, collection: &[Project]) -> Result<(ProjectCollection, Project)> {
        self.create_at(collection, now_ms())
    }

    /// `create` with an explicit timestamp for the id
    pub fn create_at(
        &self,
        collection: &[Project],
        millis: i64,
    ) -> Result<(ProjectCollection, Project)> {
        let project = Project::starter(
            next_project_id(collection, millis),
            next_project_name(collection),
        );

        let mut updated = Vec::with_capacity(collection.len() + 1);
        updated.push(project.clone());
        updated.extend_from_slice(collection);

        self.save_all(&updated)?;
        record(
            self.logger(),
            LogEvent::new("project_created").with_project(&project.id),
        );
        Ok((updated, project))
    }

    /// Rename the project with `id` and persist
    ///
    /// Names need not be unique. A blank name or an unknown id leaves the
    /// collection as it is.
    pub fn rename(
        &self,
        collection: &[Project],
        id: &str,
        new_name: &str,
    ) -> Result<ProjectCollection> {
        if new_name.trim().is_empty() || find_by_id(collection, id).is_none() {
            return Ok(collection.to_vec());
        }

        let updated: ProjectCollection = collection
            .iter()
            .map(|p| {
                if p.id == id {
                    Project {
                        name: new_name.to_string(),
                        ..p.clone()
                    }
                } else {
                    p.clone()
                }
            })
            .collect();

        self.save_all(&updated)?;
        record(self.logger(), LogEvent::new("project_renamed").with_project(id));
        Ok(updated)
    }

    /// Drop the project with `id` and persist
    ///
    /// If it was the open project the caller reselects.
    pub fn remove(&self, collection: &[Project], id: &str) -> Result<ProjectCollection> {
        let updated: ProjectCollection =
            collection.iter().filter(|p| p.id != id).cloned().collect();

        self.save_all(&updated)?;
        record(self.logger(), LogEvent::new("project_deleted").with_project(id));
        Ok(updated)
    }

    pub fn find_by_id<'a>(&self, collection: &'a [Project], id: &str) -> Option<&'a Project> {
        find_by_id(collection, id)
    }

    fn logger(&self) -> Option<&LoggingService> {
        self.logger.as_deref()
    }
}

/// One row of the project list
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub file_count: usize,
    pub active: bool,
}

impl ProjectSummary {
    pub fn from_project(project: &Project, active_id: Option<&str>) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            file_count: project.file_count(),
            active: active_id == Some(project.id.as_str()),
        }
    }
}
