//! Project domain model

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Id of the project seeded on first run
pub const DEFAULT_PROJECT_ID: &str = "default-project";

/// Name of the project seeded on first run
pub const DEFAULT_PROJECT_NAME: &str = "My React App";

/// Entry file every seeded project starts with
pub const ENTRY_FILE: &str = "App.jsx";

/// Starter source of the default project's entry file
pub const DEFAULT_ENTRY_SOURCE: &str = r#"export default function App() {
  return (
    <div style={{ padding: '20px', fontFamily: 'sans-serif' }}>
      <h1>Welcome to CipherStudio</h1>
      <p>Edit the code and see changes live!</p>
    </div>
  )
}"#;

/// Source of the entry file in a freshly created project
pub const NEW_PROJECT_ENTRY_SOURCE: &str = r#"export default function App() {
  return <div>Hello World</div>
}"#;

/// Path → node map. Iteration order is insertion order.
pub type FileMap = IndexMap<String, FileNode>;

/// Kind tag of a file node
///
/// Only `File` is produced today. `Folder` is accepted when decoding so that
/// stored data using the reserved tag still loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Folder,
}

/// A single file's content and kind within a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
}

impl FileNode {
    pub fn file(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            kind: FileKind::File,
        }
    }

    /// Number of lines as shown in the editor header
    pub fn line_count(&self) -> usize {
        self.code.split('\n').count()
    }
}

/// A named collection of files forming one editable unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub files: FileMap,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>, files: FileMap) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            files,
        }
    }

    /// The project seeded when nothing usable is persisted
    pub fn default_seed() -> Self {
        let mut files = FileMap::new();
        files.insert(ENTRY_FILE.to_string(), FileNode::file(DEFAULT_ENTRY_SOURCE));
        Self::new(DEFAULT_PROJECT_ID, DEFAULT_PROJECT_NAME, files)
    }

    /// A new project with the single "Hello World" entry file
    pub fn starter(id: impl Into<String>, name: impl Into<String>) -> Self {
        let mut files = FileMap::new();
        files.insert(
            ENTRY_FILE.to_string(),
            FileNode::file(NEW_PROJECT_ENTRY_SOURCE),
        );
        Self::new(id, name, files)
    }

    /// First file path by iteration order, or "" when the project has no files
    pub fn first_path(&self) -> String {
        self.files.keys().next().cloned().unwrap_or_default()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Ordered sequence of projects, display order first
pub type ProjectCollection = Vec<Project>;

/// Find a project by id
pub fn find_by_id<'a>(collection: &'a [Project], id: &str) -> Option<&'a Project> {
    collection.iter().find(|p| p.id == id)
}

/// Replace the entry whose id matches `project`, keeping its position
///
/// Returns the collection unchanged when no entry matches.
pub fn merge_by_id(collection: &[Project], project: &Project) -> ProjectCollection {
    collection
        .iter()
        .map(|p| {
            if p.id == project.id {
                project.clone()
            } else {
                p.clone()
            }
        })
        .collect()
}

/// Derive a project id from a millisecond timestamp
///
/// Appends `-N` when the time-based id is already taken.
pub fn next_project_id(collection: &[Project], millis: i64) -> String {
    let base = format!("project-{}", millis);
    if find_by_id(collection, &base).is_none() {
        return base;
    }
    (1..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| find_by_id(collection, candidate).is_none())
        .unwrap_or(base)
}

/// Display name for the next created project
pub fn next_project_name(collection: &[Project]) -> String {
    format!("Project {}", collection.len() + 1)
}

/// Decode a persisted `projects` blob
///
/// Shape violations (wrong JSON types, unknown kind tags, empty or duplicate
/// ids) are reported as errors; callers fall back to the default seed.
pub fn decode_collection(blob: &str) -> Result<ProjectCollection> {
    let collection: ProjectCollection = serde_json::from_str(blob)?;
    validate_collection(&collection)?;
    Ok(collection)
}

/// Encode a collection for the `projects` key
pub fn encode_collection(collection: &[Project]) -> Result<String> {
    Ok(serde_json::to_string(collection)?)
}

fn validate_collection(collection: &[Project]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for project in collection {
        if project.id.trim().is_empty() {
            return Err(Error::validation("project id cannot be empty"));
        }
        if !seen.insert(project.id.as_str()) {
            return Err(Error::validation(format!(
                "duplicate project id: {}",
                project.id
            )));
        }
    }
    Ok(())
}
