//! Core domain entities
//!
//! Projects, their file trees, identities and the workspace state. Pure data
//! structures and pure functions - no I/O or external dependencies.

pub mod file_tree;
mod identity;
pub mod project;
pub mod result;
mod workspace;

pub use file_tree::FolderView;
pub use identity::{Credentials, Identity, Registration, Session, MIN_PASSWORD_LEN};
pub use project::{FileKind, FileMap, FileNode, Project, ProjectCollection};
pub use workspace::{SaveState, Workspace};
