//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

pub mod autosave;
mod editor;
pub mod logging;
pub mod migration;
mod project;
mod session;

pub use autosave::{AutosaveTimer, DEFAULT_AUTOSAVE_DELAY};
pub use editor::{EditorService, StudioStatus};
pub use logging::{EntryPoint, EventCount, LogEntry, LogEvent, LogQuery, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use project::{ProjectRepository, ProjectSummary};
pub use session::SessionService;
