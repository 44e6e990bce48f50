//! CipherStudio Core - project and editor state for an in-browser style IDE
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (Project, FileNode, Identity, Workspace)
//! - **ports**: Trait definitions for external collaborators (KeyValueStore, AuthProvider, PreviewSandbox)
//! - **services**: Business logic orchestration (projects, editor, autosave, session)
//! - **adapters**: Concrete implementations (DuckDB, in-memory, mock auth, bundle preview)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use adapters::duckdb::DuckDbStore;
use adapters::mock_auth::MockAuthProvider;
use config::Config;
use ports::KeyValueStore;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{
    FileKind, FileMap, FileNode, FolderView, Identity, Project, ProjectCollection, Registration,
    SaveState,
};
pub use services::{
    EntryPoint, EventCount, LogEntry, LogEvent, LogQuery, LoggingService, ProjectSummary,
    StudioStatus,
};

/// Store database file inside the data directory
pub const STORE_FILE: &str = "studio.duckdb";

/// Main context for CipherStudio operations
///
/// Created once at process start. Holds the store, configuration and the
/// stateful services; nothing lives in globals.
pub struct StudioContext {
    pub config: Config,
    pub store: Arc<dyn KeyValueStore>,
    pub logger: Option<Arc<LoggingService>>,
    pub editor: EditorService,
    pub session: SessionService,
    data_dir: Option<PathBuf>,
}

impl StudioContext {
    /// Open the studio in `data_dir`
    ///
    /// Logging is best-effort: if logs.duckdb cannot be opened the context
    /// runs without a logger.
    pub fn new(data_dir: &Path, entry_point: EntryPoint) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let config = Config::load(data_dir)?;

        let store = DuckDbStore::new(&data_dir.join(STORE_FILE), config.namespace.clone())?;
        store.ensure_schema()?;

        let logger = match LoggingService::new(data_dir, entry_point, env!("CARGO_PKG_VERSION")) {
            Ok(logger) => Some(Arc::new(logger)),
            Err(e) => {
                eprintln!("[cipherstudio] Logging disabled: {}", e);
                None
            }
        };

        let mut context = Self::with_store(config, Arc::new(store), logger);
        context.data_dir = Some(data_dir.to_path_buf());
        Ok(context)
    }

    /// Build a context over any store (tests, ephemeral runs)
    ///
    /// Restores the persisted session and reopens the remembered project
    /// and file when they still exist.
    pub fn with_store(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        logger: Option<Arc<LoggingService>>,
    ) -> Self {
        let repository = ProjectRepository::new(Arc::clone(&store), logger.clone());
        let mut editor = EditorService::new(repository, config.autosave_delay(), logger.clone());
        if let Some(id) = config.active_project.as_deref() {
            let _ = editor.open_project(id);
        }
        if let Some(path) = config.selected_file.as_deref() {
            editor.select_file(path);
        }

        let mut session = SessionService::new(
            Arc::clone(&store),
            Arc::new(MockAuthProvider::new()),
            logger.clone(),
        );
        session.restore();

        Self {
            config,
            store,
            logger,
            editor,
            session,
            data_dir: None,
        }
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Remember the open project and file for the next start
    ///
    /// No-op for contexts without a data directory.
    pub fn remember_position(&mut self) -> Result<()> {
        let active = self.editor.workspace().active_id().map(str::to_string);
        let selected = self.editor.selected().to_string();
        self.config.remember_position(active.as_deref(), &selected);
        match &self.data_dir {
            Some(dir) => self.config.save(dir),
            None => Ok(()),
        }
    }
}
