//! Integration tests for the studio context
//!
//! Real DuckDB stores in temporary directories; each `StudioContext::new`
//! stands in for one process start.
//!
//! Run with: cargo test --test studio_test -- --nocapture

use std::sync::Arc;

use tempfile::TempDir;

use cipherstudio_core::adapters::bundle::BundlePreview;
use cipherstudio_core::adapters::duckdb::DuckDbStore;
use cipherstudio_core::config::Config;
use cipherstudio_core::domain::project::{DEFAULT_ENTRY_SOURCE, DEFAULT_PROJECT_NAME, ENTRY_FILE};
use cipherstudio_core::ports::{keys, KeyValueStore};
use cipherstudio_core::{EntryPoint, LogQuery, SaveState, StudioContext, STORE_FILE};

// ============================================================================
// Test Helpers
// ============================================================================

fn open(temp_dir: &TempDir) -> StudioContext {
    StudioContext::new(temp_dir.path(), EntryPoint::Cli).expect("Failed to open studio")
}

/// Raw store next to the context, for seeding data before the first start
fn raw_store(temp_dir: &TempDir) -> DuckDbStore {
    let store = DuckDbStore::new(&temp_dir.path().join(STORE_FILE), "cipherstudio").unwrap();
    store.ensure_schema().unwrap();
    store
}

// ============================================================================
// Projects
// ============================================================================

#[test]
fn test_first_start_shows_default_project() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open(&temp_dir);

    assert_eq!(ctx.editor.projects().len(), 1);
    let active = ctx.editor.active().unwrap();
    assert_eq!(active.name, DEFAULT_PROJECT_NAME);
    assert_eq!(active.files[ENTRY_FILE].code, DEFAULT_ENTRY_SOURCE);
    assert_eq!(ctx.editor.selected(), ENTRY_FILE);
    assert!(!ctx.session.is_authenticated());
}

#[test]
fn test_edits_survive_restart() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut ctx = open(&temp_dir);
        ctx.editor.create_file("components/Button.jsx");
        ctx.editor
            .update_content("components/Button.jsx", "export const Button = () => null;");
        assert_eq!(ctx.editor.save_state(), SaveState::Unsaved);
        assert!(ctx.editor.settle());
        ctx.remember_position().unwrap();
    }

    let ctx = open(&temp_dir);
    let active = ctx.editor.active().unwrap();
    assert_eq!(
        active.files["components/Button.jsx"].code,
        "export const Button = () => null;"
    );
    assert_eq!(ctx.editor.selected(), "components/Button.jsx");
    assert_eq!(ctx.editor.save_state(), SaveState::Saved);
}

#[test]
fn test_open_project_is_remembered() {
    let temp_dir = TempDir::new().unwrap();
    let created_id = {
        let mut ctx = open(&temp_dir);
        let created = ctx.editor.new_project().unwrap();
        ctx.editor.open_project("default-project").unwrap();
        ctx.remember_position().unwrap();
        created.id
    };

    let ctx = open(&temp_dir);
    assert_eq!(ctx.editor.projects()[0].id, created_id);
    assert_eq!(ctx.editor.workspace().active_id(), Some("default-project"));
}

#[test]
fn test_create_rename_delete_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let created_id = {
        let mut ctx = open(&temp_dir);
        let created = ctx.editor.new_project().unwrap();
        assert_eq!(created.name, "Project 2");
        ctx.editor.rename_project(&created.id, "Landing Page").unwrap();
        created.id
    };

    {
        let mut ctx = open(&temp_dir);
        let names: Vec<_> = ctx.editor.projects().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["Landing Page".to_string(), DEFAULT_PROJECT_NAME.to_string()]);

        ctx.editor.delete_project(&created_id).unwrap();
        assert_eq!(ctx.editor.workspace().active_id(), Some("default-project"));
    }

    let ctx = open(&temp_dir);
    assert_eq!(ctx.editor.projects().len(), 1);
}

#[test]
fn test_malformed_blob_falls_back_and_is_logged() {
    let temp_dir = TempDir::new().unwrap();
    raw_store(&temp_dir)
        .set(keys::PROJECTS, r#"[{"id":"","name":"broken","files":{}}]"#)
        .unwrap();

    let ctx = open(&temp_dir);
    assert_eq!(ctx.editor.active().unwrap().name, DEFAULT_PROJECT_NAME);

    let logger = ctx.logger.as_ref().unwrap();
    let errors = logger.find(&LogQuery::recent(10).errors_only()).unwrap();
    assert!(errors.iter().any(|e| e.event == "projects_load_failed"));
}

#[test]
fn test_settings_namespace_isolates_collections() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut ctx = open(&temp_dir);
        ctx.editor.new_project().unwrap();
    }

    let mut config = Config::default();
    config.namespace = "scratch".to_string();
    config.save(temp_dir.path()).unwrap();

    let ctx = open(&temp_dir);
    assert_eq!(ctx.config.namespace, "scratch");
    assert_eq!(ctx.editor.projects().len(), 1);
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test]
async fn test_session_restored_on_next_start() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut ctx = open(&temp_dir);
        let identity = ctx.session.login("ada@example.com", "pw").await.unwrap();
        assert_eq!(identity.username, "ada");
    }

    let mut ctx = open(&temp_dir);
    assert_eq!(ctx.session.current().unwrap().email, "ada@example.com");

    ctx.session.logout().unwrap();
    drop(ctx);
    let ctx = open(&temp_dir);
    assert!(!ctx.session.is_authenticated());
}

// ============================================================================
// Preview and in-memory contexts
// ============================================================================

#[test]
fn test_preview_writes_sandbox_payload() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open(&temp_dir);
    let out = temp_dir.path().join("preview").join("sandbox.json");

    let result = ctx
        .editor
        .preview(&BundlePreview::new(&out), &ctx.config.preview_template)
        .unwrap();
    assert_eq!(result.template, "react");

    let payload: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(payload["template"], "react");
    assert_eq!(payload["files"][ENTRY_FILE]["type"], "file");
    assert_eq!(payload["files"][ENTRY_FILE]["code"], DEFAULT_ENTRY_SOURCE);
}

#[test]
fn test_in_memory_context_has_no_data_dir() {
    let store = DuckDbStore::open_in_memory("cipherstudio").unwrap();
    store.ensure_schema().unwrap();
    let mut ctx = StudioContext::with_store(Config::default(), Arc::new(store), None);

    assert!(ctx.data_dir().is_none());
    ctx.editor.create_file("index.css");
    ctx.editor.save().unwrap();
    ctx.remember_position().unwrap();
    assert_eq!(ctx.config.selected_file.as_deref(), Some("index.css"));
}
