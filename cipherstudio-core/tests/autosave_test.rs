//! Autosave timing against a real store
//!
//! Uses tokio's paused clock so the debounce window is exercised without
//! real sleeps.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::{advance, Instant};

use cipherstudio_core::adapters::duckdb::DuckDbStore;
use cipherstudio_core::config::Config;
use cipherstudio_core::domain::project::{decode_collection, ENTRY_FILE};
use cipherstudio_core::ports::{keys, KeyValueStore};
use cipherstudio_core::{SaveState, StudioContext, STORE_FILE};

fn context(temp_dir: &TempDir) -> (StudioContext, Arc<DuckDbStore>) {
    let store =
        Arc::new(DuckDbStore::new(&temp_dir.path().join(STORE_FILE), "cipherstudio").unwrap());
    store.ensure_schema().unwrap();
    let ctx = StudioContext::with_store(Config::default(), store.clone(), None);
    (ctx, store)
}

fn persisted_entry(store: &DuckDbStore) -> Option<String> {
    store
        .get(keys::PROJECTS)
        .unwrap()
        .map(|blob| decode_collection(&blob).unwrap()[0].files[ENTRY_FILE].code.clone())
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_edits_flushes_once_with_last_state() {
    let temp_dir = TempDir::new().unwrap();
    let (mut ctx, store) = context(&temp_dir);
    let start = Instant::now();

    ctx.editor.update_content(ENTRY_FILE, "first");
    advance(Duration::from_millis(200)).await;
    ctx.editor.update_content(ENTRY_FILE, "second");
    advance(Duration::from_millis(700)).await;
    ctx.editor.update_content(ENTRY_FILE, "third");

    // nothing written while the window is open
    advance(Duration::from_millis(999)).await;
    assert_eq!(persisted_entry(&store), None);
    assert_eq!(ctx.editor.save_state(), SaveState::Unsaved);

    assert!(ctx.editor.next_autosave().await);
    assert_eq!(start.elapsed(), Duration::from_millis(1900));
    assert_eq!(persisted_entry(&store).as_deref(), Some("third"));
    assert_eq!(ctx.editor.save_state(), SaveState::Saved);
    assert!(!ctx.editor.autosave_pending());
}

#[tokio::test(start_paused = true)]
async fn test_manual_save_before_window_elapses() {
    let temp_dir = TempDir::new().unwrap();
    let (mut ctx, store) = context(&temp_dir);

    ctx.editor.update_content(ENTRY_FILE, "saved by hand");
    advance(Duration::from_millis(100)).await;
    ctx.editor.save().unwrap();
    assert_eq!(ctx.editor.save_state(), SaveState::Saved);
    assert_eq!(persisted_entry(&store).as_deref(), Some("saved by hand"));

    // the still-armed flush rewrites identical content
    assert!(ctx.editor.next_autosave().await);
    assert_eq!(ctx.editor.save_state(), SaveState::Saved);
    assert_eq!(persisted_entry(&store).as_deref(), Some("saved by hand"));
}

#[tokio::test(start_paused = true)]
async fn test_configured_window_is_used() {
    let temp_dir = TempDir::new().unwrap();
    let store =
        Arc::new(DuckDbStore::new(&temp_dir.path().join(STORE_FILE), "cipherstudio").unwrap());
    store.ensure_schema().unwrap();
    let mut config = Config::default();
    config.autosave_delay_ms = 250;
    let mut ctx = StudioContext::with_store(config, store, None);
    let start = Instant::now();

    ctx.editor.create_file("notes.md");
    assert!(ctx.editor.next_autosave().await);
    assert_eq!(start.elapsed(), Duration::from_millis(250));
}
