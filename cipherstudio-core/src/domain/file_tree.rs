//! File tree operations on a single project's file map
//!
//! All operations take the map by reference and return a new map. Collisions
//! and missing paths are silent no-ops: the input is returned unchanged.

use indexmap::IndexMap;
use serde::Serialize;

use super::project::{FileMap, FileNode};

/// Content of a file created from the explorer
pub const NEW_FILE_PLACEHOLDER: &str = "// New file";

/// Separator used to group paths into folders
pub const PATH_SEPARATOR: char = '/';

/// Insert a placeholder file at `path`
///
/// No-op when the path exists or is blank.
pub fn create_file(files: &FileMap, path: &str) -> FileMap {
    if path.trim().is_empty() || files.contains_key(path) {
        return files.clone();
    }
    let mut next = files.clone();
    next.insert(path.to_string(), FileNode::file(NEW_FILE_PLACEHOLDER));
    next
}

/// Move the node at `old_path` to `new_path`
///
/// No-op when `new_path` exists (which covers renaming onto itself), when
/// `old_path` is missing, or when `new_path` is blank. The moved key is
/// appended last; it does not keep its old position.
pub fn rename_file(files: &FileMap, old_path: &str, new_path: &str) -> FileMap {
    if new_path.trim().is_empty() || files.contains_key(new_path) {
        return files.clone();
    }
    let mut next = files.clone();
    match next.shift_remove(old_path) {
        Some(node) => {
            next.insert(new_path.to_string(), node);
            next
        }
        None => files.clone(),
    }
}

/// Remove the node at `path` if present
pub fn delete_file(files: &FileMap, path: &str) -> FileMap {
    let mut next = files.clone();
    next.shift_remove(path);
    next
}

/// Replace the code of the node at `path`; no-op when absent
pub fn update_content(files: &FileMap, path: &str, code: &str) -> FileMap {
    let mut next = files.clone();
    if let Some(node) = next.get_mut(path) {
        node.code = code.to_string();
    }
    next
}

/// Single-level folder view of a file map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FolderView {
    /// Paths without a separator, in map order
    pub root_paths: Vec<String>,
    /// First path segment → full paths under it, in order of first appearance
    pub folders: IndexMap<String, Vec<String>>,
}

/// Group paths by their first segment
///
/// Nested folders are flattened under their top-level segment. Pure
/// projection; storage layout is untouched.
pub fn group_by_folder(files: &FileMap) -> FolderView {
    let mut view = FolderView::default();
    for path in files.keys() {
        match path.split_once(PATH_SEPARATOR) {
            Some((folder, _)) => view
                .folders
                .entry(folder.to_string())
                .or_default()
                .push(path.clone()),
            None => view.root_paths.push(path.clone()),
        }
    }
    view
}

/// Leaf name shown for a path: the part after the last separator
pub fn display_name(path: &str) -> &str {
    path.rsplit(PATH_SEPARATOR).next().unwrap_or(path)
}

/// Selection after `deleted` was removed from `files`
///
/// Keeps `selected` unless it was the deleted path, in which case the first
/// remaining path is chosen (or "" when none remain).
pub fn reselect_after_delete(files: &FileMap, selected: &str, deleted: &str) -> String {
    if selected != deleted && files.contains_key(selected) {
        return selected.to_string();
    }
    files.keys().next().cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FileMap {
        let mut files = FileMap::new();
        files.insert("App.jsx".to_string(), FileNode::file("app"));
        files.insert("src/util.js".to_string(), FileNode::file("util"));
        files.insert("index.js".to_string(), FileNode::file("index"));
        files.insert("src/lib/deep.js".to_string(), FileNode::file("deep"));
        files.insert("public/index.html".to_string(), FileNode::file("<html>"));
        files
    }

    #[test]
    fn test_create_file_inserts_placeholder() {
        let files = create_file(&sample(), "styles.css");
        assert_eq!(files.len(), 6);
        assert_eq!(files["styles.css"].code, NEW_FILE_PLACEHOLDER);
        assert_eq!(files.keys().last().unwrap(), "styles.css");
    }

    #[test]
    fn test_create_file_is_idempotent_on_existing_path() {
        let files = sample();
        assert_eq!(create_file(&files, "App.jsx"), files);
        assert_eq!(create_file(&files, "src/util.js"), files);
    }

    #[test]
    fn test_create_file_rejects_blank_path() {
        let files = sample();
        assert_eq!(create_file(&files, "   "), files);
        assert_eq!(create_file(&files, ""), files);
    }

    #[test]
    fn test_create_then_delete_round_trips() {
        let files = sample();
        let with_x = create_file(&files, "x");
        assert_eq!(delete_file(&with_x, "x"), files);
    }

    #[test]
    fn test_rename_moves_content_to_the_end() {
        let files = rename_file(&sample(), "App.jsx", "Main.jsx");
        assert_eq!(files.len(), 5);
        assert!(!files.contains_key("App.jsx"));
        assert_eq!(files["Main.jsx"].code, "app");
        assert_eq!(files.keys().last().unwrap(), "Main.jsx");
    }

    #[test]
    fn test_rename_onto_existing_path_is_rejected() {
        let files = sample();
        let renamed = rename_file(&files, "App.jsx", "index.js");
        assert_eq!(renamed, files);
        assert_eq!(renamed["index.js"].code, "index");
    }

    #[test]
    fn test_rename_onto_self_keeps_entry() {
        let files = sample();
        assert_eq!(rename_file(&files, "App.jsx", "App.jsx"), files);
    }

    #[test]
    fn test_rename_missing_source_is_noop() {
        let files = sample();
        assert_eq!(rename_file(&files, "missing.js", "other.js"), files);
    }

    #[test]
    fn test_rename_never_changes_key_count() {
        let files = sample();
        for (old, new) in [
            ("App.jsx", "a.jsx"),
            ("App.jsx", "index.js"),
            ("nope", "b.js"),
            ("src/util.js", "lib/util.js"),
            ("index.js", ""),
        ] {
            assert_eq!(rename_file(&files, old, new).len(), files.len());
        }
    }

    #[test]
    fn test_delete_missing_path_is_noop() {
        let files = sample();
        assert_eq!(delete_file(&files, "nope"), files);
    }

    #[test]
    fn test_delete_preserves_order_of_others() {
        let files = delete_file(&sample(), "src/util.js");
        let keys: Vec<_> = files.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["App.jsx", "index.js", "src/lib/deep.js", "public/index.html"]
        );
    }

    #[test]
    fn test_update_content() {
        let files = update_content(&sample(), "App.jsx", "new code");
        assert_eq!(files["App.jsx"].code, "new code");
    }

    #[test]
    fn test_update_content_missing_path_is_noop() {
        let files = sample();
        assert_eq!(update_content(&files, "ghost.js", "boo"), files);
    }

    #[test]
    fn test_group_by_folder() {
        let view = group_by_folder(&sample());
        assert_eq!(view.root_paths, vec!["App.jsx", "index.js"]);
        assert_eq!(
            view.folders["src"],
            vec!["src/util.js".to_string(), "src/lib/deep.js".to_string()]
        );
        assert_eq!(view.folders["public"], vec!["public/index.html".to_string()]);
        let folder_order: Vec<_> = view.folders.keys().map(String::as_str).collect();
        assert_eq!(folder_order, vec!["src", "public"]);
    }

    #[test]
    fn test_group_by_folder_is_pure() {
        let files = sample();
        let before = files.clone();
        let first = group_by_folder(&files);
        let second = group_by_folder(&files);
        assert_eq!(first, second);
        assert_eq!(files, before);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("App.jsx"), "App.jsx");
        assert_eq!(display_name("src/util.js"), "util.js");
        assert_eq!(display_name("src/lib/deep.js"), "deep.js");
    }

    #[test]
    fn test_reselect_after_delete() {
        let files = delete_file(&sample(), "App.jsx");
        assert_eq!(reselect_after_delete(&files, "App.jsx", "App.jsx"), "src/util.js");
        assert_eq!(reselect_after_delete(&files, "index.js", "App.jsx"), "index.js");
        assert_eq!(reselect_after_delete(&FileMap::new(), "App.jsx", "App.jsx"), "");
    }
}
