//! File command - work with the files of the open project

use std::io::Read;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::{Confirm, Input};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use cipherstudio_core::domain::file_tree::display_name;
use cipherstudio_core::services::EditorService;
use cipherstudio_core::{Project, SaveState, StudioContext};

use super::{emit_json, finish, get_context};
use crate::output;

#[derive(Subcommand)]
pub enum FileCommands {
    /// List files of the open project
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show files grouped by top-level folder
    Tree {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a file (e.g. components/Button.jsx)
    New {
        /// Path of the new file (prompted if omitted)
        path: Option<String>,
    },
    /// Rename a file
    Rename {
        /// Current path
        old_path: String,
        /// New path
        new_path: String,
    },
    /// Delete a file
    Delete {
        /// Path to delete
        path: String,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Print a file's content (the selected file by default)
    Show {
        path: Option<String>,
    },
    /// Select a file
    Select {
        path: String,
    },
    /// Replace a file's content
    Edit {
        /// Path to edit (the selected file by default)
        path: Option<String>,
        /// Read the new content from a file instead of stdin
        #[arg(long)]
        from: Option<PathBuf>,
        /// Keep reading stdin and append each line, autosaving as you go
        #[arg(long)]
        live: bool,
    },
}

impl FileCommands {
    /// Strip surrounding whitespace from every typed path
    fn trimmed(self) -> Self {
        let trim = |path: String| path.trim().to_string();
        match self {
            FileCommands::New { path } => FileCommands::New {
                path: path.map(trim),
            },
            FileCommands::Rename { old_path, new_path } => FileCommands::Rename {
                old_path: trim(old_path),
                new_path: trim(new_path),
            },
            FileCommands::Delete { path, force } => FileCommands::Delete {
                path: trim(path),
                force,
            },
            FileCommands::Show { path } => FileCommands::Show {
                path: path.map(trim),
            },
            FileCommands::Select { path } => FileCommands::Select { path: trim(path) },
            FileCommands::Edit { path, from, live } => FileCommands::Edit {
                path: path.map(trim),
                from,
                live,
            },
            other => other,
        }
    }
}

pub async fn run(command: FileCommands) -> Result<()> {
    match command.trimmed() {
        FileCommands::List { json } => {
            let ctx = get_context("file list")?;
            let project = active_project(&ctx)?;

            if json {
                return emit_json(Ok(&project.files));
            }

            let mut table = output::create_table();
            table.set_header(vec!["", "Path", "Lines"]);
            for (path, node) in &project.files {
                let marker = if path == ctx.editor.selected() {
                    ">".green().to_string()
                } else {
                    String::new()
                };
                table.add_row(vec![marker, path.clone(), node.line_count().to_string()]);
            }
            println!("{}", table);
        }
        FileCommands::Tree { json } => {
            let ctx = get_context("file tree")?;
            let project = active_project(&ctx)?;
            let view = ctx.editor.folder_view();

            if json {
                return emit_json(Ok(view));
            }

            println!("{}", project.name.bold());
            for (folder, paths) in &view.folders {
                println!("  {}/", folder.blue().bold());
                for path in paths {
                    println!("    {}", highlight(&ctx, path, display_name(path)));
                }
            }
            for path in &view.root_paths {
                println!("  {}", highlight(&ctx, path, path));
            }
        }
        FileCommands::New { path } => {
            let mut ctx = get_context("file new")?;
            active_project(&ctx)?;
            let path = match path {
                Some(path) => path,
                None => Input::<String>::new()
                    .with_prompt("File name (e.g. components/Button.jsx)")
                    .interact_text()?,
            };
            let path = path.trim().to_string();

            if ctx.editor.create_file(&path) {
                finish(&mut ctx)?;
                output::success(&format!("Created {}", path));
            } else {
                output::warning(&format!("'{}' already exists or is not a valid name", path));
            }
        }
        FileCommands::Rename { old_path, new_path } => {
            let mut ctx = get_context("file rename")?;
            active_project(&ctx)?;
            if ctx.editor.rename_file(&old_path, &new_path) {
                finish(&mut ctx)?;
                output::success(&format!("Renamed {} to {}", old_path, new_path));
            } else {
                output::warning(&format!(
                    "Nothing renamed: '{}' is missing or '{}' already exists",
                    old_path, new_path
                ));
            }
        }
        FileCommands::Delete { path, force } => {
            let mut ctx = get_context("file delete")?;
            let project = active_project(&ctx)?;
            if !project.files.contains_key(&path) {
                return Err(anyhow!("File '{}' not found", path));
            }

            if !force
                && !Confirm::new()
                    .with_prompt(format!("Delete {}?", path))
                    .default(false)
                    .interact()?
            {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }

            ctx.editor.delete_file(&path);
            finish(&mut ctx)?;
            output::success(&format!("Deleted {}", path));
        }
        FileCommands::Show { path } => {
            let ctx = get_context("file show")?;
            let project = active_project(&ctx)?;
            let path = path.unwrap_or_else(|| ctx.editor.selected().to_string());
            let node = project
                .files
                .get(&path)
                .ok_or_else(|| anyhow!("File '{}' not found", path))?;
            print!("{}", node.code);
            if !node.code.ends_with('\n') {
                println!();
            }
        }
        FileCommands::Select { path } => {
            let mut ctx = get_context("file select")?;
            active_project(&ctx)?;
            if !ctx.editor.select_file(&path) {
                return Err(anyhow!("File '{}' not found", path));
            }
            finish(&mut ctx)?;
            output::success(&format!("Selected {}", path));
        }
        FileCommands::Edit { path, from, live } => {
            let mut ctx = get_context("file edit")?;
            active_project(&ctx)?;
            let path = path.unwrap_or_else(|| ctx.editor.selected().to_string());
            if path.is_empty() || !ctx.editor.select_file(&path) {
                return Err(anyhow!("File '{}' not found", path));
            }

            if live {
                return edit_live(&mut ctx, &path).await;
            }

            let content = match from {
                Some(file) => std::fs::read_to_string(&file)?,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };

            ctx.editor.update_content(&path, &content);
            finish(&mut ctx)?;
            output::success(&format!("Saved {}", path));
        }
    }

    Ok(())
}

/// Append stdin lines to `path` until EOF, autosaving after each pause
async fn edit_live(ctx: &mut StudioContext, path: &str) -> Result<()> {
    output::info(&format!(
        "Editing {} - type lines, Ctrl-D to finish (autosave after {}ms)",
        path, ctx.config.autosave_delay_ms
    ));

    let stdin = BufReader::new(tokio::io::stdin());
    live_edit(&mut ctx.editor, path, stdin, |saved| {
        if saved {
            output::info(SaveState::Saved.label());
        } else {
            output::error("Autosave failed; edits are kept in memory");
        }
    })
    .await?;

    finish(ctx)?;
    output::success(&format!("Saved {}", path));
    Ok(())
}

/// Feed `input` line by line into `path`, flushing whenever the editor's
/// autosave comes due. `on_flush` sees the outcome of every flush.
///
/// Returns at end of input; a flush still pending at that point is left to
/// the caller.
async fn live_edit<R, F>(
    editor: &mut EditorService,
    path: &str,
    input: R,
    mut on_flush: F,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(bool),
{
    enum Event {
        Line(std::io::Result<Option<String>>),
        Flushed(bool),
    }

    let mut content = editor
        .active()
        .and_then(|p| p.files.get(path))
        .map(|node| node.code.clone())
        .unwrap_or_default();
    let mut lines = input.lines();

    loop {
        let event = tokio::select! {
            line = lines.next_line() => Event::Line(line),
            saved = editor.next_autosave() => Event::Flushed(saved),
        };

        match event {
            Event::Line(Ok(Some(line))) => {
                if !content.is_empty() && !content.ends_with('\n') {
                    content.push('\n');
                }
                content.push_str(&line);
                editor.update_content(path, &content);
            }
            Event::Line(Ok(None)) => return Ok(()),
            Event::Line(Err(e)) => return Err(e.into()),
            Event::Flushed(saved) => on_flush(saved),
        }
    }
}

fn active_project(ctx: &StudioContext) -> Result<&Project> {
    ctx.editor
        .active()
        .ok_or_else(|| anyhow!("No project is open; run `cs project new`"))
}

fn highlight(ctx: &StudioContext, path: &str, label: &str) -> String {
    if path == ctx.editor.selected() {
        format!("{} {}", ">".green(), label.bold())
    } else {
        format!("  {}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use cipherstudio_core::adapters::memory::MemoryStore;
    use cipherstudio_core::config::Config;
    use tokio::io::AsyncWriteExt;
    use tokio::time::{sleep, Instant};

    #[test]
    fn test_rename_paths_are_trimmed_on_both_sides() {
        let mut ctx =
            StudioContext::with_store(Config::default(), Arc::new(MemoryStore::new()), None);
        let command = FileCommands::Rename {
            old_path: " App.jsx".to_string(),
            new_path: "Main.jsx ".to_string(),
        }
        .trimmed();

        let FileCommands::Rename { old_path, new_path } = command else {
            panic!("expected a rename");
        };
        assert!(ctx.editor.rename_file(&old_path, &new_path));
        assert_eq!(ctx.editor.selected(), "Main.jsx");
    }

    #[test]
    fn test_optional_paths_stay_unset() {
        let command = FileCommands::Show { path: None }.trimmed();
        assert!(matches!(command, FileCommands::Show { path: None }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_edit_saves_during_pauses() {
        let store = Arc::new(MemoryStore::new());
        let mut ctx = StudioContext::with_store(Config::default(), store.clone(), None);
        let (mut typist, keyboard) = tokio::io::duplex(64);

        let typing = tokio::spawn(async move {
            typist.write_all(b"// one\n").await.unwrap();
            sleep(Duration::from_millis(1500)).await;
            typist.write_all(b"// two\n").await.unwrap();
        });

        let start = Instant::now();
        let mut flushes = Vec::new();
        live_edit(&mut ctx.editor, "App.jsx", BufReader::new(keyboard), |saved| {
            flushes.push((saved, start.elapsed()))
        })
        .await
        .unwrap();
        typing.await.unwrap();

        // One save in the pause after the first line; the second line is
        // still waiting for its window when input ends
        assert_eq!(flushes, vec![(true, Duration::from_millis(1000))]);
        assert_eq!(store.write_count(), 1);
        assert!(ctx.editor.autosave_pending());

        let code = &ctx.editor.active().unwrap().files["App.jsx"].code;
        assert!(code.ends_with("// one\n// two"));

        assert!(ctx.editor.settle());
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_edit_reports_failed_save() {
        let store = Arc::new(MemoryStore::new());
        let mut ctx = StudioContext::with_store(Config::default(), store.clone(), None);
        store.fail_writes(true);

        let (mut typist, keyboard) = tokio::io::duplex(64);
        let typing = tokio::spawn(async move {
            typist.write_all(b"draft\n").await.unwrap();
            sleep(Duration::from_millis(1200)).await;
        });

        let mut flushes = Vec::new();
        live_edit(&mut ctx.editor, "App.jsx", BufReader::new(keyboard), |saved| {
            flushes.push(saved)
        })
        .await
        .unwrap();
        typing.await.unwrap();

        assert_eq!(flushes, vec![false]);
        assert_eq!(ctx.editor.save_state(), SaveState::Unsaved);
    }
}
