//! Status command - what the status bar would show

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use cipherstudio_core::SaveState;

use super::{emit_json, get_context};

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context("status")?;
    let status = ctx.editor.status();

    if json {
        return emit_json(Ok(status));
    }

    println!("{}", "CipherStudio".bold());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let project = status.project_name.clone().unwrap_or_else(|| "(none)".to_string());
    let save_label = match status.save_state {
        SaveState::Saved => status.save_label.green().to_string(),
        SaveState::Unsaved => status.save_label.yellow().to_string(),
    };
    let selected = match (&status.selected_file, status.selected_lines) {
        (Some(path), Some(lines)) => format!("{} ({} lines)", path, lines),
        _ => "(none)".to_string(),
    };

    table.add_row(vec!["Project".to_string(), project]);
    table.add_row(vec!["Files".to_string(), status.file_count.to_string()]);
    table.add_row(vec!["Selected".to_string(), selected]);
    table.add_row(vec!["Changes".to_string(), save_label]);
    table.add_row(vec!["Projects".to_string(), status.project_count_label()]);

    println!("{}", table);

    match ctx.session.current() {
        Some(identity) => println!("Signed in as {}", identity.username.cyan()),
        None => println!("{}", "Not signed in".dimmed()),
    }

    Ok(())
}
