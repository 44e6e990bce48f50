//! Project command - list, create, open, rename and delete projects

use anyhow::{anyhow, Result};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::{Confirm, Input};

use super::{emit_json, finish, get_context};
use crate::output;

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List all projects, most recent first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new project and open it
    New {
        /// Name for the project (defaults to "Project N")
        #[arg(long)]
        name: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Open a project
    Open {
        /// Project ID
        id: String,
    },
    /// Rename a project
    Rename {
        /// Project ID
        id: String,
        /// New name (prompted if omitted)
        name: Option<String>,
    },
    /// Delete a project
    Delete {
        /// Project ID
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}

pub fn run(command: ProjectCommands) -> Result<()> {
    match command {
        ProjectCommands::List { json } => {
            let ctx = get_context("project list")?;
            let summaries = ctx.editor.project_summaries();

            if json {
                return emit_json(Ok(summaries));
            }

            let mut table = output::create_table();
            table.set_header(vec!["", "ID", "Name", "Files"]);
            for summary in summaries {
                let marker = if summary.active {
                    "*".green().to_string()
                } else {
                    String::new()
                };
                table.add_row(vec![
                    marker,
                    summary.id,
                    summary.name,
                    summary.file_count.to_string(),
                ]);
            }
            println!("{}", table);
        }
        ProjectCommands::New { name, json } => {
            let mut ctx = get_context("project new")?;
            let created = ctx.editor.new_project()?;
            if let Some(name) = name.as_deref() {
                ctx.editor.rename_project(&created.id, name)?;
            }
            finish(&mut ctx)?;

            let summary = ctx
                .editor
                .project_summaries()
                .into_iter()
                .find(|s| s.id == created.id)
                .ok_or_else(|| anyhow!("Created project disappeared"))?;

            if json {
                return emit_json(Ok(summary));
            }
            output::success(&format!("Created '{}' ({})", summary.name, summary.id));
        }
        ProjectCommands::Open { id } => {
            let mut ctx = get_context("project open")?;
            ctx.editor.open_project(&id)?;
            finish(&mut ctx)?;

            let name = ctx.editor.active().map(|p| p.name.clone()).unwrap_or_default();
            output::success(&format!("Opened '{}'", name));
        }
        ProjectCommands::Rename { id, name } => {
            let mut ctx = get_context("project rename")?;
            let current = ctx
                .editor
                .projects()
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.name.clone())
                .ok_or_else(|| anyhow!("Project '{}' not found", id))?;

            let new_name = match name {
                Some(name) => name,
                None => Input::<String>::new()
                    .with_prompt("New name")
                    .with_initial_text(current.clone())
                    .interact_text()?,
            };

            if new_name.trim().is_empty() {
                output::warning("Name is blank; nothing changed");
                return Ok(());
            }

            ctx.editor.rename_project(&id, &new_name)?;
            finish(&mut ctx)?;
            output::success(&format!("Renamed '{}' to '{}'", current, new_name));
        }
        ProjectCommands::Delete { id, force } => {
            let mut ctx = get_context("project delete")?;
            let name = ctx
                .editor
                .projects()
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.name.clone())
                .ok_or_else(|| anyhow!("Project '{}' not found", id))?;

            if !force {
                println!(
                    "\n{}",
                    format!("This will delete '{}' and all of its files.", name).yellow()
                );
                if !Confirm::new()
                    .with_prompt("Are you sure?")
                    .default(false)
                    .interact()?
                {
                    println!("{}", "Cancelled".dimmed());
                    return Ok(());
                }
            }

            ctx.editor.delete_project(&id)?;
            finish(&mut ctx)?;
            output::success(&format!("Deleted '{}'", name));

            match ctx.editor.active() {
                Some(active) => output::info(&format!("Now editing '{}'", active.name)),
                None => output::info("No projects left; run `cs project new`"),
            }
        }
    }

    Ok(())
}
