//! CipherStudio CLI - projects and files in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{auth, file, logs, preview, project, save, status};

/// CipherStudio - projects and files in your terminal
#[derive(Parser)]
#[command(name = "cs", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the open project, selection and save state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage projects
    Project {
        #[command(subcommand)]
        command: project::ProjectCommands,
    },

    /// Work with files of the open project
    File {
        #[command(subcommand)]
        command: file::FileCommands,
    },

    /// Save the open project now
    Save {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Prepare the open project for the preview sandbox
    Preview {
        /// Where to write the sandbox payload
        #[arg(long)]
        out: Option<PathBuf>,
        /// Sandbox template (defaults to preview.template in settings)
        #[arg(long)]
        template: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign in
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create an account
    Register {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Status { json } => status::run(json),
        Commands::Project { command } => project::run(command),
        Commands::File { command } => file::run(command).await,
        Commands::Save { json } => save::run(json),
        Commands::Preview { out, template, json } => preview::run(out, template, json),
        Commands::Login { email, password, json } => auth::login(email, password, json).await,
        Commands::Register { email, username, password, json } => {
            auth::register(email, username, password, json).await
        }
        Commands::Logout => auth::logout(),
        Commands::Whoami { json } => auth::whoami(json),
        Commands::Logs { command } => logs::run(command),
    }
}
