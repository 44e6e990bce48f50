//! CLI command implementations

pub mod auth;
pub mod file;
pub mod logs;
pub mod preview;
pub mod project;
pub mod save;
pub mod status;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;

use cipherstudio_core::{EntryPoint, LogEvent, OperationResult, StudioContext};

use crate::output;

/// Get the CipherStudio directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CIPHERSTUDIO_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".cipherstudio"))
        .ok_or_else(|| anyhow!("Could not find home directory; set CIPHERSTUDIO_DIR"))
}

/// Open the studio context for one command
pub fn get_context(command: &str) -> Result<StudioContext> {
    let data_dir = get_data_dir()?;
    let ctx = StudioContext::new(&data_dir, EntryPoint::Cli)
        .with_context(|| format!("Failed to open CipherStudio in {:?}", data_dir))?;
    log_event(&ctx, LogEvent::new("command_executed").with_command(command));
    Ok(ctx)
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(ctx: &StudioContext, event: LogEvent) {
    if let Some(l) = &ctx.logger {
        let _ = l.log(event);
    }
}

/// End of one command: flush pending edits and remember where we are
pub fn finish(ctx: &mut StudioContext) -> Result<()> {
    if !ctx.editor.settle() {
        return Err(anyhow!("Edits could not be saved; run `cs save` to retry"));
    }
    ctx.remember_position()
}

/// Print a command's outcome in the `--json` envelope
///
/// A failure is printed as well and then returned, so the exit code still
/// reports it.
pub fn emit_json<T: Serialize>(result: Result<T>) -> Result<()> {
    match result {
        Ok(data) => output::json(&OperationResult::ok(data)),
        Err(e) => {
            output::json(&OperationResult::<T>::fail(format!("{:#}", e)))?;
            Err(e)
        }
    }
}
