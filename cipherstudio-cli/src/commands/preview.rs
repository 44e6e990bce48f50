//! Preview command - hand the open project to the preview sandbox

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;

use cipherstudio_core::adapters::bundle::BundlePreview;

use super::{emit_json, get_context};
use crate::output;

pub fn run(out: Option<PathBuf>, template: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context("preview")?;
    let out = match out {
        Some(path) => path,
        None => super::get_data_dir()?.join("preview").join("sandbox.json"),
    };
    let template = template.unwrap_or_else(|| ctx.config.preview_template.clone());

    let sandbox = BundlePreview::new(&out);
    let result = ctx.editor.preview(&sandbox, &template);

    if json {
        return emit_json(result);
    }
    let result = result?;

    output::success(&format!(
        "Prepared {} files for the {} sandbox",
        result.file_count, result.template
    ));
    if let Some(location) = result.location {
        println!("  {}", location.dimmed());
    }
    Ok(())
}
