//! Save command - persist the open project now

use std::collections::HashMap;

use anyhow::Result;

use cipherstudio_core::{OperationResult, StudioContext, StudioStatus};

use super::{emit_json, finish, get_context};
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let mut ctx = get_context("save")?;
    let saved = save(&mut ctx);

    if json {
        if let Err(e) = saved {
            return emit_json::<StudioStatus>(Err(e));
        }
        let mut context = HashMap::new();
        context.insert(
            "namespace".to_string(),
            serde_json::json!(ctx.config.namespace),
        );
        return output::json(&OperationResult::ok_with_context(ctx.editor.status(), context));
    }

    saved?;
    output::success(ctx.editor.status().save_label);
    Ok(())
}

fn save(ctx: &mut StudioContext) -> Result<()> {
    ctx.editor.save()?;
    finish(ctx)
}
