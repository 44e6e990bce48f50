//! Preview sandbox port
//!
//! The sandbox consumes a project's files verbatim together with a template
//! selector. What happens inside is opaque to the core.

use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::FileMap;

/// Template used when none is configured
pub const DEFAULT_TEMPLATE: &str = "react";

/// Payload handed to the sandbox
#[derive(Debug, Serialize)]
pub struct SandboxBundle<'a> {
    pub template: &'a str,
    pub files: &'a FileMap,
}

/// What the sandbox reports back
#[derive(Debug, Clone, Serialize)]
pub struct PreviewResult {
    pub template: String,
    pub file_count: usize,
    /// Where the rendered preview can be found, if the sandbox exposes one
    pub location: Option<String>,
}

pub trait PreviewSandbox: Send + Sync {
    /// Render a preview of `bundle`
    fn render(&self, bundle: &SandboxBundle<'_>) -> Result<PreviewResult>;
}
