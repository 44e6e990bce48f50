//! Preview sandbox that writes the sandbox payload to disk
//!
//! The JSON file is exactly what an embedded sandbox consumes:
//! `{ "template": "...", "files": { path: { "code", "type" } } }`.

use std::fs;
use std::path::PathBuf;

use crate::domain::result::Result;
use crate::ports::{PreviewResult, PreviewSandbox, SandboxBundle};

pub struct BundlePreview {
    output_path: PathBuf,
}

impl BundlePreview {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }
}

impl PreviewSandbox for BundlePreview {
    fn render(&self, bundle: &SandboxBundle<'_>) -> Result<PreviewResult> {
        if let Some(parent) = self.output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(bundle)?;
        fs::write(&self.output_path, content)?;

        Ok(PreviewResult {
            template: bundle.template.to_string(),
            file_count: bundle.files.len(),
            location: Some(self.output_path.display().to_string()),
        })
    }
}
