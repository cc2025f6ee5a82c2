use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::ocr::adapter::OcrPayload;
use crate::ocr::OcrEngine;

/// Runs an external recognizer that prints one JSON [`OcrPayload`] on stdout.
///
/// Invoked as `<program> [args..] --image <path> --lang <lang>`.
#[derive(Debug, Clone)]
pub struct CommandOcrEngine {
    program: PathBuf,
    args: Vec<String>,
    lang: String,
}

impl CommandOcrEngine {
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            lang: "korean".to_string(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_lang(mut self, lang: String) -> Self {
        self.lang = lang;
        self
    }
}

impl OcrEngine for CommandOcrEngine {
    fn recognize(&self, image_path: &Path) -> Result<OcrPayload> {
        debug!(program = %self.program.display(), image = %image_path.display(), "running OCR");
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--image")
            .arg(image_path)
            .arg("--lang")
            .arg(&self.lang)
            .output()
            .with_context(|| format!("failed to invoke OCR command {}", self.program.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("OCR command failed ({}): {stderr}", output.status);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let payload: OcrPayload =
            serde_json::from_str(&stdout).with_context(|| "failed to parse OCR JSON output")?;
        Ok(payload)
    }
}
