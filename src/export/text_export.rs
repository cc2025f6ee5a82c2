use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::{DocumentItem, LayoutDocument};
use crate::export::Exporter;

/// Plain UTF-8 text: one line per paragraph, a form feed per page break.
/// Non-breaking spaces are written as-is.
#[derive(Debug, Clone)]
pub struct TextExporter {
    out_dir: PathBuf,
    name: String,
}

impl TextExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self {
            out_dir,
            name: "document".to_string(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn format_document(document: &LayoutDocument) -> String {
        let mut text = String::new();
        for item in &document.items {
            match item {
                DocumentItem::Paragraph(unit) => text.push_str(&unit.visible_text),
                DocumentItem::PageBreak => text.push('\u{c}'),
            }
            text.push('\n');
        }
        text
    }
}

impl Exporter for TextExporter {
    fn export(&self, document: &LayoutDocument) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(format!("{}.txt", self.name));
        fs::write(path, Self::format_document(document))?;
        Ok(())
    }
}
