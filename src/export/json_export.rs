use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::LayoutDocument;
use crate::export::Exporter;

#[derive(Debug, Clone)]
pub struct JsonExporter {
    out_dir: PathBuf,
    name: String,
}

impl JsonExporter {
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
}

impl Exporter for JsonExporter {
    fn export(&self, document: &LayoutDocument) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(format!("{}.json", self.name));
        let data = serde_json::to_string_pretty(document)?;
        fs::write(path, data)?;
        Ok(())
    }
}
