pub mod html_export;
pub mod json_export;
pub mod text_export;

use anyhow::Result;

use crate::core::model::LayoutDocument;

pub use html_export::HtmlExporter;
pub use json_export::JsonExporter;
pub use text_export::TextExporter;

/// Writes a paragraph stream to some document format.
pub trait Exporter {
    fn export(&self, document: &LayoutDocument) -> Result<()>;
}
