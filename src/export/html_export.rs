use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::{DocumentItem, LayoutDocument, RenderUnit};
use crate::export::Exporter;

/// Single HTML file with one `<p>` per paragraph, each carrying its own
/// font size, set in a monospace face so the padded columns line up.
#[derive(Debug, Clone)]
pub struct HtmlExporter {
    out_dir: PathBuf,
    name: String,
    font_family: String,
}

impl HtmlExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self {
            out_dir,
            name: "document".to_string(),
            font_family: "Courier New".to_string(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_font_family(mut self, font_family: &str) -> Self {
        self.font_family = font_family.to_string();
        self
    }

    fn paragraph(unit: &RenderUnit) -> String {
        let text = if unit.is_blank() {
            "&nbsp;".to_string()
        } else {
            html_escape::encode_text(&unit.visible_text).into_owned()
        };
        format!(
            "<p style='font-size:{:.1}pt'>{}</p>\n",
            unit.font_size_pt, text
        )
    }

    pub fn format_document(&self, document: &LayoutDocument) -> String {
        let mut body = String::from("<div class='page'>\n");
        for item in &document.items {
            match item {
                DocumentItem::Paragraph(unit) => body.push_str(&Self::paragraph(unit)),
                DocumentItem::PageBreak => body.push_str("</div>\n<div class='page'>\n"),
            }
        }
        body.push_str("</div>\n");

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset='utf-8'>
<title>{title}</title>
<style>
body {{ margin: 2em; }}
p {{ margin: 0; white-space: pre; font-family: '{font}', monospace; }}
.page {{ page-break-after: always; break-after: page; }}
.page:last-child {{ page-break-after: auto; break-after: auto; }}
</style>
</head>
<body>
{body}</body>
</html>
"#,
            title = html_escape::encode_text(&self.name),
            font = html_escape::encode_single_quoted_attribute(&self.font_family),
            body = body,
        )
    }
}

impl Exporter for HtmlExporter {
    fn export(&self, document: &LayoutDocument) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(format!("{}.html", self.name));
        fs::write(path, self.format_document(document))?;
        Ok(())
    }
}
