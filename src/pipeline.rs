use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::core::config::LayoutConfig;
use crate::core::model::{LayoutDocument, RenderUnit, TextFragment};
use crate::export::{Exporter, HtmlExporter, JsonExporter, TextExporter};
use crate::layout::{cluster, render};
use crate::ocr::{OcrEngine, PageRenderer};
use crate::translate::{translate_page, Translator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

/// Clusters and renders one page.
pub fn layout_page(fragments: &[TextFragment], config: &LayoutConfig) -> Vec<RenderUnit> {
    let lines = cluster(fragments, config.cluster.y_tolerance);
    render(&lines, &config.render)
}

/// Lays out every page that was recognized. A page given as `Err` is logged
/// and left out; it does not stop the pages after it.
pub fn build_document<I>(pages: I, config: &LayoutConfig) -> LayoutDocument
where
    I: IntoIterator<Item = Result<Vec<TextFragment>>>,
{
    let mut document = LayoutDocument::new();
    for (page_idx, page) in pages.into_iter().enumerate() {
        match page {
            Ok(fragments) => {
                let units = layout_page(&fragments, config);
                info!(
                    page = page_idx + 1,
                    fragments = fragments.len(),
                    units = units.len(),
                    "laid out page"
                );
                document.push_page(units);
            }
            Err(err) => warn!(page = page_idx + 1, error = %format!("{err:#}"), "skipping page"),
        }
    }
    document
}

/// Translates and lays out each page. Pages whose translation fails are left
/// out of the translated document only.
pub fn build_translated_document(
    pages: &[Vec<TextFragment>],
    translator: &dyn Translator,
    config: &LayoutConfig,
) -> LayoutDocument {
    let mut document = LayoutDocument::new();
    for (page_idx, fragments) in pages.iter().enumerate() {
        let translated = translate_page(translator, fragments, &config.translate);
        if translated.is_empty() && !fragments.is_empty() {
            warn!(page = page_idx + 1, "translation failed; page omitted");
            continue;
        }
        let units = layout_page(&translated, config);
        debug!(page = page_idx + 1, units = units.len(), "laid out translated page");
        document.push_page(units);
    }
    document
}

/// Lays out every page and, when a translator is given, the translation of
/// each page that was recognized. Failed pages are skipped in both documents.
pub fn build_documents(
    pages: Vec<Result<Vec<TextFragment>>>,
    translator: Option<&dyn Translator>,
    config: &LayoutConfig,
) -> (LayoutDocument, Option<LayoutDocument>) {
    let mut recognized = Vec::with_capacity(pages.len());
    let document = build_document(
        pages.into_iter().map(|page| {
            if let Ok(fragments) = &page {
                recognized.push(fragments.clone());
            }
            page
        }),
        config,
    );
    let translated =
        translator.map(|translator| build_translated_document(&recognized, translator, config));
    (document, translated)
}

/// Rasterizes every page of `pdf_path` and runs OCR on it. The outer error
/// covers only the page count; each page carries its own result.
pub fn recognize_pdf(
    pdf_path: &Path,
    renderer: &PageRenderer,
    engine: &dyn OcrEngine,
) -> Result<Vec<Result<Vec<TextFragment>>>> {
    let page_count = renderer.page_count(pdf_path)?;
    info!(pages = page_count, dpi = renderer.dpi(), "recognizing PDF");

    let pages = (0..page_count)
        .map(|page_idx| {
            let rendered = renderer.render_page(pdf_path, page_idx)?;
            debug!(
                page = page_idx + 1,
                width = rendered.width,
                height = rendered.height,
                "rendered page"
            );
            let payload = engine
                .recognize(&rendered.path)
                .with_context(|| format!("OCR failed on page {}", page_idx + 1))?;
            Ok(payload.into_fragments())
        })
        .collect();
    Ok(pages)
}

pub fn export_document(
    document: &LayoutDocument,
    output: &Path,
    name: &str,
    formats: &[OutputFormat],
    config: &LayoutConfig,
) -> Result<()> {
    for format in formats {
        let exporter: Box<dyn Exporter> = match format {
            OutputFormat::Text => Box::new(TextExporter::new(output.to_path_buf()).with_name(name)),
            OutputFormat::Json => Box::new(JsonExporter::new(output.to_path_buf()).with_name(name)),
            OutputFormat::Html => Box::new(
                HtmlExporter::new(output.to_path_buf())
                    .with_name(name)
                    .with_font_family(&config.render.font_family),
            ),
        };
        exporter.export(document)?;
    }
    Ok(())
}
