use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Rasterizes PDF pages through poppler's `pdfinfo` / `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    out_dir: PathBuf,
    dpi: u32,
}

impl PageRenderer {
    pub fn new(out_dir: PathBuf, dpi: u32) -> Self {
        Self { out_dir, dpi }
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    pub fn page_count(&self, pdf_path: &Path) -> Result<usize> {
        let output = Command::new("pdfinfo")
            .arg(pdf_path)
            .output()
            .with_context(|| format!("failed to invoke pdfinfo on {}", pdf_path.display()))?;

        if !output.status.success() {
            anyhow::bail!("pdfinfo failed with status: {}", output.status);
        }

        parse_page_count(&String::from_utf8_lossy(&output.stdout)).with_context(|| {
            format!("pdfinfo reported no page count for {}", pdf_path.display())
        })
    }

    pub fn render_page(&self, pdf_path: &Path, page_idx: usize) -> Result<RenderedPage> {
        fs::create_dir_all(&self.out_dir)?;

        // pdftoppm uses 1-based page indices
        let page_number = page_idx + 1;
        let prefix = self.out_dir.join(format!("page_{:03}", page_number));

        let status = Command::new("pdftoppm")
            .arg("-png")
            .arg("-singlefile")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-f")
            .arg(page_number.to_string())
            .arg("-l")
            .arg(page_number.to_string())
            .arg(pdf_path)
            .arg(&prefix)
            .status()
            .with_context(|| "failed to invoke pdftoppm; is poppler-utils installed?")?;

        if !status.success() {
            anyhow::bail!("pdftoppm failed with status: {status}");
        }

        // -singlefile writes `<prefix>.png` without a page suffix
        let image_path = prefix.with_extension("png");
        if !image_path.exists() {
            anyhow::bail!(
                "expected rendered image not found: {}",
                image_path.display()
            );
        }

        let (width, height) = image::image_dimensions(&image_path)
            .with_context(|| format!("failed to read {}", image_path.display()))?;

        Ok(RenderedPage {
            path: image_path,
            width,
            height,
        })
    }
}

fn parse_page_count(pdfinfo_output: &str) -> Result<usize> {
    for line in pdfinfo_output.lines() {
        if let Some(rest) = line.strip_prefix("Pages:") {
            let num_str = rest.trim();
            return num_str.parse().with_context(|| {
                format!("failed to parse page count from 'Pages:' line: {num_str}")
            });
        }
    }
    anyhow::bail!("pdfinfo output did not contain a 'Pages:' line")
}
