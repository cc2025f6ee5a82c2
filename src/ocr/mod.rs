pub mod adapter;
pub mod bridge;
pub mod renderer;

use anyhow::Result;
use std::path::Path;

pub use adapter::{OcrPayload, RawBox, RawItem};
pub use bridge::CommandOcrEngine;
pub use renderer::{PageRenderer, RenderedPage};

/// Text recognizer for one rasterized page.
pub trait OcrEngine {
    fn recognize(&self, image: &Path) -> Result<OcrPayload>;
}
