pub mod core;
pub mod export;
pub mod layout;
pub mod ocr;
pub mod pipeline;
pub mod translate;

pub use crate::core::config::LayoutConfig;
pub use crate::core::error::ScanLayoutError;
pub use crate::core::model::{LayoutDocument, RenderUnit, TextFragment, TextLine};
