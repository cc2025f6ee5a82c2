use serde::{Deserialize, Serialize};

use crate::core::geometry::BBox;

/// One recognized text span with its box.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextFragment {
    pub text: String,
    pub bbox: BBox,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }

    /// Vertical anchor used for line membership.
    pub fn anchor(&self) -> f32 {
        self.bbox.bottom()
    }
}

/// Fragments judged to sit on the same visual line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextLine {
    /// Ordered by ascending `x1`.
    pub fragments: Vec<TextFragment>,
    pub merged_box: BBox,
    /// Anchor of the fragment that opened the cluster.
    pub representative_y: f32,
    /// Member texts joined by single spaces.
    pub text: String,
}

impl TextLine {
    pub fn top(&self) -> f32 {
        self.merged_box.top()
    }

    pub fn height(&self) -> f32 {
        self.merged_box.height()
    }
}

/// One output paragraph for a document writer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderUnit {
    /// Space-padded text with ordinary spaces turned into U+00A0.
    pub visible_text: String,
    pub font_size_pt: f32,
}

impl RenderUnit {
    pub fn blank(font_size_pt: f32) -> Self {
        Self {
            visible_text: String::new(),
            font_size_pt,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.visible_text.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentItem {
    Paragraph(RenderUnit),
    PageBreak,
}

/// Ordered paragraph stream accumulated across pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LayoutDocument {
    pub items: Vec<DocumentItem>,
    pub page_count: usize,
}

impl LayoutDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one page's units, separated from the previous page by a break.
    pub fn push_page(&mut self, units: Vec<RenderUnit>) {
        if self.page_count > 0 {
            self.items.push(DocumentItem::PageBreak);
        }
        self.items
            .extend(units.into_iter().map(DocumentItem::Paragraph));
        self.page_count += 1;
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &RenderUnit> {
        self.items.iter().filter_map(|item| match item {
            DocumentItem::Paragraph(unit) => Some(unit),
            DocumentItem::PageBreak => None,
        })
    }
}
