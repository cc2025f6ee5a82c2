//! Normalizes the shapes OCR engines emit into [`TextFragment`]s.
//!
//! Accepted payloads:
//! - a list of `{"text": .., "bbox": ..}` objects, `[box, text]` pairs
//!   (optionally `[box, [text, score]]`) or `[text, box]` pairs;
//! - parallel `rec_boxes` / `rec_texts` arrays.
//!
//! A box is either flat `[x1, y1, x2, y2, ..]` or a 4-point polygon
//! `[[x, y], ..]` ordered top-left, top-right, bottom-right, bottom-left.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::geometry::BBox;
use crate::core::model::TextFragment;
use crate::core::text::normalize_text;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawBox {
    Polygon(Vec<Vec<f32>>),
    Flat(Vec<f32>),
    Other(serde_json::Value),
}

impl RawBox {
    /// Reduces the raw shape to an axis-aligned box; `None` when too short.
    pub fn to_bbox(&self) -> Option<BBox> {
        match self {
            RawBox::Flat(coords) if coords.len() >= 4 => {
                BBox::from_corners(coords[0], coords[1], coords[2], coords[3])
            }
            RawBox::Polygon(points) if points.len() >= 4 => {
                let (top_left, top_right, bottom_left) = (&points[0], &points[1], &points[3]);
                if top_left.len() < 2 || top_right.is_empty() || bottom_left.len() < 2 {
                    return None;
                }
                BBox::from_corners(top_left[0], top_left[1], top_right[0], bottom_left[1])
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawText {
    Plain(String),
    Scored(String, f32),
}

impl RawText {
    fn as_str(&self) -> &str {
        match self {
            RawText::Plain(text) | RawText::Scored(text, _) => text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawItem {
    BoxFirst(Option<RawBox>, RawText),
    TextFirst(String, Option<RawBox>),
    Object {
        text: String,
        #[serde(default, alias = "box")]
        bbox: Option<RawBox>,
    },
    Other(serde_json::Value),
}

impl RawItem {
    fn parts(&self) -> Option<(&str, Option<&RawBox>)> {
        match self {
            RawItem::Object { text, bbox } => Some((text, bbox.as_ref())),
            RawItem::BoxFirst(bbox, text) => Some((text.as_str(), bbox.as_ref())),
            RawItem::TextFirst(text, bbox) => Some((text, bbox.as_ref())),
            RawItem::Other(_) => None,
        }
    }
}

/// One page of OCR output as delivered by an engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OcrPayload {
    Pairs(Vec<RawItem>),
    Parallel {
        rec_boxes: Vec<Option<RawBox>>,
        rec_texts: Vec<String>,
    },
}

impl OcrPayload {
    pub fn into_fragments(self) -> Vec<TextFragment> {
        match self {
            OcrPayload::Pairs(items) => fragments_from_pairs(&items),
            OcrPayload::Parallel {
                rec_boxes,
                rec_texts,
            } => fragments_from_parallel(&rec_boxes, &rec_texts),
        }
    }
}

fn make_fragment(text: &str, raw: Option<&RawBox>) -> Option<TextFragment> {
    let bbox = raw?.to_bbox()?;
    Some(TextFragment::new(normalize_text(text), bbox))
}

/// Converts `(text, box)` items, silently dropping entries whose box is
/// missing, short or non-finite.
pub fn fragments_from_pairs(items: &[RawItem]) -> Vec<TextFragment> {
    let fragments: Vec<TextFragment> = items
        .iter()
        .filter_map(RawItem::parts)
        .filter_map(|(text, raw)| make_fragment(text, raw))
        .collect();
    if fragments.len() < items.len() {
        debug!(
            skipped = items.len() - fragments.len(),
            "dropped malformed OCR entries"
        );
    }
    fragments
}

/// Zips parallel box and text arrays. Unequal lengths yield nothing at all,
/// since there is no safe way to realign them.
pub fn fragments_from_parallel(boxes: &[Option<RawBox>], texts: &[String]) -> Vec<TextFragment> {
    if boxes.len() != texts.len() {
        warn!(
            boxes = boxes.len(),
            texts = texts.len(),
            "OCR box and text counts differ; discarding page content"
        );
        return Vec::new();
    }
    boxes
        .iter()
        .zip(texts)
        .filter_map(|(raw, text)| make_fragment(text, raw.as_ref()))
        .collect()
}
