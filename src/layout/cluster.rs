//! Groups unordered fragments into physical text lines.
//!
//! Fragments are sorted by `(bottom edge, x1)` and walked once. A cluster's
//! anchor is the bottom edge of the fragment that opened it and is never
//! recomputed, so a slightly slanted line cannot drag the anchor along with
//! it. The price is sensitivity to near-ties in the sort order.

use std::cmp::Ordering;

use tracing::debug;

use crate::core::geometry::BBox;
use crate::core::model::{TextFragment, TextLine};

fn by_anchor_then_left(a: &TextFragment, b: &TextFragment) -> Ordering {
    a.anchor()
        .total_cmp(&b.anchor())
        .then_with(|| a.bbox.x1.total_cmp(&b.bbox.x1))
}

/// Clusters `fragments` into lines ordered top to bottom.
///
/// Two fragments share a line when their anchors differ by at most
/// `y_tolerance` pixels from the cluster's first anchor. Fragments with
/// non-finite coordinates are ignored.
pub fn cluster(fragments: &[TextFragment], y_tolerance: f32) -> Vec<TextLine> {
    let mut sorted: Vec<&TextFragment> = fragments
        .iter()
        .filter(|fragment| fragment.bbox.is_finite())
        .collect();
    if sorted.len() < fragments.len() {
        debug!(
            skipped = fragments.len() - sorted.len(),
            "ignoring fragments with non-finite boxes"
        );
    }
    if sorted.is_empty() {
        return Vec::new();
    }
    sorted.sort_by(|a, b| by_anchor_then_left(a, b));

    let mut lines = Vec::new();
    let mut current: Vec<TextFragment> = Vec::new();
    let mut anchor = sorted[0].anchor();

    for fragment in sorted {
        if current.is_empty() || (fragment.anchor() - anchor).abs() <= y_tolerance {
            current.push(fragment.clone());
            continue;
        }
        lines.push(close_line(std::mem::take(&mut current), anchor));
        anchor = fragment.anchor();
        current.push(fragment.clone());
    }
    if !current.is_empty() {
        lines.push(close_line(current, anchor));
    }

    debug!(fragments = fragments.len(), lines = lines.len(), "clustered page");
    lines
}

fn close_line(mut fragments: Vec<TextFragment>, anchor: f32) -> TextLine {
    fragments.sort_by(|a, b| a.bbox.x1.total_cmp(&b.bbox.x1));

    let merged_box = fragments
        .iter()
        .skip(1)
        .fold(fragments[0].bbox, |acc: BBox, f| acc.union(&f.bbox));
    let text = fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    TextLine {
        fragments,
        merged_box,
        representative_y: anchor,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frag(text: &str, x1: f32, y1: f32, x2: f32, y2: f32) -> TextFragment {
        TextFragment::new(text, BBox::new(x1, y1, x2, y2))
    }

    fn texts(lines: &[TextLine]) -> Vec<Vec<&str>> {
        lines
            .iter()
            .map(|line| line.fragments.iter().map(|f| f.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn empty_input_yields_no_lines() {
        assert!(cluster(&[], 25.0).is_empty());
    }

    #[test]
    fn groups_reference_scenario() {
        let fragments = vec![
            frag("A", 0.0, 0.0, 10.0, 10.0),
            frag("B", 50.0, 2.0, 60.0, 12.0),
            frag("C", 0.0, 40.0, 10.0, 50.0),
        ];
        let lines = cluster(&fragments, 10.0);

        assert_eq!(texts(&lines), vec![vec!["A", "B"], vec!["C"]]);
        assert_eq!(lines[0].text, "A B");
        assert_eq!(lines[0].merged_box, BBox::new(0.0, 0.0, 60.0, 12.0));
        assert_eq!(lines[0].representative_y, 10.0);
        assert_eq!(lines[1].representative_y, 50.0);
    }

    #[test]
    fn tolerance_boundary_is_inclusive() {
        let at_edge = vec![
            frag("a", 0.0, 0.0, 5.0, 10.0),
            frag("b", 10.0, 0.0, 15.0, 35.0),
        ];
        assert_eq!(cluster(&at_edge, 25.0).len(), 1);

        let past_edge = vec![
            frag("a", 0.0, 0.0, 5.0, 10.0),
            frag("b", 10.0, 0.0, 15.0, 35.5),
        ];
        assert_eq!(cluster(&past_edge, 25.0).len(), 2);
    }

    #[test]
    fn anchor_stays_on_first_fragment() {
        let fragments = vec![
            frag("c", 20.0, 0.0, 25.0, 15.0),
            frag("a", 0.0, -10.0, 5.0, 0.0),
            frag("b", 10.0, 0.0, 15.0, 14.0),
        ];
        let lines = cluster(&fragments, 15.0);

        assert_eq!(texts(&lines), vec![vec!["a", "b", "c"]]);
        assert_eq!(lines[0].representative_y, 0.0);
    }

    #[test]
    fn anchor_does_not_follow_later_members() {
        // Anchors 0, 10, 20: a previous-fragment or mean anchor would absorb
        // the third fragment, the first anchor does not.
        let fragments = vec![
            frag("a", 0.0, -10.0, 5.0, 0.0),
            frag("b", 10.0, 0.0, 15.0, 10.0),
            frag("c", 20.0, 10.0, 25.0, 20.0),
        ];
        let lines = cluster(&fragments, 15.0);

        assert_eq!(texts(&lines), vec![vec!["a", "b"], vec!["c"]]);
        assert_eq!(lines[1].representative_y, 20.0);

        let spread = vec![
            frag("a", 0.0, -10.0, 5.0, 0.0),
            frag("b", 10.0, 0.0, 15.0, 12.0),
            frag("c", 20.0, 10.0, 25.0, 24.0),
        ];
        assert_eq!(texts(&cluster(&spread, 15.0)), vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn orders_members_left_to_right() {
        let fragments = vec![
            frag("right", 300.0, 0.0, 340.0, 20.0),
            frag("left", 10.0, 2.0, 60.0, 22.0),
            frag("middle", 150.0, 1.0, 200.0, 18.0),
        ];
        let lines = cluster(&fragments, 25.0);

        assert_eq!(lines.len(), 1);
        let xs: Vec<f32> = lines[0].fragments.iter().map(|f| f.bbox.x1).collect();
        assert!(xs.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(lines[0].text, "left middle right");
    }

    #[test]
    fn lines_come_out_top_to_bottom() {
        let fragments = vec![
            frag("third", 0.0, 200.0, 40.0, 220.0),
            frag("first", 0.0, 0.0, 40.0, 20.0),
            frag("second", 0.0, 100.0, 40.0, 120.0),
        ];
        let lines = cluster(&fragments, 25.0);

        assert_eq!(texts(&lines), vec![vec!["first"], vec!["second"], vec!["third"]]);
        let tops: Vec<f32> = lines.iter().map(|l| l.merged_box.y1).collect();
        assert!(tops.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn is_deterministic() {
        let fragments = vec![
            frag("x", 40.0, 0.0, 50.0, 10.0),
            frag("y", 40.0, 0.0, 50.0, 10.0),
            frag("z", 0.0, 5.0, 10.0, 10.0),
        ];
        let first = cluster(&fragments, 5.0);
        for _ in 0..10 {
            assert_eq!(cluster(&fragments, 5.0), first);
        }
    }

    #[test]
    fn skips_non_finite_boxes() {
        let fragments = vec![
            frag("ok", 0.0, 0.0, 10.0, 10.0),
            frag("bad", f32::NAN, 0.0, 10.0, 10.0),
        ];
        let lines = cluster(&fragments, 25.0);
        assert_eq!(texts(&lines), vec![vec!["ok"]]);
    }
}
