//! Turns clustered lines into fixed-pitch paragraphs.
//!
//! Horizontal offsets become leading spaces on a character grid whose pitch
//! comes from [`RenderConfig::pixels_per_char`], vertical gaps become blank
//! paragraphs, and each paragraph carries a font size derived from the
//! median fragment height of its line.

use tracing::debug;

use crate::core::config::RenderConfig;
use crate::core::model::{RenderUnit, TextLine};
use crate::core::text::text_columns;

const NBSP: &str = "\u{a0}";

/// Where one fragment landed on the character grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Column derived from the fragment's left edge.
    pub column: usize,
    /// Spaces inserted before the fragment.
    pub padding: usize,
}

pub fn render(lines: &[TextLine], config: &RenderConfig) -> Vec<RenderUnit> {
    let mut units = Vec::with_capacity(lines.len());
    // (top, height, font size) of the previously emitted line
    let mut previous: Option<(f32, f32, f32)> = None;

    for line in lines {
        let font_size_pt = font_size_for(line, config);

        if let Some((prev_top, prev_height, prev_font)) = previous {
            let blanks = blank_rows(prev_top, prev_height, line.top(), config.gap_factor)
                .min(config.max_blank_rows);
            units.extend((0..blanks).map(|_| RenderUnit::blank(prev_font)));
        }

        units.push(RenderUnit {
            visible_text: compose_line(line, config),
            font_size_pt,
        });
        previous = Some((line.top(), line.height(), font_size_pt));
    }

    debug!(lines = lines.len(), units = units.len(), "rendered page");
    units
}

/// Number of empty paragraphs standing in for the gap between two lines,
/// using the previous line's height as the row unit. Callers cap the result;
/// an unbounded gap saturates rather than wrapping.
pub fn blank_rows(prev_top: f32, prev_height: f32, current_top: f32, gap_factor: f32) -> usize {
    let gap = current_top - (prev_top + prev_height);
    if !(gap > prev_height * gap_factor) {
        return 0;
    }
    let rows = (gap / prev_height.max(1.0)).round() - 1.0;
    if rows > 0.0 {
        rows as usize
    } else {
        0
    }
}

/// Grid placement of each fragment in `line`, left to right.
///
/// Padding never goes negative: a fragment that overlaps the text before it
/// is appended directly instead of rewinding the line. Columns are clamped
/// to `max_columns`.
pub fn place_fragments(line: &TextLine, config: &RenderConfig) -> Vec<Placement> {
    let pitch = config.pixels_per_char();
    let max_column = config.max_columns as f32;
    let mut cursor = 0usize;

    line.fragments
        .iter()
        .map(|fragment| {
            let column = (fragment.bbox.x1 / pitch).round().clamp(0.0, max_column) as usize;
            let padding = column.saturating_sub(cursor);
            cursor = column.saturating_add(text_columns(&fragment.text, config.width_mode));
            Placement { column, padding }
        })
        .collect()
}

fn compose_line(line: &TextLine, config: &RenderConfig) -> String {
    let mut composed = String::new();
    for (fragment, placement) in line.fragments.iter().zip(place_fragments(line, config)) {
        composed.extend(std::iter::repeat(' ').take(placement.padding));
        composed.push_str(&fragment.text);
    }
    composed.replace(' ', NBSP)
}

/// Median of the positive fragment heights, or 0 when there are none.
pub fn median_height(line: &TextLine) -> f32 {
    let mut heights: Vec<f32> = line
        .fragments
        .iter()
        .map(|f| f.bbox.height())
        .filter(|h| *h > 0.0)
        .collect();
    if heights.is_empty() {
        return 0.0;
    }
    heights.sort_by(f32::total_cmp);
    let mid = heights.len() / 2;
    if heights.len() % 2 == 0 {
        (heights[mid - 1] + heights[mid]) / 2.0
    } else {
        heights[mid]
    }
}

fn font_size_for(line: &TextLine, config: &RenderConfig) -> f32 {
    let size = config.px_to_pt(median_height(line)) * config.font_scale;
    if size.is_finite() {
        size.max(config.min_font_pt)
    } else {
        config.min_font_pt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::BBox;
    use crate::core::model::TextFragment;
    use crate::core::text::WidthMode;
    use crate::layout::cluster::cluster;
    use pretty_assertions::assert_eq;

    /// One column per 10 px, 72 dpi so pixels equal points.
    fn grid_config() -> RenderConfig {
        RenderConfig {
            base_font_pt: 10.0,
            pitch_ratio: 1.0,
            dpi: 72.0,
            font_scale: 1.0,
            ..RenderConfig::default()
        }
    }

    fn line(fragments: &[(&str, f32, f32, f32, f32)]) -> TextLine {
        let fragments: Vec<TextFragment> = fragments
            .iter()
            .map(|&(t, x1, y1, x2, y2)| TextFragment::new(t, BBox::new(x1, y1, x2, y2)))
            .collect();
        let mut lines = cluster(&fragments, f32::MAX);
        lines.remove(0)
    }

    #[test]
    fn pads_to_target_columns() {
        let config = grid_config();
        let row = line(&[("ab", 0.0, 0.0, 20.0, 10.0), ("cd", 50.0, 0.0, 70.0, 10.0)]);
        let units = render(&[row], &config);

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].visible_text, "ab\u{a0}\u{a0}\u{a0}cd");
    }

    #[test]
    fn replaces_every_space_with_nbsp() {
        let config = grid_config();
        let row = line(&[("a b", 20.0, 0.0, 50.0, 10.0)]);
        let units = render(&[row], &config);

        assert_eq!(units[0].visible_text, "\u{a0}\u{a0}a\u{a0}b");
        assert!(!units[0].visible_text.contains(' '));
    }

    #[test]
    fn overlapping_fragments_get_no_padding() {
        let config = grid_config();
        let row = line(&[
            ("hello", 0.0, 0.0, 50.0, 10.0),
            ("world", 20.0, 0.0, 70.0, 10.0),
            ("!", 90.0, 0.0, 100.0, 10.0),
        ]);
        let placements = place_fragments(&row, &config);

        assert_eq!(
            placements,
            vec![
                Placement { column: 0, padding: 0 },
                Placement { column: 2, padding: 0 },
                Placement { column: 9, padding: 2 },
            ]
        );
        let columns: Vec<usize> = placements.iter().map(|p| p.column).collect();
        assert!(columns.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn wide_mode_counts_cjk_twice() {
        let mut config = grid_config();
        let row = line(&[("계약", 0.0, 0.0, 40.0, 10.0), ("x", 50.0, 0.0, 60.0, 10.0)]);

        config.width_mode = WidthMode::Narrow;
        assert_eq!(place_fragments(&row, &config)[1].padding, 3);

        config.width_mode = WidthMode::Wide;
        assert_eq!(place_fragments(&row, &config)[1].padding, 1);
    }

    #[test]
    fn negative_offsets_clamp_to_first_column() {
        let config = grid_config();
        let row = line(&[("edge", -30.0, 0.0, 10.0, 10.0)]);
        assert_eq!(place_fragments(&row, &config)[0], Placement { column: 0, padding: 0 });
    }

    #[test]
    fn converts_gap_into_blank_rows() {
        assert_eq!(blank_rows(0.0, 20.0, 100.0, 1.1), 3);
        assert_eq!(blank_rows(0.0, 20.0, 42.0, 1.1), 0);
        assert_eq!(blank_rows(0.0, 20.0, 25.0, 1.1), 0);
        assert_eq!(blank_rows(0.0, 0.0, 0.5, 1.1), 0);
    }

    #[test]
    fn far_away_coordinates_stay_on_a_bounded_grid() {
        let config = RenderConfig {
            max_columns: 40,
            max_blank_rows: 5,
            ..grid_config()
        };
        let far_right = line(&[("a", 0.0, 0.0, 10.0, 10.0), ("far", 9.2e18, 0.0, 9.2e18, 10.0)]);
        let placements = place_fragments(&far_right, &config);
        assert_eq!(placements[1], Placement { column: 40, padding: 39 });

        let first = line(&[("top", 0.0, 0.0, 10.0, 10.0)]);
        let far_below = line(&[("bottom", 0.0, 1e30, 10.0, 1e30)]);
        let units = render(&[first, far_right, far_below], &config);
        assert_eq!(units.len(), 2 + 5 + 1);
        assert!(units.iter().all(|u| u.visible_text.chars().count() <= 40 + 3));
    }

    #[test]
    fn huge_gap_saturates_instead_of_wrapping() {
        assert_eq!(blank_rows(0.0, 1.0, 1e30, 1.1), usize::MAX);
        assert_eq!(blank_rows(0.0, 1.0, f32::INFINITY, 1.1), usize::MAX);
    }

    #[test]
    fn inserts_blank_paragraphs_between_distant_lines() {
        let config = grid_config();
        let first = line(&[("top", 0.0, 0.0, 30.0, 20.0)]);
        let second = line(&[("bottom", 0.0, 100.0, 60.0, 120.0)]);
        let units = render(&[first, second], &config);

        let blanks: Vec<bool> = units.iter().map(RenderUnit::is_blank).collect();
        assert_eq!(blanks, vec![false, true, true, true, false]);
        assert_eq!(units[1].font_size_pt, units[0].font_size_pt);
    }

    #[test]
    fn sizes_fonts_from_median_height() {
        let config = grid_config();
        let row = line(&[
            ("a", 0.0, 0.0, 10.0, 10.0),
            ("b", 20.0, 0.0, 30.0, 14.0),
            ("c", 40.0, 0.0, 50.0, 30.0),
        ]);
        assert_eq!(median_height(&row), 14.0);
        assert_eq!(render(&[row], &config)[0].font_size_pt, 14.0);

        let even = line(&[("a", 0.0, 0.0, 10.0, 10.0), ("b", 20.0, 0.0, 30.0, 20.0)]);
        assert_eq!(median_height(&even), 15.0);
    }

    #[test]
    fn floors_font_size() {
        let config = grid_config();
        let flat = line(&[("thin", 0.0, 5.0, 40.0, 5.0)]);
        assert_eq!(median_height(&flat), 0.0);
        assert_eq!(render(&[flat], &config)[0].font_size_pt, config.min_font_pt);
    }

    #[test]
    fn scales_pixels_to_points_by_dpi() {
        let config = RenderConfig {
            dpi: 144.0,
            font_scale: 0.5,
            ..RenderConfig::default()
        };
        let row = line(&[("big", 0.0, 0.0, 60.0, 80.0)]);
        // 80 px at 144 dpi is 40 pt, halved.
        assert_eq!(render(&[row], &config)[0].font_size_pt, 20.0);
    }

    #[test]
    fn empty_page_renders_nothing() {
        assert!(render(&[], &RenderConfig::default()).is_empty());
    }
}
