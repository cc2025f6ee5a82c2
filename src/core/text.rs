//! Text normalization and fixed-pitch column counting.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_width::UnicodeWidthChar;

/// How many grid columns a code point occupies.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WidthMode {
    /// Every code point is one column.
    #[default]
    Narrow,
    /// East Asian wide and fullwidth code points are two columns.
    Wide,
}

/// Cleans one recognized fragment: trims, folds compatibility forms and
/// recomposes Hangul that the recognizer emitted as loose jamo.
///
/// `"ᄒ ᅡ ᆫ"` becomes `"한"`; ordinary word spacing is kept.
pub fn normalize_text(text: &str) -> String {
    let folded = text.trim().nfkc().collect::<String>();
    drop_intra_jamo_whitespace(&folded).nfc().collect()
}

fn is_jamo(c: char) -> bool {
    matches!(
        c as u32,
        0x1100..=0x11FF | 0x3130..=0x318F | 0xA960..=0xA97F | 0xD7B0..=0xD7FF
    )
}

fn drop_intra_jamo_whitespace(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        if c.is_whitespace() {
            let prev = chars[..i].iter().rev().find(|ch| !ch.is_whitespace());
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if matches!((prev, next), (Some(p), Some(n)) if is_jamo(*p) && is_jamo(*n)) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Grid columns taken by `c`. Wide mode follows East Asian Width: wide and
/// fullwidth characters take two columns, combining marks and trailing
/// jamo none.
pub fn char_columns(c: char, mode: WidthMode) -> usize {
    match mode {
        WidthMode::Narrow => 1,
        WidthMode::Wide => c.width().unwrap_or(0),
    }
}

pub fn text_columns(text: &str, mode: WidthMode) -> usize {
    text.chars().map(|c| char_columns(c, mode)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn trims_and_keeps_plain_text() {
        assert_eq!(normalize_text("  Hello world \n"), "Hello world");
    }

    #[test]
    fn recomposes_spaced_jamo() {
        assert_eq!(normalize_text("ᄒ ᅡ ᆫ ᄀ ᅳ ᆯ"), "한글");
        assert_eq!(normalize_text("ㄱㅏ"), "가");
        assert_eq!(normalize_text("한 글 테스트"), "한 글 테스트");
    }

    #[test]
    fn folds_fullwidth_latin() {
        assert_eq!(normalize_text("ＡＢＣ"), "ABC");
    }

    #[test]
    fn counts_columns_per_mode() {
        assert_eq!(text_columns("계약서 A", WidthMode::Narrow), 5);
        assert_eq!(text_columns("계약서 A", WidthMode::Wide), 8);
        assert_eq!(text_columns("日本", WidthMode::Wide), 4);
        assert_eq!(text_columns("abc", WidthMode::Wide), 3);
    }

    #[test]
    fn combining_marks_take_no_column_in_wide_mode() {
        assert_eq!(text_columns("e\u{301}", WidthMode::Wide), 1);
        assert_eq!(text_columns("\u{1112}\u{1161}\u{11ab}", WidthMode::Wide), 2);
        assert_eq!(text_columns("e\u{301}", WidthMode::Narrow), 2);
    }

    #[test]
    fn enclosed_and_emoji_blocks_are_wide() {
        assert_eq!(text_columns("\u{1F200}", WidthMode::Wide), 2);
        assert_eq!(text_columns("\u{1F004}", WidthMode::Wide), 2);
    }
}
