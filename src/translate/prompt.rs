use crate::core::model::TextFragment;

/// Serializes fragments as `text(x1,y1,x2,y2)` tokens joined by `sep`.
/// Fragments with empty text are left out.
pub fn serialize_fragments(fragments: &[TextFragment], sep: &str) -> String {
    fragments
        .iter()
        .filter(|f| !f.text.is_empty())
        .map(|f| {
            let [x1, y1, x2, y2] = f.bbox.truncated();
            format!("{}({x1},{y1},{x2},{y2})", f.text)
        })
        .collect::<Vec<_>>()
        .join(sep)
        .trim()
        .to_string()
}

pub fn build_prompt(fragments: &[TextFragment], source_lang: &str, target_lang: &str) -> String {
    let tokens = serialize_fragments(fragments, " ");
    format!(
        r#"You translate OCR output of scanned documents while keeping its layout.

Each input element is written as text(x1,y1,x2,y2), where the numbers are the
pixel box of that text on the page.

Translate every element from {source_lang} into {target_lang}.
Answer with a Python list of tuples and nothing else, one tuple per input
element in the same order, keeping each box unchanged:
[("translated text", (x1, y1, x2, y2)), ...]

Input:
{tokens}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::BBox;
    use pretty_assertions::assert_eq;

    #[test]
    fn serializes_tokens_with_integer_boxes() {
        let fragments = vec![
            TextFragment::new("계약서", BBox::new(10.6, 20.0, 110.2, 50.9)),
            TextFragment::new("", BBox::new(0.0, 0.0, 1.0, 1.0)),
            TextFragment::new("제1조", BBox::new(10.0, 80.0, 90.0, 100.0)),
        ];
        assert_eq!(
            serialize_fragments(&fragments, " "),
            "계약서(10,20,110,50) 제1조(10,80,90,100)"
        );
        assert_eq!(
            serialize_fragments(&fragments, "\n"),
            "계약서(10,20,110,50)\n제1조(10,80,90,100)"
        );
    }

    #[test]
    fn empty_input_serializes_to_nothing() {
        assert_eq!(serialize_fragments(&[], " "), "");
    }

    #[test]
    fn prompt_names_languages_and_embeds_tokens() {
        let fragments = vec![TextFragment::new("갑", BBox::new(1.0, 2.0, 3.0, 4.0))];
        let prompt = build_prompt(&fragments, "Korean", "English");
        assert!(prompt.contains("from Korean into English"));
        assert!(prompt.contains("갑(1,2,3,4)"));
    }
}
