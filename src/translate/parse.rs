//! Parser for the translation service's reply.
//!
//! The reply is expected to be a literal list of pairs such as
//! `[("Contract", (10, 20, 110, 50)), ("Article 1", (10, 80, 90, 100))]`.
//! Lists and tuples may use either brackets or parentheses, strings either
//! quote style, and a surrounding Markdown code fence is tolerated.

use tracing::debug;

use crate::core::error::ScanLayoutError;
use crate::core::geometry::BBox;
use crate::core::model::TextFragment;

#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Str(String),
    Num(f64),
    Seq(Vec<Literal>),
    /// Bare identifier such as `None` or `True`.
    Word,
}

/// A well-formed reply nests three deep: list, pair, box.
const MAX_DEPTH: usize = 16;

/// Box coordinates beyond this magnitude are treated as malformed.
const MAX_COORD: f64 = i32::MAX as f64;

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    src: &'a str,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.char_indices().peekable(),
            src,
            depth: 0,
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn error(&mut self, what: &str) -> ScanLayoutError {
        match self.chars.peek() {
            Some(&(pos, c)) => ScanLayoutError::parse(format!("{what} at byte {pos} ('{c}')")),
            None => ScanLayoutError::parse(format!("{what} at end of input")),
        }
    }

    fn value(&mut self) -> Result<Literal, ScanLayoutError> {
        self.skip_ws();
        match self.chars.peek().map(|&(_, c)| c) {
            Some('[') => self.nested(']'),
            Some('(') => self.nested(')'),
            Some(q @ ('\'' | '"')) => self.string(q),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => Ok(self.word()),
            _ => Err(self.error("expected a value")),
        }
    }

    fn nested(&mut self, close: char) -> Result<Literal, ScanLayoutError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let seq = self.seq(close);
        self.depth -= 1;
        seq
    }

    fn seq(&mut self, close: char) -> Result<Literal, ScanLayoutError> {
        self.chars.next();
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if matches!(self.chars.peek(), Some(&(_, c)) if c == close) {
                self.chars.next();
                return Ok(Literal::Seq(items));
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.chars.peek().map(|&(_, c)| c) {
                Some(',') => {
                    self.chars.next();
                }
                Some(c) if c == close => {}
                _ => return Err(self.error(&format!("expected ',' or '{close}'"))),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<Literal, ScanLayoutError> {
        self.chars.next();
        let mut out = String::new();
        while let Some((_, c)) = self.chars.next() {
            match c {
                c if c == quote => return Ok(Literal::Str(out)),
                '\\' => match self.chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, 'r')) => out.push('\r'),
                    Some((_, '0')) => out.push('\0'),
                    Some((_, 'u')) => out.push(self.unicode_escape()?),
                    Some((_, other)) => out.push(other),
                    None => break,
                },
                c => out.push(c),
            }
        }
        Err(ScanLayoutError::parse("unterminated string literal"))
    }

    fn unicode_escape(&mut self) -> Result<char, ScanLayoutError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .chars
                .next()
                .and_then(|(_, c)| c.to_digit(16))
                .ok_or_else(|| ScanLayoutError::parse("bad \\u escape"))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| ScanLayoutError::parse("bad \\u escape"))
    }

    fn number(&mut self) -> Result<Literal, ScanLayoutError> {
        let start = self.chars.peek().map(|&(i, _)| i).unwrap_or(self.src.len());
        let mut end = start;
        while let Some(&(i, c)) = self.chars.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E' | '_') {
                end = i + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        let raw = self.src[start..end].replace('_', "");
        raw.parse::<f64>()
            .map(Literal::Num)
            .map_err(|_| ScanLayoutError::parse(format!("invalid number '{raw}'")))
    }

    fn word(&mut self) -> Literal {
        while matches!(self.chars.peek(), Some(&(_, c)) if c.is_alphanumeric() || c == '_') {
            self.chars.next();
        }
        Literal::Word
    }
}

fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some((_, rest)) = trimmed.split_once("```") else {
        return trimmed;
    };
    // drop the info string (`python`, `json`, ...) on the opening line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    match body.split_once("```") {
        Some((inner, _)) => inner.trim(),
        None => body.trim(),
    }
}

fn to_fragment(item: &Literal) -> Option<TextFragment> {
    let Literal::Seq(pair) = item else {
        return None;
    };
    let [Literal::Str(text), Literal::Seq(coords)] = pair.as_slice() else {
        return None;
    };
    let [x1, y1, x2, y2] = coords.as_slice() else {
        return None;
    };
    let mut ints = [0i64; 4];
    for (slot, coord) in ints.iter_mut().zip([x1, y1, x2, y2]) {
        match coord {
            Literal::Num(n) if n.is_finite() && n.abs() <= MAX_COORD => *slot = n.trunc() as i64,
            _ => return None,
        }
    }
    let bbox = BBox::from_corners(
        ints[0] as f32,
        ints[1] as f32,
        ints[2] as f32,
        ints[3] as f32,
    )?;
    Some(TextFragment::new(text.clone(), bbox))
}

/// Parses a translated reply back into fragments.
///
/// Elements that are not a `(string, (n, n, n, n))` pair are skipped, as are
/// boxes with coordinates outside the `i32` range. Box coordinates are
/// truncated to integers. Anything that is not a list at the
/// top level is an error.
pub fn parse_translation(response: &str) -> Result<Vec<TextFragment>, ScanLayoutError> {
    let body = strip_code_fence(response);
    let mut parser = Parser::new(body);
    let value = parser.value()?;
    parser.skip_ws();
    if parser.chars.peek().is_some() {
        return Err(parser.error("trailing characters after list"));
    }

    let Literal::Seq(items) = value else {
        return Err(ScanLayoutError::parse("top-level value is not a list"));
    };
    let fragments: Vec<TextFragment> = items.iter().filter_map(to_fragment).collect();
    debug!(
        items = items.len(),
        kept = fragments.len(),
        "parsed translation reply"
    );
    Ok(fragments)
}
