// ABOUTME: Source positions, spans, and caret-underlined excerpts for diagnostics

use std::rc::Rc;

/// A cursor into one source text. Positions are copied freely and share the
/// file name and full text so diagnostics can be rendered later without
/// re-reading anything.
#[derive(Debug, Clone)]
pub struct Position {
    pub idx: usize,
    pub ln: usize,
    pub col: usize,
    pub file_name: Rc<str>,
    pub text: Rc<str>,
}

impl Position {
    pub fn start(file_name: &str, text: &str) -> Self {
        Position {
            idx: 0,
            ln: 0,
            col: 0,
            file_name: Rc::from(file_name),
            text: Rc::from(text),
        }
    }

    /// Step past `current`. Newlines bump the line counter and reset the
    /// column; everything else moves one column right.
    pub fn advance(&mut self, current: char) {
        self.idx += 1;
        self.col += 1;

        if current == '\n' {
            self.ln += 1;
            self.col = 0;
        }
    }

    /// The position one column to the right, for single-character spans.
    pub fn next_col(&self) -> Self {
        let mut copy = self.clone();
        copy.idx += 1;
        copy.col += 1;
        copy
    }
}

/// Half-open region of source text, `start` inclusive.
#[derive(Debug, Clone)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    /// A one-character span at `pos`.
    pub fn point(pos: Position) -> Self {
        let end = pos.next_col();
        Span { start: pos, end }
    }

    /// The region from the start of `a` to the end of `b`.
    pub fn merge(a: &Span, b: &Span) -> Self {
        Span {
            start: a.start.clone(),
            end: b.end.clone(),
        }
    }
}

/// Render the source lines covered by the span with a `^` underline beneath
/// the offending region. Tabs are stripped so the underline stays aligned.
pub fn underline(span: &Span) -> String {
    let text: Vec<char> = span.start.text.chars().collect();
    let mut result = String::new();

    // Start of the first covered line.
    let mut idx_start = text[..span.start.idx.min(text.len())]
        .iter()
        .rposition(|&c| c == '\n')
        .unwrap_or(0);
    let mut idx_end = find_newline(&text, idx_start + 1);

    let line_count = span.end.ln - span.start.ln + 1;
    for i in 0..line_count {
        let line: String = text[idx_start.min(text.len())..idx_end].iter().collect();
        let col_start = if i == 0 { span.start.col } else { 0 };
        let col_end = if i == line_count - 1 {
            span.end.col
        } else {
            line.chars().count().saturating_sub(1)
        };

        result.push_str(&line);
        result.push('\n');
        result.push_str(&" ".repeat(col_start));
        result.push_str(&"^".repeat(col_end.saturating_sub(col_start).max(1)));

        idx_start = idx_end;
        idx_end = find_newline(&text, idx_start + 1);
    }

    result.replace('\t', "")
}

fn find_newline(text: &[char], from: usize) -> usize {
    text.iter()
        .skip(from.min(text.len()))
        .position(|&c| c == '\n')
        .map(|p| p + from)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_tracks_lines_and_columns() {
        let mut pos = Position::start("<test>", "ab\nc");
        pos.advance('a');
        assert_eq!((pos.idx, pos.ln, pos.col), (1, 0, 1));
        pos.advance('b');
        pos.advance('\n');
        assert_eq!((pos.idx, pos.ln, pos.col), (3, 1, 0));
        pos.advance('c');
        assert_eq!((pos.idx, pos.ln, pos.col), (4, 1, 1));
    }

    #[test]
    fn test_underline_single_line() {
        let text = "var x = 1 + ]";
        let mut start = Position::start("<test>", text);
        for c in text.chars().take(12) {
            start.advance(c);
        }
        let end = start.next_col();
        let rendered = underline(&Span::new(start, end));
        assert!(rendered.contains("var x = 1 + ]"));
        assert!(rendered.lines().nth(1).unwrap().ends_with('^'));
    }

    #[test]
    fn test_underline_points_at_offending_column() {
        let text = "1 / 0";
        let mut start = Position::start("<test>", text);
        for c in text.chars().take(4) {
            start.advance(c);
        }
        let end = start.next_col();
        let rendered = underline(&Span::new(start, end));
        let caret_line = rendered.lines().nth(1).unwrap();
        assert_eq!(caret_line, "    ^");
    }
}
