// ABOUTME: Error kinds and the Diagnostic type rendered to users

use crate::position::{underline, Position, Span};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("Illegal Character")]
    IllegalChar,
    #[error("Expected Character")]
    ExpectedChar,
    #[error("Invalid Syntax")]
    InvalidSyntax,
    #[error("Runtime Error")]
    Runtime,
}

/// One line of a runtime traceback: the position reached inside the named
/// evaluation frame.
#[derive(Debug, Clone)]
pub struct TraceFrame {
    pub pos: Position,
    pub name: String,
}

/// A user-facing error. Carries everything needed to render the message,
/// the source excerpt, and (for runtime errors) the call traceback.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub span: Span,
    pub details: String,
    /// Outermost frame first; empty for lex/parse errors.
    pub trace: Vec<TraceFrame>,
}

impl Diagnostic {
    pub fn illegal_char(span: Span, details: impl Into<String>) -> Self {
        Diagnostic {
            kind: ErrorKind::IllegalChar,
            span,
            details: details.into(),
            trace: Vec::new(),
        }
    }

    pub fn expected_char(span: Span, details: impl Into<String>) -> Self {
        Diagnostic {
            kind: ErrorKind::ExpectedChar,
            span,
            details: details.into(),
            trace: Vec::new(),
        }
    }

    pub fn invalid_syntax(span: Span, details: impl Into<String>) -> Self {
        Diagnostic {
            kind: ErrorKind::InvalidSyntax,
            span,
            details: details.into(),
            trace: Vec::new(),
        }
    }

    pub fn runtime(span: Span, details: impl Into<String>, trace: Vec<TraceFrame>) -> Self {
        Diagnostic {
            kind: ErrorKind::Runtime,
            span,
            details: details.into(),
            trace,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == ErrorKind::Runtime {
            writeln!(f, "Traceback (most recent call last):")?;
            for frame in &self.trace {
                writeln!(
                    f,
                    "  File {}, line {}, in {}",
                    frame.pos.file_name,
                    frame.pos.ln + 1,
                    frame.name
                )?;
            }
            write!(f, "{}: {}", self.kind, self.details)?;
        } else {
            writeln!(f, "{}: {}", self.kind, self.details)?;
            write!(
                f,
                "File {}, line {}",
                self.span.start.file_name,
                self.span.start.ln + 1
            )?;
        }
        write!(f, "\n\n{}", underline(&self.span))
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_over(text: &str, from: usize, to: usize) -> Span {
        let mut start = Position::start("<test>", text);
        for c in text.chars().take(from) {
            start.advance(c);
        }
        let mut end = start.clone();
        for c in text.chars().skip(from).take(to - from) {
            end.advance(c);
        }
        Span::new(start, end)
    }

    #[test]
    fn test_syntax_error_rendering() {
        let err = Diagnostic::invalid_syntax(span_over("var = 5", 4, 5), "Expected identifier");
        let rendered = err.to_string();
        assert!(rendered.starts_with("Invalid Syntax: Expected identifier\n"));
        assert!(rendered.contains("File <test>, line 1"));
        assert!(rendered.contains("var = 5"));
    }

    #[test]
    fn test_runtime_error_rendering_with_traceback() {
        let span = span_over("1 / 0", 4, 5);
        let trace = vec![TraceFrame {
            pos: span.start.clone(),
            name: "<program>".to_string(),
        }];
        let err = Diagnostic::runtime(span, "Division by zero", trace);
        let rendered = err.to_string();
        assert!(rendered.starts_with("Traceback (most recent call last):\n"));
        assert!(rendered.contains("  File <test>, line 1, in <program>"));
        assert!(rendered.contains("Runtime Error: Division by zero"));
    }
}
