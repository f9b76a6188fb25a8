// ABOUTME: Single-pass lexer turning source text into a token stream

use crate::error::Diagnostic;
use crate::position::{Position, Span};
use crate::token::{Keyword, Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    pos: Position,
    current: Option<char>,
}

impl Lexer {
    pub fn new(file_name: &str, text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let current = chars.first().copied();
        Lexer {
            chars,
            pos: Position::start(file_name, text),
            current,
        }
    }

    fn advance(&mut self) {
        if let Some(c) = self.current {
            self.pos.advance(c);
        }
        self.current = self.chars.get(self.pos.idx).copied();
    }

    /// Consume the whole input. On success the stream ends with exactly one
    /// `EOF` token; the first illegal character aborts the scan.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Diagnostic> {
        let mut tokens = Vec::new();

        while let Some(c) = self.current {
            match c {
                ' ' | '\t' => self.advance(),
                '#' => self.skip_comment(),
                '\n' | ';' => {
                    tokens.push(self.single(TokenKind::Newline));
                }
                '0'..='9' => tokens.push(self.make_number()),
                'a'..='z' | 'A'..='Z' | '_' => tokens.push(self.make_identifier()),
                '"' => tokens.push(self.make_string()),
                '+' => tokens.push(self.single(TokenKind::Plus)),
                '-' => tokens.push(self.make_minus_or_arrow()),
                '*' => tokens.push(self.single(TokenKind::Star)),
                '/' => tokens.push(self.single(TokenKind::Slash)),
                '%' => tokens.push(self.single(TokenKind::Percent)),
                '^' => tokens.push(self.single(TokenKind::Caret)),
                '(' => tokens.push(self.single(TokenKind::LParen)),
                ')' => tokens.push(self.single(TokenKind::RParen)),
                '[' => tokens.push(self.single(TokenKind::LSquare)),
                ']' => tokens.push(self.single(TokenKind::RSquare)),
                ',' => tokens.push(self.single(TokenKind::Comma)),
                '!' => tokens.push(self.make_not_equals()?),
                '=' => tokens.push(self.make_composite('=', TokenKind::Eq, TokenKind::EqEq)),
                '<' => tokens.push(self.make_composite('=', TokenKind::Lt, TokenKind::Lte)),
                '>' => tokens.push(self.make_composite('=', TokenKind::Gt, TokenKind::Gte)),
                other => {
                    let start = self.pos.clone();
                    self.advance();
                    return Err(Diagnostic::illegal_char(
                        Span::new(start, self.pos.clone()),
                        format!("'{}'", other),
                    ));
                }
            }
        }

        tokens.push(Token::new(TokenKind::Eof, Span::point(self.pos.clone())));
        Ok(tokens)
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let span = Span::point(self.pos.clone());
        self.advance();
        Token::new(kind, span)
    }

    fn skip_comment(&mut self) {
        // Consume '#' through end of line; the newline itself is left for
        // the main loop so it still separates statements.
        self.advance();
        while matches!(self.current, Some(c) if c != '\n') {
            self.advance();
        }
    }

    fn make_number(&mut self) -> Token {
        let start = self.pos.clone();
        let mut text = String::new();
        let mut dots = 0;

        while let Some(c) = self.current {
            if c == '.' {
                if dots == 1 {
                    break;
                }
                dots += 1;
            } else if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.advance();
        }

        let span = Span::new(start, self.pos.clone());
        if dots == 0 {
            match text.parse::<i64>() {
                Ok(v) => Token::new(TokenKind::Int(v), span),
                // Literals beyond the integer range fall back to float.
                Err(_) => Token::new(TokenKind::Float(text.parse().unwrap_or(f64::INFINITY)), span),
            }
        } else {
            let mut value = text.as_str();
            if value.ends_with('.') {
                value = &text[..text.len() - 1];
            }
            Token::new(TokenKind::Float(value.parse().unwrap_or(0.0)), span)
        }
    }

    fn make_identifier(&mut self) -> Token {
        let start = self.pos.clone();
        let mut text = String::new();

        while let Some(c) = self.current {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            text.push(c);
            self.advance();
        }

        let span = Span::new(start, self.pos.clone());
        match Keyword::lookup(&text) {
            Some(kw) => Token::new(TokenKind::Keyword(kw), span),
            None => Token::new(TokenKind::Identifier(text), span),
        }
    }

    fn make_string(&mut self) -> Token {
        let start = self.pos.clone();
        let mut text = String::new();
        let mut escaped = false;
        self.advance();

        while let Some(c) = self.current {
            if escaped {
                text.push(match c {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                break;
            } else {
                text.push(c);
            }
            self.advance();
        }

        self.advance();
        Token::new(TokenKind::Str(text), Span::new(start, self.pos.clone()))
    }

    fn make_minus_or_arrow(&mut self) -> Token {
        let start = self.pos.clone();
        self.advance();

        if self.current == Some('>') {
            self.advance();
            Token::new(TokenKind::Arrow, Span::new(start, self.pos.clone()))
        } else {
            Token::new(TokenKind::Minus, Span::new(start, self.pos.clone()))
        }
    }

    fn make_not_equals(&mut self) -> Result<Token, Diagnostic> {
        let start = self.pos.clone();
        self.advance();

        if self.current == Some('=') {
            self.advance();
            return Ok(Token::new(TokenKind::Ne, Span::new(start, self.pos.clone())));
        }

        self.advance();
        Err(Diagnostic::expected_char(
            Span::new(start, self.pos.clone()),
            "'=' (after '!')",
        ))
    }

    fn make_composite(&mut self, next: char, bare: TokenKind, composite: TokenKind) -> Token {
        let start = self.pos.clone();
        self.advance();

        if self.current == Some(next) {
            self.advance();
            Token::new(composite, Span::new(start, self.pos.clone()))
        } else {
            Token::new(bare, Span::new(start, self.pos.clone()))
        }
    }
}
