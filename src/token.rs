// ABOUTME: Token kinds, the reserved keyword set, and the lexer's output type

use crate::position::Span;
use std::fmt;

/// Reserved words. An identifier whose spelling appears here lexes as a
/// keyword token instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Var,
    And,
    Or,
    Not,
    If,
    Elif,
    Else,
    For,
    To,
    Step,
    While,
    Func,
    Then,
    End,
    Return,
    Continue,
    Break,
    Include,
    Exit,
    MakeInt,
    MakeFloat,
    MakeStr,
    Argv,
    RandInt,
    TakeElement,
    LenStr,
    Shuffle,
    System,
    Sleep,
}

impl Keyword {
    /// Maps a lexeme onto its keyword, if reserved. Spellings are exact;
    /// `Exit`, `Argv` and `Shuffle` are capitalized in the language.
    pub fn lookup(ident: &str) -> Option<Keyword> {
        use Keyword::*;
        Some(match ident {
            "var" => Var,
            "and" => And,
            "or" => Or,
            "not" => Not,
            "if" => If,
            "elif" => Elif,
            "else" => Else,
            "for" => For,
            "to" => To,
            "step" => Step,
            "while" => While,
            "func" => Func,
            "then" => Then,
            "end" => End,
            "return" => Return,
            "continue" => Continue,
            "break" => Break,
            "include" => Include,
            "Exit" => Exit,
            "make_int" => MakeInt,
            "make_float" => MakeFloat,
            "make_str" => MakeStr,
            "Argv" => Argv,
            "randInt" => RandInt,
            "takeElement" => TakeElement,
            "lenStr" => LenStr,
            "Shuffle" => Shuffle,
            "system" => System,
            "sleep" => Sleep,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Int(i64),
    Float(f64),
    Str(String),
    Identifier(String),
    Keyword(Keyword),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
    LSquare,
    RSquare,
    Comma,
    Arrow,
    Eq,
    EqEq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Newline,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }

    /// Kind-and-value equality against a specific keyword.
    pub fn matches(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    pub fn identifier(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Int(v) => write!(f, "INT:{}", v),
            TokenKind::Float(v) => write!(f, "FLOAT:{}", v),
            TokenKind::Str(v) => write!(f, "STRING:{}", v),
            TokenKind::Identifier(v) => write!(f, "IDENTIFIER:{}", v),
            TokenKind::Keyword(k) => write!(f, "KEYWORD:{:?}", k),
            TokenKind::Plus => write!(f, "PLUS"),
            TokenKind::Minus => write!(f, "MINUS"),
            TokenKind::Star => write!(f, "MUL"),
            TokenKind::Slash => write!(f, "DIV"),
            TokenKind::Percent => write!(f, "MOD"),
            TokenKind::Caret => write!(f, "POW"),
            TokenKind::LParen => write!(f, "LPAREN"),
            TokenKind::RParen => write!(f, "RPAREN"),
            TokenKind::LSquare => write!(f, "LSQUARE"),
            TokenKind::RSquare => write!(f, "RSQUARE"),
            TokenKind::Comma => write!(f, "COMMA"),
            TokenKind::Arrow => write!(f, "ARROW"),
            TokenKind::Eq => write!(f, "EQ"),
            TokenKind::EqEq => write!(f, "EE"),
            TokenKind::Ne => write!(f, "NE"),
            TokenKind::Lt => write!(f, "LT"),
            TokenKind::Lte => write!(f, "LTE"),
            TokenKind::Gt => write!(f, "GT"),
            TokenKind::Gte => write!(f, "GTE"),
            TokenKind::Newline => write!(f, "NEWLINE"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}
