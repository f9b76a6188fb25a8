// ABOUTME: Recursive-descent parser with explicit precedence ladder and checkpoints

use crate::ast::{BinOp, ElseCase, IfCase, Node, NodeKind, UnaryOp};
use crate::error::Diagnostic;
use crate::position::Span;
use crate::token::{Keyword, Token, TokenKind};
use std::rc::Rc;

type ParseResult = Result<Node, Diagnostic>;

const EXPECTED_EXPR: &str =
    "Expected 'var', 'if', 'for', 'while', 'func', int, float, identifier, '+', '-', '(', '[' or 'not'";
const EXPECTED_STATEMENT: &str =
    "Expected 'return', 'continue', 'break', 'var', 'if', 'for', 'while', 'func', int, float, identifier, '+', '-', '(', '[' or 'not'";
const EXPECTED_COMP: &str =
    "Expected int, float, identifier, '+', '-', '(', '[', 'if', 'for', 'while', 'func' or 'not'";
const EXPECTED_ATOM: &str =
    "Expected int, float, identifier, '+', '-', '(', '[', 'if', 'for', 'while' or 'func'";

pub struct Parser {
    tokens: Vec<Token>,
    idx: usize,
}

impl Parser {
    /// The token stream must end with `Eof` (the lexer guarantees it).
    pub fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(matches!(
            tokens.last().map(|t| &t.kind),
            Some(TokenKind::Eof)
        ));
        Parser { tokens, idx: 0 }
    }

    pub fn parse(mut self) -> ParseResult {
        let ast = self.statements()?;
        if self.current().kind != TokenKind::Eof {
            return Err(self.syntax_error("Token cannot appear after previous tokens"));
        }
        Ok(ast)
    }

    // ---- cursor -----------------------------------------------------------

    fn current(&self) -> &Token {
        &self.tokens[self.idx]
    }

    fn advance(&mut self) {
        // Never step past the trailing Eof.
        if self.idx + 1 < self.tokens.len() {
            self.idx += 1;
        }
    }

    /// Checkpoint for speculative parses.
    fn save(&self) -> usize {
        self.idx
    }

    fn restore(&mut self, checkpoint: usize) {
        self.idx = checkpoint;
    }

    fn syntax_error(&self, message: &str) -> Diagnostic {
        Diagnostic::invalid_syntax(self.current().span.clone(), message)
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<(), Diagnostic> {
        if self.current().kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.syntax_error(message))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword, message: &str) -> Result<(), Diagnostic> {
        if self.current().matches(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.syntax_error(message))
        }
    }

    /// Replace the error message only when `inner` consumed nothing, so the
    /// reported location stays at the furthest point reached.
    fn or_expected(&self, entry: usize, inner: Diagnostic, message: &str) -> Diagnostic {
        if self.idx == entry {
            self.syntax_error(message)
        } else {
            inner
        }
    }

    // ---- statements -------------------------------------------------------

    fn statements(&mut self) -> ParseResult {
        let start = self.current().span.start.clone();
        let mut stmts = Vec::new();

        while self.current().kind == TokenKind::Newline {
            self.advance();
        }

        stmts.push(self.statement()?);

        loop {
            let mut newlines = 0;
            while self.current().kind == TokenKind::Newline {
                self.advance();
                newlines += 1;
            }
            if newlines == 0 {
                break;
            }

            let checkpoint = self.save();
            match self.statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(_) => {
                    self.restore(checkpoint);
                    break;
                }
            }
        }

        let span = Span::new(start, self.current().span.end.clone());
        Ok(Node::new(NodeKind::List(stmts), span))
    }

    fn statement(&mut self) -> ParseResult {
        let start = self.current().span.start.clone();

        if self.current().matches(Keyword::Return) {
            self.advance();

            let checkpoint = self.save();
            let value = match self.expr() {
                Ok(node) => Some(Box::new(node)),
                Err(_) => {
                    self.restore(checkpoint);
                    None
                }
            };
            let span = Span::new(start, self.current().span.start.clone());
            return Ok(Node::new(NodeKind::Return(value), span));
        }

        if self.current().matches(Keyword::Continue) {
            self.advance();
            let span = Span::new(start, self.current().span.start.clone());
            return Ok(Node::new(NodeKind::Continue, span));
        }

        if self.current().matches(Keyword::Break) {
            self.advance();
            let span = Span::new(start, self.current().span.start.clone());
            return Ok(Node::new(NodeKind::Break, span));
        }

        let entry = self.idx;
        self.expr()
            .map_err(|e| self.or_expected(entry, e, EXPECTED_STATEMENT))
    }

    // ---- expression ladder ------------------------------------------------

    fn expr(&mut self) -> ParseResult {
        if self.current().matches(Keyword::Var) {
            let start = self.current().span.start.clone();
            self.advance();

            let name = match self.current().identifier() {
                Some(name) => name.to_string(),
                None => return Err(self.syntax_error("Expected identifier")),
            };
            self.advance();

            self.expect(TokenKind::Eq, "Expected '='")?;
            let value = self.expr()?;
            let span = Span::new(start, value.span.end.clone());
            return Ok(Node::new(NodeKind::VarAssign(name, Box::new(value)), span));
        }

        let entry = self.idx;
        let mut left = self
            .comp_expr()
            .map_err(|e| self.or_expected(entry, e, EXPECTED_EXPR))?;

        loop {
            let op = match &self.current().kind {
                TokenKind::Keyword(Keyword::And) => BinOp::And,
                TokenKind::Keyword(Keyword::Or) => BinOp::Or,
                _ => break,
            };
            self.advance();
            let right = self.comp_expr()?;
            let span = Span::merge(&left.span, &right.span);
            left = Node::new(
                NodeKind::BinOp {
                    op,
                    lhs: Box::new(left),
                    rhs: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn comp_expr(&mut self) -> ParseResult {
        if self.current().matches(Keyword::Not) {
            let start = self.current().span.start.clone();
            self.advance();

            let operand = self.comp_expr()?;
            let span = Span::new(start, operand.span.end.clone());
            return Ok(Node::new(
                NodeKind::UnaryOp {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                span,
            ));
        }

        let entry = self.idx;
        let mut left = self
            .arith_expr()
            .map_err(|e| self.or_expected(entry, e, EXPECTED_COMP))?;

        loop {
            let op = match &self.current().kind {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::Ne => BinOp::Ne,
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Lte => BinOp::Lte,
                TokenKind::Gte => BinOp::Gte,
                _ => break,
            };
            self.advance();
            let right = self.arith_expr()?;
            let span = Span::merge(&left.span, &right.span);
            left = Node::new(
                NodeKind::BinOp {
                    op,
                    lhs: Box::new(left),
                    rhs: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn arith_expr(&mut self) -> ParseResult {
        let mut left = self.term()?;

        loop {
            let op = match &self.current().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.term()?;
            let span = Span::merge(&left.span, &right.span);
            left = Node::new(
                NodeKind::BinOp {
                    op,
                    lhs: Box::new(left),
                    rhs: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn term(&mut self) -> ParseResult {
        let mut left = self.factor()?;

        loop {
            let op = match &self.current().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.factor()?;
            let span = Span::merge(&left.span, &right.span);
            left = Node::new(
                NodeKind::BinOp {
                    op,
                    lhs: Box::new(left),
                    rhs: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn factor(&mut self) -> ParseResult {
        let op = match &self.current().kind {
            TokenKind::Plus => Some(UnaryOp::Pos),
            TokenKind::Minus => Some(UnaryOp::Neg),
            _ => None,
        };

        if let Some(op) = op {
            let start = self.current().span.start.clone();
            self.advance();
            let operand = self.factor()?;
            let span = Span::new(start, operand.span.end.clone());
            return Ok(Node::new(
                NodeKind::UnaryOp {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ));
        }

        self.power()
    }

    fn power(&mut self) -> ParseResult {
        let mut left = self.call()?;

        // Right-associative: the exponent re-enters through factor.
        while self.current().kind == TokenKind::Caret {
            self.advance();
            let right = self.factor()?;
            let span = Span::merge(&left.span, &right.span);
            left = Node::new(
                NodeKind::BinOp {
                    op: BinOp::Pow,
                    lhs: Box::new(left),
                    rhs: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn call(&mut self) -> ParseResult {
        let atom = self.atom()?;

        if self.current().kind != TokenKind::LParen {
            return Ok(atom);
        }
        self.advance();

        let mut args = Vec::new();
        if self.current().kind == TokenKind::RParen {
            self.advance();
        } else {
            let entry = self.idx;
            args.push(self.expr().map_err(|e| {
                self.or_expected(
                    entry,
                    e,
                    "Expected ')', 'var', 'if', 'for', 'while', 'func', int, float, identifier, '+', '-', '(', '[' or 'not'",
                )
            })?);

            while self.current().kind == TokenKind::Comma {
                self.advance();
                args.push(self.expr()?);
            }

            self.expect(TokenKind::RParen, "Expected ',' or ')'")?;
        }

        let end = args
            .last()
            .map(|a| a.span.end.clone())
            .unwrap_or_else(|| atom.span.end.clone());
        let span = Span::new(atom.span.start.clone(), end);
        Ok(Node::new(
            NodeKind::Call {
                callee: Box::new(atom),
                args,
            },
            span,
        ))
    }

    fn atom(&mut self) -> ParseResult {
        let tok = self.current().clone();

        match &tok.kind {
            TokenKind::Int(v) => {
                self.advance();
                Ok(Node::new(NodeKind::Int(*v), tok.span))
            }
            TokenKind::Float(v) => {
                self.advance();
                Ok(Node::new(NodeKind::Float(*v), tok.span))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Node::new(NodeKind::Str(s.clone()), tok.span))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Node::new(NodeKind::VarAccess(name.clone()), tok.span))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.expr()?;
                self.expect(TokenKind::RParen, "Expected ')'")?;
                Ok(expr)
            }
            TokenKind::LSquare => self.list_expr(),
            TokenKind::Keyword(Keyword::If) => self.if_expr(),
            TokenKind::Keyword(Keyword::For) => self.for_expr(),
            TokenKind::Keyword(Keyword::While) => self.while_expr(),
            TokenKind::Keyword(Keyword::Func) => self.func_def(),
            TokenKind::Keyword(Keyword::Include) => self.intrinsic_one(Keyword::Include),
            TokenKind::Keyword(Keyword::Exit) => self.intrinsic_one(Keyword::Exit),
            TokenKind::Keyword(Keyword::MakeInt) => self.intrinsic_one(Keyword::MakeInt),
            TokenKind::Keyword(Keyword::MakeFloat) => self.intrinsic_one(Keyword::MakeFloat),
            TokenKind::Keyword(Keyword::MakeStr) => self.intrinsic_one(Keyword::MakeStr),
            TokenKind::Keyword(Keyword::Shuffle) => self.intrinsic_one(Keyword::Shuffle),
            TokenKind::Keyword(Keyword::LenStr) => self.intrinsic_one(Keyword::LenStr),
            TokenKind::Keyword(Keyword::System) => self.intrinsic_one(Keyword::System),
            TokenKind::Keyword(Keyword::Sleep) => self.intrinsic_one(Keyword::Sleep),
            TokenKind::Keyword(Keyword::RandInt) => self.intrinsic_two(Keyword::RandInt),
            TokenKind::Keyword(Keyword::TakeElement) => self.intrinsic_two(Keyword::TakeElement),
            TokenKind::Keyword(Keyword::Argv) => self.argv_expr(),
            _ => Err(self.syntax_error(EXPECTED_ATOM)),
        }
    }

    fn list_expr(&mut self) -> ParseResult {
        let start = self.current().span.start.clone();
        self.expect(TokenKind::LSquare, "Expected '['")?;

        let mut elements = Vec::new();
        let end;

        if self.current().kind == TokenKind::RSquare {
            end = self.current().span.end.clone();
            self.advance();
        } else {
            let entry = self.idx;
            elements.push(self.expr().map_err(|e| {
                self.or_expected(
                    entry,
                    e,
                    "Expected ']', 'var', 'if', 'for', 'while', 'func', int, float, identifier, '+', '-', '(', '[' or 'not'",
                )
            })?);

            while self.current().kind == TokenKind::Comma {
                self.advance();
                elements.push(self.expr()?);
            }

            end = self.current().span.end.clone();
            self.expect(TokenKind::RSquare, "Expected ',' or ']'")?;
        }

        Ok(Node::new(NodeKind::List(elements), Span::new(start, end)))
    }

    // ---- block forms ------------------------------------------------------

    fn if_expr(&mut self) -> ParseResult {
        let (cases, else_case) = self.if_cases(Keyword::If)?;

        let start = cases[0].cond.span.start.clone();
        let end = else_case
            .as_ref()
            .map(|e| e.body.span.end.clone())
            .unwrap_or_else(|| cases.last().unwrap().body.span.end.clone());
        Ok(Node::new(
            NodeKind::If { cases, else_case },
            Span::new(start, end),
        ))
    }

    fn if_cases(
        &mut self,
        case_keyword: Keyword,
    ) -> Result<(Vec<IfCase>, Option<ElseCase>), Diagnostic> {
        let expected = if case_keyword == Keyword::If {
            "Expected 'if'"
        } else {
            "Expected 'elif'"
        };
        self.expect_keyword(case_keyword, expected)?;

        let mut cases = Vec::new();
        let mut else_case = None;

        let cond = self.expr()?;
        self.expect_keyword(Keyword::Then, "Expected 'then'")?;

        if self.current().kind == TokenKind::Newline {
            self.advance();

            let body = self.statements()?;
            cases.push(IfCase {
                cond,
                body,
                returns_null: true,
            });

            if self.current().matches(Keyword::End) {
                self.advance();
            } else {
                let (more_cases, trailing_else) = self.elif_or_else()?;
                cases.extend(more_cases);
                else_case = trailing_else;
            }
        } else {
            let body = self.statement()?;
            cases.push(IfCase {
                cond,
                body,
                returns_null: false,
            });

            let (more_cases, trailing_else) = self.elif_or_else()?;
            cases.extend(more_cases);
            else_case = trailing_else;
        }

        Ok((cases, else_case))
    }

    fn elif_or_else(&mut self) -> Result<(Vec<IfCase>, Option<ElseCase>), Diagnostic> {
        if self.current().matches(Keyword::Elif) {
            return self.if_cases(Keyword::Elif);
        }
        Ok((Vec::new(), self.else_case()?))
    }

    fn else_case(&mut self) -> Result<Option<ElseCase>, Diagnostic> {
        if !self.current().matches(Keyword::Else) {
            return Ok(None);
        }
        self.advance();

        if self.current().kind == TokenKind::Newline {
            self.advance();
            let body = self.statements()?;
            self.expect_keyword(Keyword::End, "Expected 'end'")?;
            Ok(Some(ElseCase {
                body: Box::new(body),
                returns_null: true,
            }))
        } else {
            let body = self.statement()?;
            Ok(Some(ElseCase {
                body: Box::new(body),
                returns_null: false,
            }))
        }
    }

    fn for_expr(&mut self) -> ParseResult {
        self.expect_keyword(Keyword::For, "Expected 'for'")?;

        let var_start = self.current().span.start.clone();
        let var = match self.current().identifier() {
            Some(name) => name.to_string(),
            None => return Err(self.syntax_error("Expected identifier")),
        };
        self.advance();

        self.expect(TokenKind::Eq, "Expected '='")?;
        let start_value = self.expr()?;

        self.expect_keyword(Keyword::To, "Expected 'to'")?;
        let end_value = self.expr()?;

        let step = if self.current().matches(Keyword::Step) {
            self.advance();
            Some(Box::new(self.expr()?))
        } else {
            None
        };

        self.expect_keyword(Keyword::Then, "Expected 'then'")?;

        let (body, returns_null) = self.loop_body()?;
        let span = Span::new(var_start, body.span.end.clone());
        Ok(Node::new(
            NodeKind::For {
                var,
                start: Box::new(start_value),
                end: Box::new(end_value),
                step,
                body: Box::new(body),
                returns_null,
            },
            span,
        ))
    }

    fn while_expr(&mut self) -> ParseResult {
        self.expect_keyword(Keyword::While, "Expected 'while'")?;

        let cond = self.expr()?;
        self.expect_keyword(Keyword::Then, "Expected 'then'")?;

        let (body, returns_null) = self.loop_body()?;
        let span = Span::new(cond.span.start.clone(), body.span.end.clone());
        Ok(Node::new(
            NodeKind::While {
                cond: Box::new(cond),
                body: Box::new(body),
                returns_null,
            },
            span,
        ))
    }

    /// Shared tail of `for`/`while`: either a newline-introduced block closed
    /// by `end`, or a single inline statement.
    fn loop_body(&mut self) -> Result<(Node, bool), Diagnostic> {
        if self.current().kind == TokenKind::Newline {
            self.advance();
            let body = self.statements()?;
            self.expect_keyword(Keyword::End, "Expected 'end'")?;
            Ok((body, true))
        } else {
            Ok((self.statement()?, false))
        }
    }

    fn func_def(&mut self) -> ParseResult {
        let start = self.current().span.start.clone();
        self.expect_keyword(Keyword::Func, "Expected 'func'")?;

        let name = match self.current().identifier() {
            Some(name) => {
                let name = name.to_string();
                self.advance();
                if self.current().kind != TokenKind::LParen {
                    return Err(self.syntax_error("Expected '('"));
                }
                Some(name)
            }
            None => {
                if self.current().kind != TokenKind::LParen {
                    return Err(self.syntax_error("Expected identifier or '('"));
                }
                None
            }
        };
        self.advance();

        let mut params = Vec::new();
        if let Some(first) = self.current().identifier() {
            params.push(first.to_string());
            self.advance();

            while self.current().kind == TokenKind::Comma {
                self.advance();
                match self.current().identifier() {
                    Some(name) => {
                        params.push(name.to_string());
                        self.advance();
                    }
                    None => return Err(self.syntax_error("Expected identifier")),
                }
            }

            self.expect(TokenKind::RParen, "Expected ',' or ')'")?;
        } else {
            self.expect(TokenKind::RParen, "Expected identifier or ')'")?;
        }

        if self.current().kind == TokenKind::Arrow {
            self.advance();
            let body = self.expr()?;
            let span = Span::new(start, body.span.end.clone());
            return Ok(Node::new(
                NodeKind::FuncDef {
                    name,
                    params,
                    body: Rc::new(body),
                    auto_return: true,
                },
                span,
            ));
        }

        if self.current().kind != TokenKind::Newline {
            return Err(self.syntax_error("Expected '->' or NEWLINE"));
        }
        self.advance();

        let body = self.statements()?;
        self.expect_keyword(Keyword::End, "Expected 'end'")?;

        let span = Span::new(start, body.span.end.clone());
        Ok(Node::new(
            NodeKind::FuncDef {
                name,
                params,
                body: Rc::new(body),
                auto_return: false,
            },
            span,
        ))
    }

    // ---- statement intrinsics ---------------------------------------------

    /// `KEYWORD '(' expr ')' [statement]` for the single-argument intrinsics.
    fn intrinsic_one(&mut self, keyword: Keyword) -> ParseResult {
        let start = self.current().span.start.clone();
        self.advance();

        self.expect(TokenKind::LParen, "Expected '('")?;
        let arg = self.expr()?;
        let end = self.current().span.end.clone();
        self.expect(TokenKind::RParen, "Expected ')'")?;

        let body = self.trailing_statement();
        let span = Span::new(start, end);
        let arg = Box::new(arg);

        let kind = match keyword {
            Keyword::Include => NodeKind::Include {
                path: arg,
                body,
                returns_null: false,
            },
            Keyword::Exit => NodeKind::Exit {
                code: arg,
                body,
                returns_null: false,
            },
            Keyword::MakeInt => NodeKind::MakeInt {
                value: arg,
                body,
                returns_null: false,
            },
            Keyword::MakeFloat => NodeKind::MakeFloat {
                value: arg,
                body,
                returns_null: false,
            },
            Keyword::MakeStr => NodeKind::MakeStr {
                value: arg,
                body,
                returns_null: false,
            },
            Keyword::Shuffle => NodeKind::Shuffle {
                list: arg,
                body,
                returns_null: false,
            },
            Keyword::LenStr => NodeKind::LenStr {
                value: arg,
                body,
                returns_null: false,
            },
            Keyword::System => NodeKind::System {
                command: arg,
                body,
                returns_null: false,
            },
            Keyword::Sleep => NodeKind::Sleep {
                seconds: arg,
                body,
                returns_null: false,
            },
            _ => unreachable!("not a one-argument intrinsic: {:?}", keyword),
        };

        Ok(Node::new(kind, span))
    }

    /// `KEYWORD '(' expr ',' expr ')' [statement]`.
    fn intrinsic_two(&mut self, keyword: Keyword) -> ParseResult {
        let start = self.current().span.start.clone();
        self.advance();

        self.expect(TokenKind::LParen, "Expected '('")?;
        let first = self.expr()?;
        self.expect(TokenKind::Comma, "Expected ','")?;
        let second = self.expr()?;
        let end = self.current().span.end.clone();
        self.expect(TokenKind::RParen, "Expected ')'")?;

        let body = self.trailing_statement();
        let span = Span::new(start, end);

        let kind = match keyword {
            Keyword::RandInt => NodeKind::RandInt {
                lo: Box::new(first),
                hi: Box::new(second),
                body,
                returns_null: false,
            },
            Keyword::TakeElement => NodeKind::TakeElement {
                container: Box::new(first),
                index: Box::new(second),
                body,
                returns_null: false,
            },
            _ => unreachable!("not a two-argument intrinsic: {:?}", keyword),
        };

        Ok(Node::new(kind, span))
    }

    /// `Argv '[' expr ']' [statement]`.
    fn argv_expr(&mut self) -> ParseResult {
        let start = self.current().span.start.clone();
        self.advance();

        self.expect(TokenKind::LSquare, "Expected '['")?;
        let index = self.expr()?;
        let end = self.current().span.end.clone();
        self.expect(TokenKind::RSquare, "Expected ']'")?;

        let body = self.trailing_statement();
        Ok(Node::new(
            NodeKind::Argv {
                index: Box::new(index),
                body,
                returns_null: false,
            },
            Span::new(start, end),
        ))
    }

    /// Intrinsics accept an optional trailing statement that evaluation
    /// ignores. Parsed speculatively so a bare intrinsic stays valid.
    fn trailing_statement(&mut self) -> Option<Box<Node>> {
        if matches!(self.current().kind, TokenKind::Newline | TokenKind::Eof) {
            return None;
        }

        let checkpoint = self.save();
        match self.statement() {
            Ok(stmt) => Some(Box::new(stmt)),
            Err(_) => {
                self.restore(checkpoint);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(text: &str) -> ParseResult {
        let tokens = Lexer::new("<test>", text).tokenize().unwrap();
        Parser::new(tokens).parse()
    }

    fn statements(node: Node) -> Vec<Node> {
        match node.kind {
            NodeKind::List(stmts) => stmts,
            other => panic!("expected statement list, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence_mul_binds_tighter_than_add() {
        let stmts = statements(parse("1 + 2 * 3").unwrap());
        match &stmts[0].kind {
            NodeKind::BinOp { op: BinOp::Add, rhs, .. } => {
                assert!(matches!(rhs.kind, NodeKind::BinOp { op: BinOp::Mul, .. }));
            }
            other => panic!("expected Add at root, got {:?}", other),
        }
    }

    #[test]
    fn test_power_is_right_associative() {
        let stmts = statements(parse("2 ^ 3 ^ 2").unwrap());
        match &stmts[0].kind {
            NodeKind::BinOp { op: BinOp::Pow, lhs, rhs } => {
                assert!(matches!(lhs.kind, NodeKind::Int(2)));
                assert!(matches!(rhs.kind, NodeKind::BinOp { op: BinOp::Pow, .. }));
            }
            other => panic!("expected Pow at root, got {:?}", other),
        }
    }

    #[test]
    fn test_var_assignment() {
        let stmts = statements(parse("var x = 1 + 2").unwrap());
        match &stmts[0].kind {
            NodeKind::VarAssign(name, value) => {
                assert_eq!(name, "x");
                assert!(matches!(value.kind, NodeKind::BinOp { op: BinOp::Add, .. }));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_var_without_identifier_errors() {
        let err = parse("var = 5").unwrap_err();
        assert_eq!(err.details, "Expected identifier");
    }

    #[test]
    fn test_call_with_args() {
        let stmts = statements(parse("f(1, 2, 3)").unwrap());
        match &stmts[0].kind {
            NodeKind::Call { callee, args } => {
                assert!(matches!(callee.kind, NodeKind::VarAccess(ref n) if n == "f"));
                assert_eq!(args.len(), 3);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_call_errors() {
        let err = parse("f(1, 2").unwrap_err();
        assert_eq!(err.details, "Expected ',' or ')'");
    }

    #[test]
    fn test_arrow_function_auto_returns() {
        let stmts = statements(parse("func sq(n) -> n ^ 2").unwrap());
        match &stmts[0].kind {
            NodeKind::FuncDef {
                name,
                params,
                auto_return,
                ..
            } => {
                assert_eq!(name.as_deref(), Some("sq"));
                assert_eq!(params, &["n"]);
                assert!(auto_return);
            }
            other => panic!("expected func def, got {:?}", other),
        }
    }

    #[test]
    fn test_block_function_requires_end() {
        let ok = parse("func f()\nreturn 1\nend").unwrap();
        match &statements(ok)[0].kind {
            NodeKind::FuncDef { auto_return, .. } => assert!(!auto_return),
            other => panic!("expected func def, got {:?}", other),
        }

        let err = parse("func f()\nreturn 1\n").unwrap_err();
        assert_eq!(err.details, "Expected 'end'");
    }

    #[test]
    fn test_anonymous_function() {
        let stmts = statements(parse("var f = func(a, b) -> a + b").unwrap());
        match &stmts[0].kind {
            NodeKind::VarAssign(_, value) => match &value.kind {
                NodeKind::FuncDef { name, params, .. } => {
                    assert!(name.is_none());
                    assert_eq!(params, &["a", "b"]);
                }
                other => panic!("expected func def, got {:?}", other),
            },
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_if_elif_else_inline() {
        let stmts = statements(parse("if a then 1 elif b then 2 else 3").unwrap());
        match &stmts[0].kind {
            NodeKind::If { cases, else_case } => {
                assert_eq!(cases.len(), 2);
                assert!(cases.iter().all(|c| !c.returns_null));
                assert!(!else_case.as_ref().unwrap().returns_null);
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_if_block_wants_null() {
        let stmts = statements(parse("if a then\n1\nend").unwrap());
        match &stmts[0].kind {
            NodeKind::If { cases, else_case } => {
                assert_eq!(cases.len(), 1);
                assert!(cases[0].returns_null);
                assert!(else_case.is_none());
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_for_with_step() {
        let stmts = statements(parse("for i = 0 to 10 step 2 then printh(i)").unwrap());
        match &stmts[0].kind {
            NodeKind::For {
                var,
                step,
                returns_null,
                ..
            } => {
                assert_eq!(var, "i");
                assert!(step.is_some());
                assert!(!returns_null);
            }
            other => panic!("expected for, got {:?}", other),
        }
    }

    #[test]
    fn test_while_block() {
        let stmts = statements(parse("while i < 3 then\nvar i = i + 1\nend").unwrap());
        match &stmts[0].kind {
            NodeKind::While { returns_null, .. } => assert!(returns_null),
            other => panic!("expected while, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_return() {
        let stmts = statements(parse("func f()\nreturn\nend").unwrap());
        match &stmts[0].kind {
            NodeKind::FuncDef { body, .. } => match &body.kind {
                NodeKind::List(inner) => {
                    assert!(matches!(inner[0].kind, NodeKind::Return(None)));
                }
                other => panic!("expected block, got {:?}", other),
            },
            other => panic!("expected func def, got {:?}", other),
        }
    }

    #[test]
    fn test_intrinsic_without_trailing_statement() {
        let stmts = statements(parse("Exit(0)").unwrap());
        assert!(matches!(
            stmts[0].kind,
            NodeKind::Exit { ref body, .. } if body.is_none()
        ));
    }

    #[test]
    fn test_intrinsic_consumes_trailing_statement() {
        let stmts = statements(parse("sleep(1) printh(2)").unwrap());
        assert_eq!(stmts.len(), 1);
        assert!(matches!(
            stmts[0].kind,
            NodeKind::Sleep { ref body, .. } if body.is_some()
        ));
    }

    #[test]
    fn test_two_argument_intrinsics() {
        let stmts = statements(parse("randInt(1, 10)").unwrap());
        assert!(matches!(stmts[0].kind, NodeKind::RandInt { .. }));

        let stmts = statements(parse("takeElement(lst, 2)").unwrap());
        assert!(matches!(stmts[0].kind, NodeKind::TakeElement { .. }));

        let err = parse("randInt(1)").unwrap_err();
        assert_eq!(err.details, "Expected ','");
    }

    #[test]
    fn test_argv_uses_square_brackets() {
        let stmts = statements(parse("Argv[0]").unwrap());
        assert!(matches!(stmts[0].kind, NodeKind::Argv { .. }));

        let err = parse("Argv(0)").unwrap_err();
        assert_eq!(err.details, "Expected '['");
    }

    #[test]
    fn test_statements_split_on_newline_and_semicolon() {
        let stmts = statements(parse("1; 2\n3").unwrap());
        assert_eq!(stmts.len(), 3);
    }

    #[test]
    fn test_trailing_garbage_is_reported() {
        let err = parse("1\n]").unwrap_err();
        assert_eq!(err.details, "Token cannot appear after previous tokens");
    }

    #[test]
    fn test_failed_speculative_statement_restores_cursor() {
        // The second line never parses; the list ends before it and the
        // leftover token is reported at its own position.
        let err = parse("1\n*").unwrap_err();
        assert_eq!(err.span.start.ln, 1);
    }

    #[test]
    fn test_list_literals() {
        let stmts = statements(parse("[1, 2 + 3, \"x\"]").unwrap());
        match &stmts[0].kind {
            NodeKind::List(elements) => assert_eq!(elements.len(), 3),
            other => panic!("expected list, got {:?}", other),
        }

        let err = parse("[1, 2").unwrap_err();
        assert_eq!(err.details, "Expected ',' or ']'");
    }
}
