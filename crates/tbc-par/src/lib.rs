//! tbc-par - Recursive-descent parser for the TinyBasic dialect.
//!
//! Turns the token stream from `tbc-lex` into the numbered [`ast::Program`]:
//! an ordered sequence of [`ast::LabelledGroup`]s. Nothing here resolves a
//! jump target or extracts a procedure -- that's `tbc-sem`'s job. In
//! particular `IF a THEN IF b THEN S` is parsed as nested `If` statements,
//! not flattened into a conjunction, because the structuring pass needs to
//! see the outermost guard before deciding how to fold the chain.

pub mod ast;
pub mod error;

use ast::{BinOp, Condition, Expression, LabelledGroup, PrintItem, Program, RelOp, Statement};
pub use error::{ParseError, Result};
use tbc_lex::{Token, TokenKind};

/// A position-indexed parser over a token vector. The grammar never needs
/// more than one token of lookahead.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, position: 0 }
    }

    /// Parse the entire token stream into a [`Program`].
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut groups = Vec::new();
        let mut seen_lines = std::collections::HashSet::new();

        self.skip_blank_lines();
        while !self.is_at_end() {
            let group = self.parse_line()?;
            if let Some(n) = group.line_number {
                if !seen_lines.insert(n) {
                    return Err(ParseError::DuplicateLine {
                        line: group.span.line,
                        line_number: n,
                    });
                }
            }
            groups.push(group);
            self.skip_blank_lines();
        }

        Ok(groups)
    }

    /// `line ::= [NUMBER] statement NEWLINE`
    fn parse_line(&mut self) -> Result<LabelledGroup> {
        let start_span = self.current().span;

        let line_number = if let TokenKind::Number(n) = self.current().kind {
            self.advance();
            Some(n as u32)
        } else {
            None
        };

        let statement = self.parse_statement()?;

        if !self.is_at_end() {
            self.expect_newline()?;
        }

        Ok(LabelledGroup {
            line_number,
            statements: vec![statement],
            span: start_span,
        })
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.current().kind.clone() {
            TokenKind::Print => self.parse_print(),
            TokenKind::Input => self.parse_input(),
            TokenKind::Let => self.parse_let(),
            TokenKind::If => self.parse_if(),
            TokenKind::Goto => self.parse_goto(),
            TokenKind::Gosub => self.parse_gosub(),
            TokenKind::Return => {
                self.advance();
                Ok(Statement::Return)
            }
            TokenKind::End => {
                self.advance();
                Ok(Statement::End)
            }
            TokenKind::Rem(text) => {
                self.advance();
                Ok(Statement::Rem(text))
            }
            _ => Err(self.unexpected("a statement")),
        }
    }

    fn parse_print(&mut self) -> Result<Statement> {
        self.advance(); // PRINT
        let mut items = vec![self.parse_print_item()?];
        while self.match_kind(&TokenKind::Comma) {
            items.push(self.parse_print_item()?);
        }
        Ok(Statement::Print(items))
    }

    fn parse_print_item(&mut self) -> Result<PrintItem> {
        if let TokenKind::String(s) = self.current().kind.clone() {
            self.advance();
            Ok(PrintItem::Str(s))
        } else {
            Ok(PrintItem::Expr(self.parse_expression()?))
        }
    }

    fn parse_input(&mut self) -> Result<Statement> {
        self.advance(); // INPUT
        let mut vars = vec![self.expect_var()?];
        while self.match_kind(&TokenKind::Comma) {
            vars.push(self.expect_var()?);
        }
        Ok(Statement::Input(vars))
    }

    fn parse_let(&mut self) -> Result<Statement> {
        self.advance(); // LET
        let var = self.expect_var()?;
        self.expect_kind(&TokenKind::Eq, "=")?;
        let expr = self.parse_expression()?;
        Ok(Statement::Let(var, expr))
    }

    fn parse_if(&mut self) -> Result<Statement> {
        self.advance(); // IF
        let lhs = self.parse_expression()?;
        let op = self.parse_relop()?;
        let rhs = self.parse_expression()?;
        self.expect_kind(&TokenKind::Then, "THEN")?;
        let body = self.parse_statement()?;
        Ok(Statement::If(Condition { lhs, op, rhs }, Box::new(body)))
    }

    fn parse_goto(&mut self) -> Result<Statement> {
        self.advance(); // GOTO
        Ok(Statement::Goto(self.expect_number()?))
    }

    fn parse_gosub(&mut self) -> Result<Statement> {
        self.advance(); // GOSUB
        Ok(Statement::Gosub(self.expect_number()?))
    }

    fn parse_relop(&mut self) -> Result<RelOp> {
        let op = match self.current().kind {
            TokenKind::Lt => RelOp::Lt,
            TokenKind::Gt => RelOp::Gt,
            TokenKind::Eq => RelOp::Eq,
            TokenKind::LtEq => RelOp::LtEq,
            TokenKind::GtEq => RelOp::GtEq,
            TokenKind::NotEq => RelOp::NotEq,
            _ => return Err(self.unexpected("a relational operator")),
        };
        self.advance();
        Ok(op)
    }

    /// `expression ::= term (("+"|"-") term)*`
    fn parse_expression(&mut self) -> Result<Expression> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_term()?;
            lhs = Expression::Binary(Box::new(lhs), op, Box::new(rhs));
        }
        Ok(lhs)
    }

    /// `term ::= factor (("*"|"/") factor)*`
    fn parse_term(&mut self) -> Result<Expression> {
        let mut lhs = self.parse_factor()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_factor()?;
            lhs = Expression::Binary(Box::new(lhs), op, Box::new(rhs));
        }
        Ok(lhs)
    }

    /// `factor ::= VAR | NUMBER | "(" expression ")"`
    fn parse_factor(&mut self) -> Result<Expression> {
        match self.current().kind.clone() {
            TokenKind::Var(c) => {
                self.advance();
                Ok(Expression::Var(c))
            }
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expression::Number(n))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_kind(&TokenKind::RParen, ")")?;
                Ok(inner)
            }
            _ => Err(self.unexpected("a variable, number, or '('")),
        }
    }

    // -- token-stream plumbing -------------------------------------------

    fn current(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if &self.current().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_kind(&mut self, kind: &TokenKind, description: &str) -> Result<()> {
        if &self.current().kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(description))
        }
    }

    fn expect_newline(&mut self) -> Result<()> {
        self.expect_kind(&TokenKind::Newline, "end of line")
    }

    fn expect_var(&mut self) -> Result<char> {
        if let TokenKind::Var(c) = self.current().kind {
            self.advance();
            Ok(c)
        } else {
            Err(self.unexpected("a variable"))
        }
    }

    fn expect_number(&mut self) -> Result<u32> {
        if let TokenKind::Number(n) = self.current().kind {
            self.advance();
            Ok(n as u32)
        } else {
            Err(self.unexpected("a line number"))
        }
    }

    /// Skip blank lines: runs of consecutive NEWLINE tokens with nothing
    /// between them, which a source file can produce via trailing or
    /// repeated blank lines.
    fn skip_blank_lines(&mut self) {
        while matches!(self.current().kind, TokenKind::Newline) {
            self.advance();
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.current();
        if matches!(token.kind, TokenKind::Eof) {
            ParseError::UnexpectedEof {
                expected: expected.to_string(),
            }
        } else {
            ParseError::UnexpectedToken {
                line: token.span.line,
                expected: expected.to_string(),
                found: format!("{:?}", token.kind),
            }
        }
    }
}

/// Convenience entry point: lex is assumed to have already succeeded.
pub fn parse(tokens: Vec<Token>) -> Result<Program> {
    Parser::new(tokens).parse_program()
}
