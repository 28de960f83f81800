//! tbc-lex - Lexical analysis for the TinyBasic dialect.
//!
//! Turns source text into a flat token stream. Whitespace within a line is
//! insignificant; a newline always ends the current logical line (the
//! grammar has no line continuation). `REM` swallows the rest of its line
//! into a single `Rem` token rather than being treated as a comment that
//! disappears, because its line number may still be a jump target.

pub mod cursor;
pub mod error;

use cursor::Cursor;
pub use error::{LexError, Result};
use tbc_util::Span;

/// The kind of a lexical token.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Number(i64),
    String(String),
    Var(char),

    Print,
    If,
    Then,
    Goto,
    Gosub,
    Return,
    Input,
    Let,
    End,
    Rem(String),

    Lt,
    Gt,
    Eq,
    LtEq,
    GtEq,
    NotEq,

    Plus,
    Minus,
    Star,
    Slash,

    Comma,
    LParen,
    RParen,

    Newline,
    Eof,
}

/// A single lexical token: its kind plus the span it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Scans BASIC source text into a `Vec<Token>`.
///
/// One `Lexer` consumes one source string; it is not reusable after
/// `tokenize` returns.
pub struct Lexer<'source> {
    cursor: Cursor<'source>,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Tokenize the entire input, stopping at the first error.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token> {
        self.skip_insignificant_whitespace();

        let start = self.cursor.position();
        let (line, column) = (self.cursor.line(), self.cursor.column());

        if self.cursor.is_at_end() {
            return Ok(self.emit(TokenKind::Eof, start, line, column));
        }

        let c = self.cursor.current_char();

        if c == '\n' {
            self.cursor.advance();
            return Ok(self.emit(TokenKind::Newline, start, line, column));
        }
        if c == '\r' {
            self.cursor.advance();
            if self.cursor.current_char() == '\n' {
                self.cursor.advance();
            }
            return Ok(self.emit(TokenKind::Newline, start, line, column));
        }

        if c.is_ascii_digit() {
            return self.lex_number(start, line, column);
        }
        if c.is_ascii_uppercase() {
            return self.lex_word(start, line, column);
        }
        if c == '"' {
            return self.lex_string(start, line, column);
        }

        match c {
            '+' => {
                self.cursor.advance();
                Ok(self.emit(TokenKind::Plus, start, line, column))
            }
            '-' => {
                self.cursor.advance();
                Ok(self.emit(TokenKind::Minus, start, line, column))
            }
            '*' => {
                self.cursor.advance();
                Ok(self.emit(TokenKind::Star, start, line, column))
            }
            '/' => {
                self.cursor.advance();
                Ok(self.emit(TokenKind::Slash, start, line, column))
            }
            ',' => {
                self.cursor.advance();
                Ok(self.emit(TokenKind::Comma, start, line, column))
            }
            '(' => {
                self.cursor.advance();
                Ok(self.emit(TokenKind::LParen, start, line, column))
            }
            ')' => {
                self.cursor.advance();
                Ok(self.emit(TokenKind::RParen, start, line, column))
            }
            '=' => {
                self.cursor.advance();
                Ok(self.emit(TokenKind::Eq, start, line, column))
            }
            '<' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.emit(TokenKind::LtEq, start, line, column))
                } else if self.cursor.match_char('>') {
                    Ok(self.emit(TokenKind::NotEq, start, line, column))
                } else {
                    Ok(self.emit(TokenKind::Lt, start, line, column))
                }
            }
            '>' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.emit(TokenKind::GtEq, start, line, column))
                } else {
                    Ok(self.emit(TokenKind::Gt, start, line, column))
                }
            }
            other => Err(LexError::UnknownChar { line, ch: other }),
        }
    }

    /// Skips spaces and tabs, but never a newline -- newlines are tokens.
    fn skip_insignificant_whitespace(&mut self) {
        while matches!(self.cursor.current_char(), ' ' | '\t') {
            self.cursor.advance();
        }
    }

    fn lex_number(&mut self, start: usize, line: u32, column: u32) -> Result<Token> {
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        let value: i64 = text
            .parse()
            .map_err(|_| LexError::MalformedNumber { line, text: text.to_string() })?;
        Ok(self.emit(TokenKind::Number(value), start, line, column))
    }

    /// A single uppercase letter is a `VAR` unless the run of uppercase
    /// letters spells a keyword; longest-match keywords win over `VAR`.
    fn lex_word(&mut self, start: usize, line: u32, column: u32) -> Result<Token> {
        while self.cursor.current_char().is_ascii_uppercase() {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);

        let kind = match text {
            "PRINT" => TokenKind::Print,
            "IF" => TokenKind::If,
            "THEN" => TokenKind::Then,
            "GOTO" => TokenKind::Goto,
            "GOSUB" => TokenKind::Gosub,
            "RETURN" => TokenKind::Return,
            "INPUT" => TokenKind::Input,
            "LET" => TokenKind::Let,
            "END" => TokenKind::End,
            "REM" => {
                // Swallow the rest of the line verbatim as the comment body.
                if self.cursor.current_char() == ' ' {
                    self.cursor.advance();
                }
                let body_start = self.cursor.position();
                while !self.cursor.is_at_end()
                    && self.cursor.current_char() != '\n'
                    && self.cursor.current_char() != '\r'
                {
                    self.cursor.advance();
                }
                TokenKind::Rem(self.cursor.slice_from(body_start).to_string())
            }
            _ if text.len() == 1 => TokenKind::Var(text.chars().next().unwrap()),
            _ => {
                return Err(LexError::UnknownChar {
                    line,
                    ch: text.chars().next().unwrap(),
                })
            }
        };
        Ok(self.emit(kind, start, line, column))
    }

    fn lex_string(&mut self, start: usize, line: u32, column: u32) -> Result<Token> {
        self.cursor.advance(); // opening quote
        let body_start = self.cursor.position();
        loop {
            if self.cursor.is_at_end() || self.cursor.current_char() == '\n' {
                return Err(LexError::UnterminatedString { line });
            }
            if self.cursor.current_char() == '"' {
                break;
            }
            self.cursor.advance();
        }
        let body = self.cursor.slice_from(body_start).to_string();
        self.cursor.advance(); // closing quote
        Ok(self.emit(TokenKind::String(body), start, line, column))
    }

    fn emit(&self, kind: TokenKind, start: usize, line: u32, column: u32) -> Token {
        let end = self.cursor.position();
        Token::new(kind, Span::new(start, end, line, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_let_statement() {
        assert_eq!(
            kinds("10 LET A = 5\n"),
            vec![
                TokenKind::Number(10),
                TokenKind::Let,
                TokenKind::Var('A'),
                TokenKind::Eq,
                TokenKind::Number(5),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_relational_operators() {
        assert_eq!(kinds("<="), vec![TokenKind::LtEq, TokenKind::Eof]);
        assert_eq!(kinds("<>"), vec![TokenKind::NotEq, TokenKind::Eof]);
        assert_eq!(kinds(">="), vec![TokenKind::GtEq, TokenKind::Eof]);
        assert_eq!(kinds("<"), vec![TokenKind::Lt, TokenKind::Eof]);
        assert_eq!(kinds(">"), vec![TokenKind::Gt, TokenKind::Eof]);
        assert_eq!(kinds("="), vec![TokenKind::Eq, TokenKind::Eof]);
    }

    #[test]
    fn lexes_print_with_string_and_expr() {
        assert_eq!(
            kinds(r#"PRINT "X=",X"#),
            vec![
                TokenKind::Print,
                TokenKind::String("X=".to_string()),
                TokenKind::Comma,
                TokenKind::Var('X'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_rem_to_end_of_line() {
        assert_eq!(
            kinds("REM hello world\nPRINT A"),
            vec![
                TokenKind::Rem("hello world".to_string()),
                TokenKind::Newline,
                TokenKind::Print,
                TokenKind::Var('A'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = Lexer::new("PRINT \"oops").tokenize().unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { line: 1 }));
    }

    #[test]
    fn unknown_character_is_an_error() {
        let err = Lexer::new("LET A = @").tokenize().unwrap_err();
        assert!(matches!(err, LexError::UnknownChar { line: 1, ch: '@' }));
    }

    #[test]
    fn malformed_number_is_rejected() {
        // A 32-character run of digits overflows i64; this exercises the
        // MalformedNumber path without needing a non-digit character.
        let huge = "9".repeat(40);
        let err = Lexer::new(&huge).tokenize().unwrap_err();
        assert!(matches!(err, LexError::MalformedNumber { .. }));
    }

    #[test]
    fn crlf_line_endings_produce_one_newline_token() {
        assert_eq!(
            kinds("END\r\nEND"),
            vec![TokenKind::End, TokenKind::Newline, TokenKind::End, TokenKind::Eof]
        );
    }

    #[test]
    fn multi_letter_identifier_that_is_not_a_keyword_is_an_error() {
        let err = Lexer::new("LET AB = 1").tokenize().unwrap_err();
        assert!(matches!(err, LexError::UnknownChar { .. }));
    }
}
