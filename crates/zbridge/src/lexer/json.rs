//! JSON-specific lexer

use crate::error::{Error, ErrorKind, Result, Span};
use crate::lexer::cursor::Cursor;
use crate::lexer::token::{Token, TokenKind};

/// JSON lexer that tokenizes JSON text
#[derive(Clone, Debug)]
pub struct JsonLexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> JsonLexer<'a> {
    /// Create a new JSON lexer over `input`
    pub const fn new(input: &'a str) -> Self {
        Self {
            cursor: Cursor::new(input),
        }
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        self.cursor.skip_whitespace();

        let start = self.cursor.position();

        let kind = match self.cursor.current() {
            None => TokenKind::Eof,
            Some(b) => match b {
                b'{' => self.single(TokenKind::LeftBrace),
                b'}' => self.single(TokenKind::RightBrace),
                b'[' => self.single(TokenKind::LeftBracket),
                b']' => self.single(TokenKind::RightBracket),
                b':' => self.single(TokenKind::Colon),
                b',' => self.single(TokenKind::Comma),
                b'"' => self.lex_string()?,
                b'n' => self.lex_literal("null", TokenKind::Null)?,
                b't' => self.lex_literal("true", TokenKind::True)?,
                b'f' => self.lex_literal("false", TokenKind::False)?,
                b'-' | b'0'..=b'9' => self.lex_number()?,
                _ => {
                    return Err(Error::at(
                        ErrorKind::InvalidToken,
                        start.offset,
                        start.line,
                        start.col,
                    ));
                }
            },
        };

        let end = self.cursor.position();
        Ok(Token::new(kind, Span::new(start, end)))
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }

    fn error_here(&self, kind: ErrorKind) -> Error {
        Error::new(kind, self.cursor.span_here())
    }

    /// Lex a string literal
    fn lex_string(&mut self) -> Result<TokenKind> {
        // Consume opening quote
        self.cursor.advance();

        let mut result = String::new();

        loop {
            match self.cursor.current_char() {
                None => return Err(self.error_here(ErrorKind::UnterminatedString)),
                Some('"') => {
                    self.cursor.advance();
                    break;
                }
                Some('\\') => {
                    self.cursor.advance();
                    let escaped = match self.cursor.current() {
                        Some(b'"') => '"',
                        Some(b'\\') => '\\',
                        Some(b'/') => '/',
                        Some(b'b') => '\x08',
                        Some(b'f') => '\x0C',
                        Some(b'n') => '\n',
                        Some(b'r') => '\r',
                        Some(b't') => '\t',
                        Some(b'u') => {
                            self.cursor.advance();
                            result.push(self.lex_unicode_escape()?);
                            continue;
                        }
                        _ => return Err(self.error_here(ErrorKind::InvalidEscapeSequence)),
                    };
                    result.push(escaped);
                    self.cursor.advance();
                }
                // JSON strings cannot contain raw control characters
                Some(ch) if ch < '\u{20}' => {
                    return Err(self.error_here(ErrorKind::InvalidToken));
                }
                Some(ch) => {
                    result.push(ch);
                    self.cursor.advance();
                }
            }
        }

        Ok(TokenKind::String(result))
    }

    /// Lex a unicode escape (`\uXXXX`), joining UTF-16 surrogate pairs
    fn lex_unicode_escape(&mut self) -> Result<char> {
        let start = self.cursor.span_here();
        let high = self.lex_hex4()?;

        let code = if (0xD800..0xDC00).contains(&high) {
            if !self.cursor.starts_with(b"\\u") {
                return Err(Error::new(ErrorKind::InvalidUnicodeEscape, start));
            }
            self.cursor.advance_by(2);
            let low = self.lex_hex4()?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(Error::new(ErrorKind::InvalidUnicodeEscape, start));
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else {
            high
        };

        char::from_u32(code).ok_or_else(|| Error::new(ErrorKind::InvalidUnicodeEscape, start))
    }

    fn lex_hex4(&mut self) -> Result<u32> {
        let mut code: u32 = 0;
        for _ in 0..4 {
            let digit = self
                .cursor
                .current()
                .and_then(|b| char::from(b).to_digit(16))
                .ok_or_else(|| self.error_here(ErrorKind::InvalidUnicodeEscape))?;
            code = code * 16 + digit;
            self.cursor.advance();
        }
        Ok(code)
    }

    /// Lex `null`, `true` or `false`
    fn lex_literal(&mut self, literal: &str, kind: TokenKind) -> Result<TokenKind> {
        if self.cursor.starts_with(literal.as_bytes()) {
            self.cursor.advance_by(literal.len());
            Ok(kind)
        } else {
            Err(self.error_here(ErrorKind::InvalidToken))
        }
    }

    fn skip_digits(&mut self) {
        while let Some(b'0'..=b'9') = self.cursor.current() {
            self.cursor.advance();
        }
    }

    /// Lex a number literal
    fn lex_number(&mut self) -> Result<TokenKind> {
        let start = self.cursor.pos();

        // Optional minus sign
        self.cursor.consume(b'-');

        // Integer part
        match self.cursor.current() {
            Some(b'0') => self.cursor.advance(),
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(self.error_here(ErrorKind::InvalidNumber)),
        }

        // Optional fraction part
        if self.cursor.consume(b'.') {
            if !matches!(self.cursor.current(), Some(b'0'..=b'9')) {
                return Err(self.error_here(ErrorKind::InvalidNumber));
            }
            self.skip_digits();
        }

        // Optional exponent part
        if matches!(self.cursor.current(), Some(b'e' | b'E')) {
            self.cursor.advance();
            if matches!(self.cursor.current(), Some(b'+' | b'-')) {
                self.cursor.advance();
            }
            if !matches!(self.cursor.current(), Some(b'0'..=b'9')) {
                return Err(self.error_here(ErrorKind::InvalidNumber));
            }
            self.skip_digits();
        }

        let literal = self.cursor.slice_from(start);
        let num = literal
            .parse::<f64>()
            .map_err(|_| self.error_here(ErrorKind::InvalidNumber))?;
        if !num.is_finite() {
            return Err(self.error_here(ErrorKind::InvalidNumber));
        }

        Ok(TokenKind::Number(num))
    }
}

impl Iterator for JsonLexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(token) if token.kind == TokenKind::Eof => None,
            Ok(token) => Some(Ok(token)),
            Err(e) => Some(Err(e)),
        }
    }
}
