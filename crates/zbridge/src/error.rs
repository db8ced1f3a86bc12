//! Error types for zbridge

use std::fmt;
use thiserror::Error;

/// Position in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.offset, self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span representing a range in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub const fn at(pos: Pos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Span for errors that do not point into a document
    pub const fn empty() -> Self {
        Self {
            start: Pos::new(0, 0, 0),
            end: Pos::new(0, 0, 0),
        }
    }

    /// Line numbers start at 1, so a zero line means "no location"
    pub const fn is_empty(&self) -> bool {
        self.start.line == 0
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    // JSON syntax
    InvalidEscapeSequence,
    InvalidUnicodeEscape,
    UnterminatedString,
    InvalidNumber,
    InvalidToken,
    Expected { expected: String, found: String },
    DuplicateKey { key: String },

    // Parser limits
    MaxDepthExceeded { max: u16 },
    MaxSizeExceeded { max: usize },

    // XML syntax
    MalformedXml,

    // Conversion
    EmptyInput,
    UnsupportedKeyName { key: String },
    InvalidRoot { found: &'static str },
    InvalidReservedValue { key: String },
    UnrepresentableCharacter { key: String },
    RootMismatch { expected: String, found: String },

    // Transform adapter
    IoRead,
    IoWrite,
    MalformedMessageId { id: String },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEscapeSequence => write!(f, "invalid escape sequence"),
            Self::InvalidUnicodeEscape => write!(f, "invalid unicode escape"),
            Self::UnterminatedString => write!(f, "unterminated string"),
            Self::InvalidNumber => write!(f, "invalid number"),
            Self::InvalidToken => write!(f, "invalid token"),
            Self::Expected { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::DuplicateKey { key } => write!(f, "duplicate key: {key}"),
            Self::MaxDepthExceeded { max } => {
                write!(f, "max depth exceeded: {max}")
            }
            Self::MaxSizeExceeded { max } => write!(f, "max size exceeded: {max}"),
            Self::MalformedXml => write!(f, "malformed xml"),
            Self::EmptyInput => write!(f, "empty input"),
            Self::UnsupportedKeyName { key } => {
                write!(f, "key {key:?} is not a valid xml name")
            }
            Self::InvalidRoot { found } => {
                write!(f, "document root must be an object, found {found}")
            }
            Self::InvalidReservedValue { key } => {
                write!(f, "reserved key {key:?} must hold a scalar value")
            }
            Self::UnrepresentableCharacter { key } => {
                write!(f, "value of {key:?} contains U+0000, which xml cannot represent")
            }
            Self::RootMismatch { expected, found } => {
                write!(f, "expected root element <{expected}>, found <{found}>")
            }
            Self::IoRead => write!(f, "failed to read payload"),
            Self::IoWrite => write!(f, "failed to write payload"),
            Self::MalformedMessageId { id } => write!(
                f,
                "message id must be 32 hexadecimal characters, got {id:?} ({} chars)",
                id.chars().count()
            ),
        }
    }
}

/// Main error type for zbridge
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span,
            message,
        }
    }

    pub fn with_message(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Error that does not point into a document
    pub fn bare(kind: ErrorKind) -> Self {
        Self::new(kind, Span::empty())
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create error at specific position
    pub fn at(kind: ErrorKind, offset: usize, line: u32, col: u32) -> Self {
        let pos = Pos::new(offset, line, col);
        Self::new(kind, Span::new(pos, pos))
    }

    pub(crate) fn io_read(err: &std::io::Error) -> Self {
        Self::with_message(
            ErrorKind::IoRead,
            Span::empty(),
            format!("failed to read payload: {err}"),
        )
    }

    pub(crate) fn io_write(err: &std::io::Error) -> Self {
        Self::with_message(
            ErrorKind::IoWrite,
            Span::empty(),
            format!("failed to write payload: {err}"),
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "error at {}: {}", self.span.start, self.message)
        }
    }
}

/// Result type alias for zbridge
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_display() {
        let pos = Pos::new(42, 10, 5);
        assert_eq!(pos.to_string(), "42:10:5");
    }

    #[test]
    fn test_error_creation() {
        let err = Error::at(ErrorKind::InvalidToken, 0, 1, 1);
        assert_eq!(err.kind(), &ErrorKind::InvalidToken);
    }

    #[test]
    fn test_positioned_error_display() {
        let err = Error::with_message(
            ErrorKind::MalformedXml,
            Span::at(Pos::new(10, 2, 5)),
            "mismatched closing tag",
        );
        assert_eq!(err.to_string(), "error at 10:2:5: mismatched closing tag");
    }

    #[test]
    fn test_bare_error_display() {
        let err = Error::bare(ErrorKind::EmptyInput);
        assert_eq!(err.to_string(), "empty input");
        assert!(err.span().is_empty());
    }

    #[test]
    fn test_message_id_error_reports_length() {
        let err = Error::bare(ErrorKind::MalformedMessageId {
            id: "abc".to_string(),
        });
        assert!(err.to_string().contains("(3 chars)"));
    }

    #[test]
    fn test_io_errors_keep_cause() {
        let cause = std::io::Error::other("broken pipe");
        let err = Error::io_write(&cause);
        assert_eq!(err.kind(), &ErrorKind::IoWrite);
        assert!(err.to_string().contains("broken pipe"));
    }
}
