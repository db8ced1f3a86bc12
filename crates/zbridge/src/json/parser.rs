//! JSON streaming parser implementation

use crate::error::{Error, ErrorKind, Result, Span};
use crate::json::event::Event;
use crate::lexer::json::JsonLexer;
use crate::lexer::{Token, TokenKind};
use crate::value::{Array, Object, Value};

/// Configuration for the JSON parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
    /// Fail on a repeated key inside one object instead of keeping the last value
    pub reject_duplicate_keys: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_size: 10 * 1024 * 1024, // 10 MB default
            reject_duplicate_keys: true,
        }
    }
}

impl Config {
    /// Create a new config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
            reject_duplicate_keys: true,
        }
    }

    /// Create a new config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
            reject_duplicate_keys: true,
        }
    }

    /// Keep the last value of a repeated key instead of failing
    #[must_use]
    pub const fn allow_duplicate_keys(mut self) -> Self {
        self.reject_duplicate_keys = false;
        self
    }
}

/// What the parser accepts next inside the innermost container
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Just after `{`: a key or `}`
    ObjectStart,
    /// After `,` in an object: a key
    ObjectKey,
    /// After a key: `:`
    ObjectColon,
    /// After `:`: a value
    ObjectValue,
    /// After a member: `,` or `}`
    ObjectNext,
    /// Just after `[`: a value or `]`
    ArrayStart,
    /// After `,` in an array: a value
    ArrayValue,
    /// After an element: `,` or `]`
    ArrayNext,
}

impl State {
    const fn expected(self) -> &'static str {
        match self {
            Self::ObjectStart => "string key or '}'",
            Self::ObjectKey => "string key",
            Self::ObjectColon => "':'",
            Self::ObjectValue | Self::ArrayValue => "value",
            Self::ObjectNext => "',' or '}'",
            Self::ArrayStart => "value or ']'",
            Self::ArrayNext => "',' or ']'",
        }
    }
}

/// Partially built container while assembling a DOM
enum Builder {
    Object { object: Object, key: Option<String> },
    Array(Array),
}

/// Streaming JSON parser with depth and size limits
#[derive(Debug)]
pub struct Parser<'a> {
    lexer: JsonLexer<'a>,
    config: Config,
    depth: u16,
    bytes_parsed: usize,
    /// Stack of container states to track where we are
    stack: Vec<State>,
    /// A complete top-level value has been emitted
    root_done: bool,
    last_span: Span,
}

impl<'a> Parser<'a> {
    /// Create a new parser with default configuration
    pub fn new(input: &'a str) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a new parser with custom configuration
    pub fn with_config(input: &'a str, config: Config) -> Self {
        Self {
            lexer: JsonLexer::new(input),
            config,
            depth: 0,
            bytes_parsed: 0,
            stack: Vec::new(),
            root_done: false,
            last_span: Span::empty(),
        }
    }

    /// Get the next event from the parser
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        let token = self.next_token()?;
        let Token { kind, span } = token;

        let Some(state) = self.stack.last().copied() else {
            return match kind {
                TokenKind::Eof => Ok(None),
                _ if self.root_done => Err(expected_error("end of input", &kind, span)),
                _ => self.begin_value(kind, span).map(Some),
            };
        };

        match (state, kind) {
            (State::ObjectStart | State::ObjectNext, TokenKind::RightBrace) => {
                self.close();
                Ok(Some(Event::ObjectEnd))
            }
            (State::ObjectStart | State::ObjectKey, TokenKind::String(key)) => {
                self.set_state(State::ObjectColon);
                Ok(Some(Event::Key(key)))
            }
            (State::ObjectColon, TokenKind::Colon) => {
                self.set_state(State::ObjectValue);
                self.next_event()
            }
            (State::ObjectValue, kind) => {
                self.set_state(State::ObjectNext);
                self.begin_value(kind, span).map(Some)
            }
            (State::ObjectNext, TokenKind::Comma) => {
                self.set_state(State::ObjectKey);
                self.next_event()
            }
            (State::ArrayStart | State::ArrayNext, TokenKind::RightBracket) => {
                self.close();
                Ok(Some(Event::ArrayEnd))
            }
            (State::ArrayStart | State::ArrayValue, kind) => {
                self.set_state(State::ArrayNext);
                self.begin_value(kind, span).map(Some)
            }
            (State::ArrayNext, TokenKind::Comma) => {
                self.set_state(State::ArrayValue);
                self.next_event()
            }
            (state, kind) => Err(expected_error(state.expected(), &kind, span)),
        }
    }

    /// Parse the next complete value into a DOM
    pub fn parse_value(&mut self) -> Result<Value> {
        let mut stack: Vec<Builder> = Vec::new();

        while let Some(event) = self.next_event()? {
            let value = match event {
                Event::ObjectStart => {
                    stack.push(Builder::Object {
                        object: Object::new(),
                        key: None,
                    });
                    continue;
                }
                Event::ArrayStart => {
                    stack.push(Builder::Array(Array::new()));
                    continue;
                }
                Event::Key(key) => {
                    if let Some(Builder::Object { key: slot, .. }) = stack.last_mut() {
                        *slot = Some(key);
                    }
                    continue;
                }
                Event::ObjectEnd | Event::ArrayEnd => match stack.pop() {
                    Some(Builder::Object { object, .. }) => Value::Object(object),
                    Some(Builder::Array(array)) => Value::Array(array),
                    None => return Err(self.error(ErrorKind::InvalidToken)),
                },
                Event::Value(value) => value,
            };

            match stack.last_mut() {
                None => return Ok(value),
                Some(Builder::Array(array)) => array.push(value),
                Some(Builder::Object { object, key }) => {
                    let key = key
                        .take()
                        .ok_or_else(|| self.error(ErrorKind::InvalidToken))?;
                    self.insert_member(object, key, value)?;
                }
            }
        }

        Err(self.error(ErrorKind::Expected {
            expected: "value".to_string(),
            found: TokenKind::Eof.name().to_string(),
        }))
    }

    /// Parse a single value and require that nothing but whitespace follows it
    pub fn parse_document(&mut self) -> Result<Value> {
        let value = self.parse_value()?;
        match self.next_event()? {
            None => Ok(value),
            Some(_) => Err(self.error(ErrorKind::InvalidToken)),
        }
    }

    // Helper methods

    fn next_token(&mut self) -> Result<Token> {
        let token = self.lexer.next_token()?;
        self.last_span = token.span;
        self.bytes_parsed = token.span.end.offset;

        if self.config.max_size > 0 && self.bytes_parsed > self.config.max_size {
            return Err(Error::new(
                ErrorKind::MaxSizeExceeded {
                    max: self.config.max_size,
                },
                token.span,
            ));
        }
        Ok(token)
    }

    fn begin_value(&mut self, kind: TokenKind, span: Span) -> Result<Event> {
        let event = match kind {
            TokenKind::LeftBrace => {
                self.open(State::ObjectStart, span)?;
                return Ok(Event::ObjectStart);
            }
            TokenKind::LeftBracket => {
                self.open(State::ArrayStart, span)?;
                return Ok(Event::ArrayStart);
            }
            TokenKind::Null => Event::Value(Value::Null),
            TokenKind::True => Event::Value(Value::Bool(true)),
            TokenKind::False => Event::Value(Value::Bool(false)),
            TokenKind::String(s) => Event::Value(Value::String(s)),
            TokenKind::Number(n) => Event::Value(Value::Number(n)),
            other => return Err(expected_error("value", &other, span)),
        };

        if self.stack.is_empty() {
            self.root_done = true;
        }
        Ok(event)
    }

    fn insert_member(&self, object: &mut Object, key: String, value: Value) -> Result<()> {
        if self.config.reject_duplicate_keys && object.contains_key(&key) {
            return Err(Error::new(ErrorKind::DuplicateKey { key }, self.last_span));
        }
        object.insert(key, value);
        Ok(())
    }

    fn set_state(&mut self, state: State) {
        if let Some(top) = self.stack.last_mut() {
            *top = state;
        }
    }

    fn open(&mut self, state: State, span: Span) -> Result<()> {
        if self.config.max_depth > 0 && self.depth >= self.config.max_depth {
            return Err(Error::new(
                ErrorKind::MaxDepthExceeded {
                    max: self.config.max_depth,
                },
                span,
            ));
        }
        self.depth = self.depth.saturating_add(1);
        self.stack.push(state);
        Ok(())
    }

    fn close(&mut self) {
        self.stack.pop();
        self.depth = self.depth.saturating_sub(1);
        if self.stack.is_empty() {
            self.root_done = true;
        }
    }

    fn error(&self, kind: ErrorKind) -> Error {
        Error::new(kind, self.last_span)
    }
}

fn expected_error(expected: &str, found: &TokenKind, span: Span) -> Error {
    Error::new(
        ErrorKind::Expected {
            expected: expected.to_string(),
            found: found.name().to_string(),
        },
        span,
    )
}
