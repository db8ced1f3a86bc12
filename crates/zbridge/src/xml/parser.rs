//! XML parser implementation

use indexmap::IndexMap;

use crate::error::{Error, ErrorKind, Result};
use crate::lexer::Cursor;
use crate::xml::model::{Document, Element, Node};
use crate::xml::{is_name_char, is_name_start_char};

/// Configuration for the XML parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum element nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_size: 10 * 1024 * 1024, // 10 MB default
        }
    }
}

impl Config {
    /// Create a new config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
        }
    }

    /// Create a new config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }
}

/// XML parser.
///
/// Builds a [`Document`] from a complete in-memory string. Elements are kept
/// on an explicit stack, so nesting is bounded by [`Config::max_depth`]
/// rather than by the call stack.
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: Config,
}

impl<'a> Parser<'a> {
    /// Create a new XML parser with default configuration
    pub fn new(input: &'a str) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a new XML parser with custom configuration
    pub const fn with_config(input: &'a str, config: Config) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
        }
    }

    /// Parse an XML document
    pub fn parse(&mut self) -> Result<Document> {
        if self.config.max_size > 0 && self.cursor.len() > self.config.max_size {
            return Err(Error::bare(ErrorKind::MaxSizeExceeded {
                max: self.config.max_size,
            }));
        }
        if self.cursor.remaining().chars().all(is_xml_whitespace) {
            return Err(Error::bare(ErrorKind::EmptyInput));
        }

        self.skip_misc(true)?;
        match self.cursor.current() {
            None => return Err(self.error_here("missing root element")),
            Some(b'<') => {}
            Some(_) => return Err(self.error_here("text before root element")),
        }

        let root = self.parse_root()?;

        self.skip_misc(false)?;
        if !self.cursor.is_eof() {
            return Err(self.error_here("content after root element"));
        }

        Ok(Document { root })
    }

    fn parse_root(&mut self) -> Result<Element> {
        let mut open: Vec<Element> = Vec::new();
        let mut text = String::new();

        let (root, empty) = self.parse_start_tag()?;
        if empty {
            return Ok(root);
        }
        self.enter(&mut open, root)?;

        loop {
            if self.cursor.is_eof() {
                let name = open.last().map(|e| e.name.as_str()).unwrap_or_default();
                return Err(self.error_here(&format!("unterminated element <{name}>")));
            }

            if self.cursor.starts_with(b"</") {
                flush_text(&mut open, &mut text);
                let start = self.cursor.span_here();
                let name = self.parse_end_tag()?;
                let Some(element) = open.pop() else {
                    return Err(self.error_here("unexpected closing tag"));
                };
                if element.name != name {
                    return Err(Error::with_message(
                        ErrorKind::MalformedXml,
                        start,
                        format!(
                            "mismatched closing tag: expected </{}>, found </{name}>",
                            element.name
                        ),
                    ));
                }
                match open.last_mut() {
                    Some(parent) => parent.children.push(Node::Element(element)),
                    None => return Ok(element),
                }
            } else if self.cursor.starts_with(b"<!--") {
                self.skip_comment()?;
            } else if self.cursor.starts_with(b"<![CDATA[") {
                self.parse_cdata(&mut text)?;
            } else if self.cursor.starts_with(b"<?") {
                self.skip_processing_instruction()?;
            } else if self.cursor.starts_with(b"<!") {
                return Err(self.error_here("unexpected markup declaration"));
            } else if self.cursor.current() == Some(b'<') {
                flush_text(&mut open, &mut text);
                let (element, empty) = self.parse_start_tag()?;
                if empty {
                    if let Some(parent) = open.last_mut() {
                        parent.children.push(Node::Element(element));
                    }
                } else {
                    self.enter(&mut open, element)?;
                }
            } else {
                self.parse_char_data(&mut text)?;
            }
        }
    }

    fn enter(&self, open: &mut Vec<Element>, element: Element) -> Result<()> {
        let max = usize::from(self.config.max_depth);
        if max > 0 && open.len() >= max {
            return Err(Error::new(
                ErrorKind::MaxDepthExceeded {
                    max: self.config.max_depth,
                },
                self.cursor.span_here(),
            ));
        }
        open.push(element);
        Ok(())
    }

    /// Parse `<name attr="v" ...>` or `<name .../>`; the flag is true for the latter
    fn parse_start_tag(&mut self) -> Result<(Element, bool)> {
        self.expect_byte(b'<')?;
        let name = self.parse_name()?;
        let mut attributes = IndexMap::new();

        loop {
            let had_space = self.skip_whitespace();
            match self.cursor.current() {
                Some(b'>') => {
                    self.cursor.advance();
                    return Ok((Element::new(name).with_attributes(attributes), false));
                }
                Some(b'/') => {
                    self.cursor.advance();
                    self.expect_byte(b'>')?;
                    return Ok((Element::new(name).with_attributes(attributes), true));
                }
                None => return Err(self.error_here("unexpected end of input in tag")),
                Some(_) if !had_space => {
                    return Err(self.error_here("expected whitespace before attribute"));
                }
                Some(_) => {}
            }

            let start = self.cursor.span_here();
            let attr = self.parse_name()?;
            self.skip_whitespace();
            self.expect_byte(b'=')?;
            self.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attributes.contains_key(&attr) {
                return Err(Error::with_message(
                    ErrorKind::MalformedXml,
                    start,
                    format!("duplicate attribute '{attr}'"),
                ));
            }
            attributes.insert(attr, value);
        }
    }

    fn parse_end_tag(&mut self) -> Result<String> {
        self.cursor.advance_by(2);
        let name = self.parse_name()?;
        self.skip_whitespace();
        self.expect_byte(b'>')?;
        Ok(name)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(b'"') => b'"',
            Some(b'\'') => b'\'',
            _ => return Err(self.error_here("expected quoted attribute value")),
        };
        self.cursor.advance();

        let mut value = String::new();
        loop {
            let Some(ch) = self.cursor.current_char() else {
                return Err(self.error_here("unterminated attribute value"));
            };
            match ch {
                c if c == char::from(quote) => {
                    self.cursor.advance();
                    return Ok(value);
                }
                '<' => return Err(self.error_here("'<' not allowed in attribute value")),
                '&' => value.push(self.parse_reference()?),
                '\r' => {
                    self.cursor.advance();
                    if self.cursor.current() != Some(b'\n') {
                        value.push(' ');
                    }
                }
                '\n' | '\t' => {
                    self.cursor.advance();
                    value.push(' ');
                }
                c if is_xml_char(c) => {
                    self.cursor.advance();
                    value.push(c);
                }
                _ => return Err(self.error_here("invalid character in attribute value")),
            }
        }
    }

    /// Character data up to the next `<`, with references decoded and line ends normalized
    fn parse_char_data(&mut self, text: &mut String) -> Result<()> {
        while let Some(ch) = self.cursor.current_char() {
            match ch {
                '<' => break,
                '&' => text.push(self.parse_reference()?),
                '\r' => {
                    self.cursor.advance();
                    if self.cursor.current() != Some(b'\n') {
                        text.push('\n');
                    }
                }
                c if is_xml_char(c) => {
                    self.cursor.advance();
                    text.push(c);
                }
                _ => return Err(self.error_here("invalid character in text")),
            }
        }
        Ok(())
    }

    fn parse_cdata(&mut self, text: &mut String) -> Result<()> {
        self.cursor.advance_by("<![CDATA[".len());
        let start = self.cursor.pos();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(b"]]>") {
                let raw = self.cursor.slice_from(start);
                if let Some(bad) = raw.chars().find(|c| !is_xml_char(*c)) {
                    return Err(self.error_here(&format!(
                        "invalid character U+{:04X} in CDATA section",
                        u32::from(bad)
                    )));
                }
                text.push_str(&raw.replace("\r\n", "\n").replace('\r', "\n"));
                self.cursor.advance_by(3);
                return Ok(());
            }
            self.cursor.advance();
        }
        Err(self.error_here("unterminated CDATA section"))
    }

    /// Decode `&name;`, `&#dec;` or `&#xhex;` at the cursor
    fn parse_reference(&mut self) -> Result<char> {
        let start = self.cursor.span_here();
        self.cursor.advance();
        let body_start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == b';' {
                break;
            }
            if !(b.is_ascii_alphanumeric() || b == b'#') {
                return Err(Error::with_message(
                    ErrorKind::MalformedXml,
                    start,
                    "unterminated entity reference",
                ));
            }
            self.cursor.advance();
        }
        let entity = self.cursor.slice_from(body_start);
        if !self.cursor.consume(b';') {
            return Err(Error::with_message(
                ErrorKind::MalformedXml,
                start,
                "unterminated entity reference",
            ));
        }

        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_numeric_reference(entity),
        };

        decoded.ok_or_else(|| {
            Error::with_message(
                ErrorKind::MalformedXml,
                start,
                format!("invalid entity reference '&{entity};'"),
            )
        })
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.cursor.pos();

        match self.cursor.current_char() {
            Some(first) if is_name_start_char(first) => self.cursor.advance(),
            _ => return Err(self.error_here("expected name")),
        }
        while let Some(ch) = self.cursor.current_char() {
            if is_name_char(ch) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        Ok(self.cursor.slice_from(start).to_string())
    }

    /// Skip whitespace, comments and processing instructions outside the root.
    /// A DOCTYPE is only accepted before the root element.
    fn skip_misc(&mut self, prolog: bool) -> Result<()> {
        loop {
            self.skip_whitespace();
            if self.cursor.starts_with(b"<?") {
                self.skip_processing_instruction()?;
            } else if self.cursor.starts_with(b"<!--") {
                self.skip_comment()?;
            } else if prolog && self.cursor.starts_with(b"<!DOCTYPE") {
                self.skip_doctype()?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_comment(&mut self) -> Result<()> {
        self.cursor.advance_by(4);
        self.skip_until(b"-->", "unterminated comment")
    }

    fn skip_processing_instruction(&mut self) -> Result<()> {
        self.cursor.advance_by(2);
        self.skip_until(b"?>", "unterminated processing instruction")
    }

    fn skip_doctype(&mut self) -> Result<()> {
        // internal subset may contain '>' inside [...]
        let mut depth = 0usize;
        while let Some(b) = self.cursor.current() {
            self.cursor.advance();
            match b {
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(self.error_here("unterminated DOCTYPE"))
    }

    fn skip_until(&mut self, pattern: &[u8], message: &str) -> Result<()> {
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(pattern) {
                self.cursor.advance_by(pattern.len());
                return Ok(());
            }
            self.cursor.advance();
        }
        Err(self.error_here(message))
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else {
            Err(self.error_here(&format!("expected '{}'", char::from(expected))))
        }
    }

    /// Returns true if anything was skipped
    fn skip_whitespace(&mut self) -> bool {
        let start = self.cursor.pos();
        self.cursor.skip_whitespace();
        self.cursor.pos() > start
    }

    fn error_here(&self, message: &str) -> Error {
        Error::with_message(ErrorKind::MalformedXml, self.cursor.span_here(), message)
    }
}

/// Move a pending text run into the innermost open element; whitespace-only runs are dropped
fn flush_text(open: &mut [Element], text: &mut String) {
    if !text.chars().all(is_xml_whitespace) {
        if let Some(parent) = open.last_mut() {
            parent.push_text(text);
        }
    }
    text.clear();
}

fn is_xml_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

/// Characters allowed literally in a document
fn is_xml_char(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\r') || (ch >= ' ' && !matches!(ch, '\u{FFFE}' | '\u{FFFF}'))
}

/// Numeric references may name any character except NUL
fn decode_numeric_reference(entity: &str) -> Option<char> {
    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()?
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()?
    } else {
        return None;
    };
    char::from_u32(code).filter(|c| *c != '\0')
}
