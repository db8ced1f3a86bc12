//! XML document model, parser and writer

pub mod model;
pub mod parser;
pub mod writer;

pub use model::{Document, Element, Node};
pub use parser::{Config, Parser};
pub use writer::{XML_DECLARATION, to_string, write_document};

/// First character of an XML name
pub fn is_name_start_char(ch: char) -> bool {
    ch.is_alphabetic() || matches!(ch, '_' | ':')
}

/// Any later character of an XML name
pub fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '-' | '.' | '_' | ':' | '\u{B7}')
}

/// Whether `name` can be used as an element or attribute name.
///
/// Names starting with a digit, containing whitespace, or empty are rejected.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}
