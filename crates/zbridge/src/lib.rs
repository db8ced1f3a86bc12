//! zbridge - XML <-> JSON message transformer
//!
//! The converter engine maps XML elements, attributes and text to JSON keys
//! and values and back. The transform adapter wraps it for message pipelines:
//! correlation ids derived from host message ids, and an audit trail for
//! every message.
//!
//! # Quick Start
//!
//! ```
//! use zbridge::{json_to_xml, xml_to_json};
//! # fn main() -> Result<(), zbridge::Error> {
//! let value = xml_to_json(r#"<a x="1"><b>2</b></a>"#)?;
//! assert_eq!(value.to_string(), r#"{"a":{"@x":"1","b":2}}"#);
//!
//! let inner = value
//!     .as_object()
//!     .and_then(|obj| obj.get("a"))
//!     .cloned()
//!     .unwrap_or_default();
//! let mut wrapper = zbridge::Object::new();
//! wrapper.insert("a", inner);
//! let xml = json_to_xml(&zbridge::Value::Object(wrapper), "message")?;
//! assert!(xml.ends_with(r#"<message><a x="1"><b>2</b></a></message>"#));
//! # Ok(())
//! # }
//! ```
//!
//! # Transforming a message
//!
//! ```
//! use zbridge::{Config, Direction, MemoryAudit, MessageContext, Transformer};
//! # fn main() -> Result<(), zbridge::Error> {
//! let config = Config::default();
//! let transformer = Transformer::new(Direction::JsonToXml, MemoryAudit::new());
//! let ctx = MessageContext::new("0123456789abcdef0123456789abcdef", &config);
//!
//! let mut out = Vec::new();
//! let report = transformer.transform(&ctx, r#"{"id": 7}"#.as_bytes(), &mut out)?;
//! assert_eq!(report.correlation_id.as_str(), "01234567-89ab-cdef-0123-456789abcdef");
//! assert_eq!(transformer.audit().len(), 2);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod input;
pub use input::read_payload;

pub mod lexer;
pub use lexer::{Token, TokenKind};

pub mod value;
pub use value::{Array, Object, Value};

pub mod convert;
pub use convert::{
    ATTRIBUTE_PREFIX, ConvertOptions, DEFAULT_ROOT_TAG, Format, TEXT_KEY, convert,
    convert_with_options, detect_format_from_path, json_to_xml, xml_to_json,
    xml_to_json_with_options,
};

pub mod json;
pub mod xml;
pub use xml::{Document as XmlDocument, Element as XmlElement, Node as XmlNode};

pub mod adapter;
pub mod audit;
pub mod config;
pub mod correlation;
pub use adapter::{Direction, MessageContext, TransformReport, Transformer};
pub use audit::{
    AuditError, AuditRecord, AuditSink, AuditStatus, ChannelAudit, MemoryAudit, TracingAudit,
};
pub use config::Config;
pub use correlation::{CorrelationId, MESSAGE_ID_LEN};

/// Parse JSON from string
pub fn from_str(s: &str) -> Result<Value> {
    json::Parser::new(s).parse_document()
}

/// Parse JSON from bytes
pub fn from_bytes(bytes: &[u8]) -> Result<Value> {
    from_str(input::decode_str(bytes)?)
}

/// Parse with custom configuration
pub fn from_str_with_config(s: &str, config: JsonConfig) -> Result<Value> {
    json::Parser::with_config(s, config).parse_document()
}

/// Parse XML from string
pub fn from_xml_str(s: &str) -> Result<XmlDocument> {
    xml::Parser::new(s).parse()
}

/// Parse XML from bytes
pub fn from_xml_bytes(bytes: &[u8]) -> Result<XmlDocument> {
    from_xml_str(input::decode_str(bytes)?)
}

/// Convenience re-exports
pub use json::{Config as JsonConfig, Parser as JsonParser};
pub use lexer::json::JsonLexer;
pub use xml::{Config as XmlConfig, Parser as XmlParser};
