//! Conversion between XML documents and JSON values.
//!
//! The mapping follows a small set of reserved keys:
//!
//! - an attribute `name="v"` becomes the key `"@name"` with a string value
//! - text next to attributes or child elements becomes the key `"#text"`
//! - repeated sibling elements become an array under their shared tag name
//!
//! Leaf text is typed by [`coerce_text`]. The reverse direction wraps the
//! object in a root element ([`DEFAULT_ROOT_TAG`] unless configured).

mod coerce;
mod to_json;
mod to_xml;

use std::path::Path;

use crate::error::{Error, ErrorKind, Result};
use crate::json::{self, Config as JsonConfig, Parser as JsonParser};
use crate::value::Value;
use crate::xml::{self, Config as XmlConfig, Parser as XmlParser};

pub use coerce::coerce_text;

/// Root element name used when none is configured
pub const DEFAULT_ROOT_TAG: &str = "message";

/// Reserved key holding element text
pub const TEXT_KEY: &str = "#text";

/// Prefix marking a key as an attribute
pub const ATTRIBUTE_PREFIX: char = '@';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    /// Lowercase name, as used on the command line
    pub const fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }

    /// Format for a file extension, ignoring ASCII case
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else if ext.eq_ignore_ascii_case("xml") {
            Some(Self::Xml)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name().to_ascii_uppercase())
    }
}

/// Conversion options for both directions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertOptions {
    pub json: JsonConfig,
    pub xml: XmlConfig,
    /// Wrapper element for JSON -> XML, expected root when unwrapping
    pub root_tag: String,
    /// Return the root element's content instead of `{root: content}`
    pub unwrap_root: bool,
    /// Indent width for JSON output
    pub indent: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            json: JsonConfig::default(),
            xml: XmlConfig::default(),
            root_tag: DEFAULT_ROOT_TAG.to_string(),
            unwrap_root: false,
            indent: json::DEFAULT_INDENT,
        }
    }
}

impl ConvertOptions {
    #[must_use]
    pub fn with_root_tag(mut self, root_tag: impl Into<String>) -> Self {
        self.root_tag = root_tag.into();
        self
    }

    #[must_use]
    pub const fn with_unwrap_root(mut self, unwrap_root: bool) -> Self {
        self.unwrap_root = unwrap_root;
        self
    }

    #[must_use]
    pub const fn with_json(mut self, json: JsonConfig) -> Self {
        self.json = json;
        self
    }

    #[must_use]
    pub const fn with_xml(mut self, xml: XmlConfig) -> Self {
        self.xml = xml;
        self
    }
}

/// Map an XML document to a JSON value, keyed by the root tag
pub fn xml_to_json(xml: &str) -> Result<Value> {
    xml_to_json_with_options(xml, &ConvertOptions::default())
}

/// Map an XML document to a JSON value with options
pub fn xml_to_json_with_options(xml: &str, options: &ConvertOptions) -> Result<Value> {
    let doc = XmlParser::with_config(xml, options.xml).parse()?;
    tracing::debug!(root = %doc.root.name, "parsed xml document");
    to_json::document_to_value(&doc, options)
}

/// Serialize a JSON object as an XML document wrapped in `root_tag`
pub fn json_to_xml(value: &Value, root_tag: &str) -> Result<String> {
    let doc = to_xml::value_to_document(value, root_tag)?;
    Ok(xml::to_string(&doc))
}

/// Parse JSON text as a conversion input; blank text is [`ErrorKind::EmptyInput`]
pub fn parse_json(input: &str, options: &ConvertOptions) -> Result<Value> {
    if input.trim_matches([' ', '\t', '\r', '\n']).is_empty() {
        return Err(Error::bare(ErrorKind::EmptyInput));
    }
    JsonParser::with_config(input, options.json).parse_document()
}

/// Convert between supported formats
pub fn convert(input: &str, from: Format, to: Format) -> Result<String> {
    convert_with_options(input, from, to, &ConvertOptions::default())
}

/// Convert between supported formats with options
pub fn convert_with_options(
    input: &str,
    from: Format,
    to: Format,
    options: &ConvertOptions,
) -> Result<String> {
    match (from, to) {
        (Format::Xml, Format::Json) => {
            let value = xml_to_json_with_options(input, options)?;
            Ok(json::to_string_with_indent(&value, options.indent))
        }
        (Format::Json, Format::Xml) => {
            let value = parse_json(input, options)?;
            json_to_xml(&value, &options.root_tag)
        }
        _ => Ok(input.to_string()),
    }
}

/// Infer the format from a `.json` / `.xml` file extension
pub fn detect_format_from_path(path: impl AsRef<Path>) -> Option<Format> {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(Format::from_extension)
}
