//! JSON streaming parser and serializers

pub mod event;
pub mod parser;
pub mod writer;

pub use event::Event;
pub use parser::{Config, Parser};
pub use writer::{DEFAULT_INDENT, to_string, to_string_pretty, to_string_with_indent};
