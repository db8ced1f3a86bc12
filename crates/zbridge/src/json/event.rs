//! Events emitted by the streaming JSON parser

use crate::value::Value;

/// One step of a JSON document walk
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// `{`
    ObjectStart,
    /// `}`
    ObjectEnd,
    /// `[`
    ArrayStart,
    /// `]`
    ArrayEnd,
    /// Object key (always followed by a value or container start)
    Key(String),
    /// Scalar value; containers arrive as start/end pairs instead
    Value(Value),
}

impl Event {
    /// Returns true for events that open a container
    pub const fn is_container_start(&self) -> bool {
        matches!(self, Self::ObjectStart | Self::ArrayStart)
    }
}
