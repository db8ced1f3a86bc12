//! Correlation ids derived from host message ids

use std::fmt;

use crate::error::{Error, ErrorKind, Result};

/// Length of a host message id in hexadecimal characters
pub const MESSAGE_ID_LEN: usize = 32;

/// Dash-separated group widths, the canonical UUID layout
const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

/// Message id regrouped as `8-4-4-4-12`, letter case preserved
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Derive from a 32-character hexadecimal message id
    pub fn from_message_id(message_id: &str) -> Result<Self> {
        if message_id.len() != MESSAGE_ID_LEN
            || !message_id.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(Error::bare(ErrorKind::MalformedMessageId {
                id: message_id.to_string(),
            }));
        }

        let mut grouped = String::with_capacity(MESSAGE_ID_LEN + GROUPS.len() - 1);
        let mut rest = message_id;
        for (i, width) in GROUPS.iter().enumerate() {
            let (group, tail) = rest.split_at(*width);
            if i > 0 {
                grouped.push('-');
            }
            grouped.push_str(group);
            rest = tail;
        }
        Ok(Self(grouped))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for CorrelationId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping() -> Result<()> {
        let id = CorrelationId::from_message_id("0123456789abcdefABCDEF0123456789")?;
        assert_eq!(id.as_str(), "01234567-89ab-cdef-ABCD-EF0123456789");
        assert_eq!(id.to_string().len(), 36);
        Ok(())
    }

    #[test]
    fn test_rejects_wrong_length() {
        for id in ["", "0123456789abcdef0123456789abcde", "0123456789abcdef0123456789abcdef0"] {
            let err = CorrelationId::from_message_id(id).map_err(|e| e.kind().clone());
            assert_eq!(
                err,
                Err(ErrorKind::MalformedMessageId { id: id.to_string() })
            );
        }
    }

    #[test]
    fn test_rejects_non_hex() {
        assert!(CorrelationId::from_message_id("0123456789abcdef0123456789abcdeg").is_err());
        assert!(CorrelationId::from_message_id("01234567-89ab-cdef-0123-456789abcd").is_err());
        // 32 bytes but not 32 hex characters
        assert!(CorrelationId::from_message_id("ééééééééééééééé12").is_err());
    }

    #[test]
    fn test_error_mentions_length() {
        let err = CorrelationId::from_message_id("abc").err().map(|e| e.to_string());
        assert_eq!(
            err.as_deref(),
            Some(r#"message id must be 32 hexadecimal characters, got "abc" (3 chars)"#)
        );
    }
}
