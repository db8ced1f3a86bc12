//! Payload intake: whole-message reads and UTF-8 decoding

use std::io::Read;

use crate::error::{Error, ErrorKind, Result};

/// UTF-8 byte order mark
const BOM: &str = "\u{FEFF}";

/// Read a complete payload from `reader` as text.
///
/// Stream failures and invalid UTF-8 are both [`ErrorKind::IoRead`].
pub fn read_payload(mut reader: impl Read) -> Result<String> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|err| Error::io_read(&err))?;
    decode_payload(bytes)
}

/// Decode payload bytes as UTF-8, dropping a leading byte order mark
pub fn decode_payload(bytes: Vec<u8>) -> Result<String> {
    let text = String::from_utf8(bytes).map_err(|err| {
        Error::with_message(
            ErrorKind::IoRead,
            crate::error::Span::empty(),
            format!(
                "payload is not valid utf-8 (byte offset {})",
                err.utf8_error().valid_up_to()
            ),
        )
    })?;
    Ok(match text.strip_prefix(BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

/// Borrowing variant of [`decode_payload`]
pub fn decode_str(bytes: &[u8]) -> Result<&str> {
    let text = std::str::from_utf8(bytes).map_err(|err| {
        Error::with_message(
            ErrorKind::IoRead,
            crate::error::Span::empty(),
            format!(
                "payload is not valid utf-8 (byte offset {})",
                err.valid_up_to()
            ),
        )
    })?;
    Ok(text.strip_prefix(BOM).unwrap_or(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
    }

    #[test]
    fn test_read_payload() -> Result<()> {
        assert_eq!(read_payload("<a/>".as_bytes())?, "<a/>");
        Ok(())
    }

    #[test]
    fn test_bom_dropped() -> Result<()> {
        assert_eq!(read_payload("\u{FEFF}{}".as_bytes())?, "{}");
        assert_eq!(decode_str("\u{FEFF}<a/>".as_bytes())?, "<a/>");
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_is_read_error() {
        let err = read_payload(&[b'<', 0xFF, b'>'][..]).map_err(|e| e.kind().clone());
        assert_eq!(err, Err(ErrorKind::IoRead));
        let err = decode_str(&[0xC3]).map_err(|e| e.kind().clone());
        assert_eq!(err, Err(ErrorKind::IoRead));
    }

    #[test]
    fn test_stream_failure_is_read_error() {
        match read_payload(FailingReader) {
            Err(err) => {
                assert_eq!(err.kind(), &ErrorKind::IoRead);
                assert!(err.to_string().contains("pipe closed"));
            }
            Ok(text) => panic!("expected read error, got {text:?}"),
        }
    }
}
