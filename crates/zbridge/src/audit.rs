//! Audit trail records and sinks.
//!
//! Every transform reports a "started" record, then either "completed" or a
//! single "error" record. Sinks are fire-and-forget: a failing sink is logged
//! by the caller and never changes the outcome of a transform.

use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::Sender;

use parking_lot::Mutex;
use thiserror::Error;

use crate::correlation::CorrelationId;

/// Outcome category of an audit record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuditStatus {
    Success,
    Error,
}

impl AuditStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit trail entry
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AuditRecord {
    /// `None` when the failure happened before the id could be derived
    pub correlation_id: Option<CorrelationId>,
    pub message_id: String,
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_status"))]
    pub status: AuditStatus,
    pub message: String,
}

#[cfg(feature = "serde")]
fn serialize_status<S: serde::Serializer>(
    status: &AuditStatus,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(status.as_str())
}

impl AuditRecord {
    pub fn success(
        correlation_id: Option<CorrelationId>,
        message_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            correlation_id,
            message_id: message_id.into(),
            status: AuditStatus::Success,
            message: message.into(),
        }
    }

    pub fn error(
        correlation_id: Option<CorrelationId>,
        message_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            correlation_id,
            message_id: message_id.into(),
            status: AuditStatus::Error,
            message: message.into(),
        }
    }
}

/// Reasons a sink could not take a record
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum AuditError {
    #[error("audit channel is disconnected")]
    Disconnected,
    #[error("audit record rejected: {0}")]
    Rejected(String),
}

/// Destination for audit records
pub trait AuditSink: Send + Sync {
    fn record_event(&self, record: AuditRecord) -> Result<(), AuditError>;
}

impl<T: AuditSink + ?Sized> AuditSink for &T {
    fn record_event(&self, record: AuditRecord) -> Result<(), AuditError> {
        (**self).record_event(record)
    }
}

impl<T: AuditSink + ?Sized> AuditSink for Box<T> {
    fn record_event(&self, record: AuditRecord) -> Result<(), AuditError> {
        (**self).record_event(record)
    }
}

impl<T: AuditSink + ?Sized> AuditSink for Arc<T> {
    fn record_event(&self, record: AuditRecord) -> Result<(), AuditError> {
        (**self).record_event(record)
    }
}

/// Emits records as `tracing` events on the `zbridge::audit` target
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAudit;

impl AuditSink for TracingAudit {
    fn record_event(&self, record: AuditRecord) -> Result<(), AuditError> {
        let correlation_id = record
            .correlation_id
            .as_ref()
            .map_or("-", CorrelationId::as_str);
        match record.status {
            AuditStatus::Success => tracing::info!(
                target: "zbridge::audit",
                correlation_id,
                message_id = %record.message_id,
                status = %record.status,
                "{}",
                record.message
            ),
            AuditStatus::Error => tracing::error!(
                target: "zbridge::audit",
                correlation_id,
                message_id = %record.message_id,
                status = %record.status,
                "{}",
                record.message
            ),
        }
        Ok(())
    }
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct MemoryAudit {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAudit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    /// Remove and return everything recorded so far
    pub fn take(&self) -> Vec<AuditRecord> {
        std::mem::take(&mut *self.records.lock())
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl AuditSink for MemoryAudit {
    fn record_event(&self, record: AuditRecord) -> Result<(), AuditError> {
        self.records.lock().push(record);
        Ok(())
    }
}

/// Forwards records over a channel to a collector thread
#[derive(Debug)]
pub struct ChannelAudit {
    sender: Mutex<Sender<AuditRecord>>,
}

impl ChannelAudit {
    pub fn new(sender: Sender<AuditRecord>) -> Self {
        Self {
            sender: Mutex::new(sender),
        }
    }
}

impl AuditSink for ChannelAudit {
    fn record_event(&self, record: AuditRecord) -> Result<(), AuditError> {
        self.sender
            .lock()
            .send(record)
            .map_err(|_| AuditError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn record(message: &str) -> AuditRecord {
        AuditRecord::success(None, "0123456789abcdef0123456789abcdef", message)
    }

    #[test]
    fn test_status_display() {
        assert_eq!(AuditStatus::Success.to_string(), "SUCCESS");
        assert_eq!(AuditStatus::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_memory_audit_collects_in_order() -> Result<(), AuditError> {
        let audit = MemoryAudit::new();
        audit.record_event(record("one"))?;
        audit.record_event(record("two"))?;

        let messages: Vec<_> = audit.records().into_iter().map(|r| r.message).collect();
        assert_eq!(messages, vec!["one", "two"]);
        assert_eq!(audit.take().len(), 2);
        assert!(audit.is_empty());
        Ok(())
    }

    fn emit(sink: impl AuditSink, record: AuditRecord) -> Result<(), AuditError> {
        sink.record_event(record)
    }

    #[test]
    fn test_blanket_impls() -> Result<(), AuditError> {
        let audit = Arc::new(MemoryAudit::new());
        let boxed: Box<dyn AuditSink> = Box::new(Arc::clone(&audit));
        boxed.record_event(record("boxed"))?;
        emit(&*audit, record("borrowed"))?;
        assert_eq!(audit.len(), 2);
        Ok(())
    }

    #[test]
    fn test_channel_audit() -> Result<(), AuditError> {
        let (tx, rx) = mpsc::channel();
        let audit = ChannelAudit::new(tx);
        audit.record_event(record("sent"))?;
        assert_eq!(rx.recv().map(|r| r.message), Ok("sent".to_string()));

        drop(rx);
        assert_eq!(
            audit.record_event(record("lost")),
            Err(AuditError::Disconnected)
        );
        Ok(())
    }

    #[test]
    fn test_tracing_audit_never_fails() {
        let audit = TracingAudit;
        assert!(audit.record_event(record("logged")).is_ok());
        assert!(
            audit
                .record_event(AuditRecord::error(None, "x", "Error in transformation"))
                .is_ok()
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_record_serializes_status_text() -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(AuditRecord::error(None, "id", "Error in transformation"))?;
        assert_eq!(json["status"], serde_json::json!("ERROR"));
        assert_eq!(json["correlation_id"], serde_json::Value::Null);
        Ok(())
    }
}
