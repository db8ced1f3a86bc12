//! Message transform adapter.
//!
//! A [`Transformer`] handles one direction for any number of messages. Per
//! message state travels in a [`MessageContext`], so one transformer can be
//! shared across threads.

use std::fmt;
use std::io::{Read, Write};

use tracing::{debug, instrument, warn};

use crate::audit::{AuditRecord, AuditSink};
use crate::config::Config;
use crate::convert::{Format, convert_with_options};
use crate::correlation::CorrelationId;
use crate::error::{Error, Result};
use crate::input::read_payload;

/// Audit text for any failed transform
pub const ERROR_MESSAGE: &str = "Error in transformation";

/// Conversion direction of a transformer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    XmlToJson,
    JsonToXml,
}

impl Direction {
    pub const fn source(self) -> Format {
        match self {
            Self::XmlToJson => Format::Xml,
            Self::JsonToXml => Format::Json,
        }
    }

    pub const fn target(self) -> Format {
        match self {
            Self::XmlToJson => Format::Json,
            Self::JsonToXml => Format::Xml,
        }
    }

    /// Direction converting `from` into `to`, if it is supported
    pub fn between(from: Format, to: Format) -> Option<Self> {
        match (from, to) {
            (Format::Xml, Format::Json) => Some(Self::XmlToJson),
            (Format::Json, Format::Xml) => Some(Self::JsonToXml),
            _ => None,
        }
    }

    /// Audit text announcing the start of a transform
    pub fn started_message(self, message_id: &str) -> String {
        format!("transformation from {self} was started\nMessage ID - {message_id}")
    }

    /// Audit text announcing a finished transform
    pub fn completed_message(self) -> String {
        format!("transformation from {self} has been completed")
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.source(), self.target())
    }
}

/// Request-scoped inputs for one message
#[derive(Clone, Copy, Debug)]
pub struct MessageContext<'a> {
    /// Host-supplied 32-character hexadecimal id
    pub message_id: &'a str,
    pub config: &'a Config,
}

impl<'a> MessageContext<'a> {
    pub const fn new(message_id: &'a str, config: &'a Config) -> Self {
        Self { message_id, config }
    }
}

/// Result of a successful transform
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformReport {
    pub correlation_id: CorrelationId,
    pub bytes_written: usize,
}

/// Converts whole payloads in one direction and reports to an audit sink
#[derive(Debug)]
pub struct Transformer<A> {
    direction: Direction,
    audit: A,
}

impl<A: AuditSink> Transformer<A> {
    pub const fn new(direction: Direction, audit: A) -> Self {
        Self { direction, audit }
    }

    pub const fn direction(&self) -> Direction {
        self.direction
    }

    pub const fn audit(&self) -> &A {
        &self.audit
    }

    /// Read the payload, convert it and write the result.
    ///
    /// Emits a "started" record once the correlation id is known, then a
    /// "completed" record. Any failure emits exactly one error record and
    /// returns the original error; nothing is written to `output` unless the
    /// conversion succeeded.
    #[instrument(skip_all, fields(direction = %self.direction, message_id = ctx.message_id))]
    pub fn transform(
        &self,
        ctx: &MessageContext<'_>,
        input: impl Read,
        mut output: impl Write,
    ) -> Result<TransformReport> {
        let mut correlation_id = None;
        let result = self.run(ctx, input, &mut output, &mut correlation_id);

        if let Err(err) = &result {
            warn!(error = %err, "transform failed");
            self.emit(
                ctx,
                AuditRecord::error(correlation_id, ctx.message_id, ERROR_MESSAGE),
            );
        }
        result
    }

    fn run(
        &self,
        ctx: &MessageContext<'_>,
        input: impl Read,
        output: &mut impl Write,
        correlation_slot: &mut Option<CorrelationId>,
    ) -> Result<TransformReport> {
        ctx.config.validate()?;
        let payload = read_payload(input)?;
        debug!(bytes = payload.len(), "payload read");

        let correlation_id = CorrelationId::from_message_id(ctx.message_id)?;
        *correlation_slot = Some(correlation_id.clone());

        self.emit(
            ctx,
            AuditRecord::success(
                Some(correlation_id.clone()),
                ctx.message_id,
                self.direction.started_message(ctx.message_id),
            ),
        );

        let options = ctx.config.convert_options();
        let converted = convert_with_options(
            &payload,
            self.direction.source(),
            self.direction.target(),
            &options,
        )?;

        output
            .write_all(converted.as_bytes())
            .and_then(|()| output.flush())
            .map_err(|err| Error::io_write(&err))?;
        debug!(bytes = converted.len(), %correlation_id, "payload written");

        self.emit(
            ctx,
            AuditRecord::success(
                Some(correlation_id.clone()),
                ctx.message_id,
                self.direction.completed_message(),
            ),
        );

        Ok(TransformReport {
            correlation_id,
            bytes_written: converted.len(),
        })
    }

    /// Best-effort delivery; a sink failure is logged and otherwise ignored
    fn emit(&self, ctx: &MessageContext<'_>, record: AuditRecord) {
        if !ctx.config.audit_enabled {
            return;
        }
        if let Err(err) = self.audit.record_event(record) {
            warn!(error = %err, "audit record dropped");
        }
    }
}
