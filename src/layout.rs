use crate::buffer::OutputBuffer;
use crate::extract::{extract_fields, format_timestamp, FORMAT_VERSION};
use crate::host::HostContext;
use crate::json::{write_object, StringEscaping};
use crate::record::LogEvent;
use std::io::{self, Write};
use std::sync::Arc;

/// Formats [`LogEvent`]s as single-line Logstash JSON documents.
///
/// The layout reuses one output buffer across calls; `format` takes
/// `&mut self`, so a shared layout needs external synchronization (see
/// [`format_event`] for the allocation-per-call alternative).
#[derive(Debug)]
pub struct LogstashLayout {
    host: Arc<HostContext>,
    escaping: StringEscaping,
    buffer: OutputBuffer,
}

impl Default for LogstashLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl LogstashLayout {
    /// Layout using the process-wide host context and full JSON escaping.
    pub fn new() -> Self {
        Self::with_host(HostContext::shared())
    }

    pub fn with_host(host: Arc<HostContext>) -> Self {
        LogstashLayout {
            host,
            escaping: StringEscaping::default(),
            buffer: OutputBuffer::new(),
        }
    }

    pub fn escaping(mut self, escaping: StringEscaping) -> Self {
        self.escaping = escaping;
        self
    }

    pub fn host(&self) -> &HostContext {
        &self.host
    }

    /// Format one event. Always returns a document ending in `\n`.
    pub fn format(&mut self, event: &LogEvent) -> String {
        let host = self.host.name();
        let out = self.buffer.prepare();
        if write_line(out, event, host, self.escaping).is_err() {
            out.clear();
            write_fallback(out, event);
        }
        String::from_utf8_lossy(self.buffer.as_bytes()).into_owned()
    }
}

/// Format one event into a freshly allocated line, without any shared state.
pub fn format_event(event: &LogEvent, host: &HostContext, escaping: StringEscaping) -> String {
    let mut out = Vec::with_capacity(crate::buffer::INITIAL_CAPACITY);
    if write_line(&mut out, event, host.name(), escaping).is_err() {
        out.clear();
        write_fallback(&mut out, event);
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn write_line(out: &mut Vec<u8>, event: &LogEvent, host: &str, escaping: StringEscaping) -> io::Result<()> {
    let fields = extract_fields(event, host, escaping);
    write_object(out, &fields, escaping)?;
    out.write_all(b"\n")
}

// Only reachable if serialization itself fails; keeps the line parseable.
fn write_fallback(out: &mut Vec<u8>, event: &LogEvent) {
    let doc = serde_json::json!({
        "@timestamp": format_timestamp(event.timestamp_millis),
        "@version": FORMAT_VERSION,
        "message": event.message.as_deref().unwrap_or("null"),
    });
    out.extend_from_slice(doc.to_string().as_bytes());
    out.push(b'\n');
}
