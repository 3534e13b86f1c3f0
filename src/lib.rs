//! Logstash-compatible JSON layout for log events.
//!
//! [`LogstashLayout`] turns a [`LogEvent`] into one JSON document per line:
//!
//! ```text
//! {"@timestamp":"2014-05-01T12:00:00.000Z","@version":1,"host":"myhost","level":"ERROR",...}
//! ```
//!
//! With the `layer` feature (default) the crate also provides a
//! `tracing_subscriber` layer that formats `tracing` events this way and
//! ships the lines to a [`sink::LineSink`].

pub mod record;
pub mod fields;
pub mod exception;
pub mod json;
pub mod buffer;
pub mod host;
pub mod extract;
pub mod layout;
pub mod env;

#[cfg(feature = "layer")]
pub mod sink;
#[cfg(feature = "layer")]
pub mod layer;
#[cfg(feature = "layer")]
pub mod init;
#[cfg(feature = "layer")]
pub mod noop_sink;
#[cfg(feature = "layer")]
pub mod stdout_sink;

pub use host::HostContext;
pub use json::StringEscaping;
pub use layout::{format_event, LogstashLayout};
pub use record::{LogEvent, Location, ThrowableInfo};
