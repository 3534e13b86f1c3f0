use serde::{Deserialize, Serialize};
use std::error::Error;

/// A single log event as handed to the layout by the logging framework.
///
/// The layout only reads from it; capture (timestamps, call-site lookup,
/// message rendering) happens upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Milliseconds since the Unix epoch.
    pub timestamp_millis: i64,
    pub level: String,
    /// Already rendered message text. `None` renders as `"null"`.
    pub message: Option<String>,
    pub logger: String,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub throwable: Option<ThrowableInfo>,
}

/// Call-site of the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub file: Option<String>,
    pub class: String,
    pub method: String,
    #[serde(default)]
    pub line: Option<u32>,
}

/// Pre-rendered error attached to an event.
///
/// `stack_trace[0]` is the header line; the remaining entries are frames,
/// normally starting with a tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrowableInfo {
    pub class_name: String,
    #[serde(default)]
    pub message: Option<String>,
    pub stack_trace: Vec<String>,
}

impl LogEvent {
    pub fn new(
        timestamp_millis: i64,
        level: impl Into<String>,
        logger: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        LogEvent {
            timestamp_millis,
            level: level.into(),
            message: Some(message.into()),
            logger: logger.into(),
            location: None,
            throwable: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_throwable(mut self, throwable: ThrowableInfo) -> Self {
        self.throwable = Some(throwable);
        self
    }
}

impl ThrowableInfo {
    /// Render a Rust error and its `source()` chain.
    ///
    /// Common std and `serde_json` error types report their full type path.
    /// For anything else the class is the leading identifier of the error's
    /// `Debug` output, which is the type or enum variant name for derived
    /// impls but only a generic name (`Error`) for boxed string errors. Each
    /// source becomes a `\tcaused by: ..` frame line.
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        let class_name = error_class(err);
        let message = err.to_string();

        let mut stack_trace = vec![header(&class_name, &message)];
        let mut source = err.source();
        while let Some(cause) = source {
            stack_trace.push(format!(
                "\tcaused by: {}",
                header(&error_class(cause), &cause.to_string())
            ));
            source = cause.source();
        }

        ThrowableInfo {
            class_name,
            message: if message.is_empty() { None } else { Some(message) },
            stack_trace,
        }
    }
}

fn header(class: &str, message: &str) -> String {
    if message.is_empty() {
        class.to_string()
    } else {
        format!("{}: {}", class, message)
    }
}

type TypeCheck = fn(&(dyn Error + 'static)) -> bool;

const KNOWN_ERROR_TYPES: &[(TypeCheck, &str)] = &[
    (|e| e.is::<std::io::Error>(), "std::io::Error"),
    (|e| e.is::<std::fmt::Error>(), "std::fmt::Error"),
    (|e| e.is::<std::num::ParseIntError>(), "std::num::ParseIntError"),
    (|e| e.is::<std::num::ParseFloatError>(), "std::num::ParseFloatError"),
    (|e| e.is::<std::num::TryFromIntError>(), "std::num::TryFromIntError"),
    (|e| e.is::<std::str::Utf8Error>(), "std::str::Utf8Error"),
    (|e| e.is::<std::string::FromUtf8Error>(), "std::string::FromUtf8Error"),
    (|e| e.is::<std::env::VarError>(), "std::env::VarError"),
    (|e| e.is::<std::net::AddrParseError>(), "std::net::AddrParseError"),
    (|e| e.is::<std::time::SystemTimeError>(), "std::time::SystemTimeError"),
    (|e| e.is::<serde_json::Error>(), "serde_json::Error"),
];

fn error_class(err: &(dyn Error + 'static)) -> String {
    if let Some((_, name)) = KNOWN_ERROR_TYPES.iter().find(|(is_type, _)| is_type(err)) {
        return name.to_string();
    }

    let debug = format!("{:?}", err);
    let end = debug
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == ':'))
        .unwrap_or(debug.len());
    match &debug[..end] {
        "" => "Error".to_string(),
        name => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(thiserror::Error, Debug)]
    enum StoreError {
        #[error("connection refused")]
        Connect,
        #[error("query failed")]
        Query(#[source] std::io::Error),
    }

    #[test]
    fn from_error_uses_variant_name_and_display() {
        let info = ThrowableInfo::from_error(&StoreError::Connect);
        assert_eq!(info.class_name, "Connect");
        assert_eq!(info.message.as_deref(), Some("connection refused"));
        assert_eq!(info.stack_trace, vec!["Connect: connection refused"]);
    }

    #[test]
    fn from_error_walks_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let info = ThrowableInfo::from_error(&StoreError::Query(io));
        assert_eq!(info.class_name, "Query");
        assert_eq!(
            info.stack_trace,
            vec!["Query: query failed", "\tcaused by: std::io::Error: disk gone"]
        );
    }

    #[test]
    fn std_errors_report_their_type_path() {
        let io = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert_eq!(ThrowableInfo::from_error(&io).class_name, "std::io::Error");

        let parse = "x1".parse::<u32>().unwrap_err();
        assert_eq!(ThrowableInfo::from_error(&parse).class_name, "std::num::ParseIntError");

        let json = serde_json::from_str::<u32>("{").unwrap_err();
        assert_eq!(ThrowableInfo::from_error(&json).class_name, "serde_json::Error");
    }

    #[test]
    fn boxed_string_errors_fall_back_to_generic_name() {
        let boxed: Box<dyn Error + Send + Sync> = "plain failure".into();
        let info = ThrowableInfo::from_error(&*boxed);
        assert_eq!(info.class_name, "Error");
        assert_eq!(info.stack_trace, vec!["Error: plain failure"]);
    }

    #[test]
    fn event_deserializes_without_optional_parts() {
        let event: LogEvent = serde_json::from_str(
            r#"{"timestamp_millis":0,"level":"INFO","message":"hi","logger":"app"}"#,
        )
        .unwrap();
        assert_eq!(event, LogEvent::new(0, "INFO", "app", "hi"));
    }
}
