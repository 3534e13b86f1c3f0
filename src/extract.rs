use crate::exception::encode_exception;
use crate::fields::{FieldSet, FieldValue};
use crate::json::StringEscaping;
use crate::record::LogEvent;
use chrono::{DateTime, Utc};

/// Value of the `@version` field.
pub const FORMAT_VERSION: i64 = 1;

/// Placeholder for an unknown class or method.
pub const UNKNOWN_LOCATION: &str = "?";

const NUM_FIELDS: usize = 11;

/// `0000-01-01T00:00:00.000Z`, the earliest instant with a four-digit year.
pub const MIN_TIMESTAMP_MILLIS: i64 = -62_167_219_200_000;

/// `9999-12-31T23:59:59.999Z`, the latest instant with a four-digit year.
pub const MAX_TIMESTAMP_MILLIS: i64 = 253_402_300_799_999;

/// Collect the fields of one event in output order:
/// `@timestamp, @version, host, level, message, logger, [file], class,
/// method, [line], [exception]`.
pub fn extract_fields(event: &LogEvent, host: &str, escaping: StringEscaping) -> FieldSet {
    let mut fields = FieldSet::with_capacity(NUM_FIELDS);

    fields.insert("@timestamp", FieldValue::Str(format_timestamp(event.timestamp_millis)));
    fields.insert("@version", FieldValue::Int(FORMAT_VERSION));

    fields.insert("host", host.into());
    fields.insert("level", event.level.as_str().into());
    fields.insert(
        "message",
        FieldValue::Str(event.message.clone().unwrap_or_else(|| "null".to_string())),
    );
    fields.insert("logger", event.logger.as_str().into());

    add_location(&mut fields, event);

    if let Some(throwable) = &event.throwable {
        fields.insert("exception", FieldValue::Object(encode_exception(throwable, escaping)));
    }

    fields
}

fn add_location(fields: &mut FieldSet, event: &LogEvent) {
    let Some(location) = &event.location else {
        fields.insert("class", UNKNOWN_LOCATION.into());
        fields.insert("method", UNKNOWN_LOCATION.into());
        return;
    };

    if let Some(file) = &location.file {
        fields.insert("file", file.as_str().into());
    }
    fields.insert("class", location.class.as_str().into());
    fields.insert("method", location.method.as_str().into());
    if let Some(line) = location.line {
        fields.insert("line", FieldValue::Int(i64::from(line)));
    }
}

/// ISO-8601 in UTC with millisecond precision, e.g. `2014-05-01T12:00:00.000Z`.
///
/// Timestamps are clamped to years 0000..=9999 so the output always keeps
/// the `yyyy-MM-dd` shape.
pub fn format_timestamp(timestamp_millis: i64) -> String {
    let clamped = timestamp_millis.clamp(MIN_TIMESTAMP_MILLIS, MAX_TIMESTAMP_MILLIS);
    DateTime::<Utc>::from_timestamp_millis(clamped)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}
