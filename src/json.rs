use crate::fields::{FieldSet, FieldValue};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::str::FromStr;

/// How ordinary string values are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringEscaping {
    /// Full JSON string escaping (quotes, backslashes, control characters).
    #[default]
    Json,
    /// Write strings as-is. Output is only valid JSON as long as messages,
    /// logger and class names contain no quotes, backslashes or control
    /// characters.
    Verbatim,
}

impl FromStr for StringEscaping {
    type Err = crate::env::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StringEscaping::Json),
            "verbatim" => Ok(StringEscaping::Verbatim),
            _ => Err(crate::env::ConfigError::UnknownEscaping(s.to_string())),
        }
    }
}

/// Write `fields` as a compact JSON object.
pub fn write_object<W: Write>(out: &mut W, fields: &FieldSet, escaping: StringEscaping) -> io::Result<()> {
    out.write_all(b"{")?;
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.write_all(b",")?;
        }
        out.write_all(b"\"")?;
        out.write_all(key.as_bytes())?;
        out.write_all(b"\":")?;
        write_value(out, value, escaping)?;
    }
    out.write_all(b"}")
}

fn write_value<W: Write>(out: &mut W, value: &FieldValue, escaping: StringEscaping) -> io::Result<()> {
    match value {
        FieldValue::Str(s) => match escaping {
            StringEscaping::Json => serde_json::to_writer(&mut *out, s).map_err(io::Error::from),
            StringEscaping::Verbatim => write_quoted(out, s),
        },
        FieldValue::Escaped(s) => write_quoted(out, s),
        FieldValue::Int(n) => write!(out, "{}", n),
        FieldValue::Null => out.write_all(b"null"),
        FieldValue::Object(nested) => write_object(out, nested, escaping),
    }
}

fn write_quoted<W: Write>(out: &mut W, s: &str) -> io::Result<()> {
    out.write_all(b"\"")?;
    out.write_all(s.as_bytes())?;
    out.write_all(b"\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(fields: &FieldSet, escaping: StringEscaping) -> String {
        let mut buf = Vec::new();
        write_object(&mut buf, fields, escaping).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn sample() -> FieldSet {
        let mut inner = FieldSet::default();
        inner.insert("class", "E".into());
        inner.insert("message", FieldValue::Null);
        let mut fields = FieldSet::default();
        fields.insert("a", "x".into());
        fields.insert("n", FieldValue::Int(-7));
        fields.insert("o", inner.into());
        fields
    }

    #[test]
    fn compact_object_with_nesting() {
        assert_eq!(
            render(&sample(), StringEscaping::Json),
            r#"{"a":"x","n":-7,"o":{"class":"E","message":null}}"#
        );
    }

    #[test]
    fn empty_object() {
        assert_eq!(render(&FieldSet::default(), StringEscaping::Json), "{}");
    }

    #[test]
    fn json_mode_escapes_ordinary_strings() {
        let mut fields = FieldSet::default();
        fields.insert("message", "say \"hi\"\n\tto C:\\".into());
        let out = render(&fields, StringEscaping::Json);
        assert_eq!(out, r#"{"message":"say \"hi\"\n\tto C:\\"}"#);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["message"], "say \"hi\"\n\tto C:\\");
    }

    #[test]
    fn verbatim_mode_writes_strings_untouched() {
        let mut fields = FieldSet::default();
        fields.insert("message", "a\"b".into());
        assert_eq!(render(&fields, StringEscaping::Verbatim), "{\"message\":\"a\"b\"}");
    }

    #[test]
    fn pre_escaped_values_are_never_escaped_again() {
        let mut fields = FieldSet::default();
        fields.insert("stackTrace", FieldValue::Escaped("E\\n\\tat x".to_string()));
        for escaping in [StringEscaping::Json, StringEscaping::Verbatim] {
            assert_eq!(render(&fields, escaping), r#"{"stackTrace":"E\n\tat x"}"#);
        }
    }

    #[test]
    fn escaping_parses_from_config_text() {
        assert_eq!("JSON".parse::<StringEscaping>().unwrap(), StringEscaping::Json);
        assert_eq!(" verbatim ".parse::<StringEscaping>().unwrap(), StringEscaping::Verbatim);
        assert!("raw".parse::<StringEscaping>().is_err());
    }
}
