use crate::fields::{FieldSet, FieldValue};
use crate::json::StringEscaping;
use crate::record::ThrowableInfo;

const EXCEPTION_FIELDS: usize = 3;

/// Build the nested `exception` object for an event's throwable.
pub fn encode_exception(throwable: &ThrowableInfo, escaping: StringEscaping) -> FieldSet {
    let mut exception = FieldSet::with_capacity(EXCEPTION_FIELDS);
    exception.insert("class", FieldValue::Str(throwable.class_name.clone()));
    exception.insert("message", throwable.message.clone().into());
    exception.insert(
        "stackTrace",
        FieldValue::Escaped(join_stack_trace(&throwable.stack_trace, escaping)),
    );
    exception
}

/// Flatten stack trace lines into one string ready to sit inside a JSON
/// string literal.
///
/// The first tab of every frame line that starts with one becomes the
/// literal `\t`; lines are joined with the literal `\n`. With
/// [`StringEscaping::Json`] the rest of each line is JSON-escaped as well;
/// with [`StringEscaping::Verbatim`] it is copied as-is.
pub fn join_stack_trace(lines: &[String], escaping: StringEscaping) -> String {
    let capacity = lines.iter().map(String::len).sum::<usize>()
        + lines.len().saturating_sub(1) * 3;
    let mut out = String::with_capacity(capacity);

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push_str("\\n");
        }
        let text = match line.strip_prefix('\t') {
            Some(frame) if i > 0 => {
                out.push_str("\\t");
                frame
            }
            _ => line.as_str(),
        };
        match escaping {
            StringEscaping::Json => push_json_escaped(&mut out, text),
            StringEscaping::Verbatim => out.push_str(text),
        }
    }

    out
}

fn push_json_escaped(out: &mut String, text: &str) {
    // Serializing a str cannot fail; the slice drops the surrounding quotes.
    if let Ok(quoted) = serde_json::to_string(text) {
        out.push_str(&quoted[1..quoted.len() - 1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn frames_get_literal_tab_and_newline() {
        let trace = lines(&[
            "java.lang.RuntimeException: boom",
            "\tat A.b(A.java:1)",
            "\tat C.d(C.java:2)",
        ]);
        for escaping in [StringEscaping::Json, StringEscaping::Verbatim] {
            assert_eq!(
                join_stack_trace(&trace, escaping),
                "java.lang.RuntimeException: boom\\n\\tat A.b(A.java:1)\\n\\tat C.d(C.java:2)"
            );
        }
    }

    #[test]
    fn header_only_has_no_separator() {
        let trace = lines(&["java.lang.NullPointerException"]);
        assert_eq!(
            join_stack_trace(&trace, StringEscaping::Json),
            "java.lang.NullPointerException"
        );
    }

    #[test]
    fn verbatim_replaces_only_leading_tab() {
        let trace = lines(&["E", "\tat x\ty", "Caused by: F"]);
        assert_eq!(
            join_stack_trace(&trace, StringEscaping::Verbatim),
            "E\\n\\tat x\ty\\nCaused by: F"
        );
    }

    #[test]
    fn verbatim_leaves_header_tab_alone() {
        let trace = lines(&["\tE", "\tat x"]);
        assert_eq!(join_stack_trace(&trace, StringEscaping::Verbatim), "\tE\\n\\tat x");
    }

    #[test]
    fn json_escapes_line_contents() {
        let trace = lines(&[
            "Config: cannot open \"C:\\data\\app.cfg\"",
            "\tcaused by: bad\tvalue\nhere",
        ]);
        let joined = join_stack_trace(&trace, StringEscaping::Json);
        assert_eq!(
            joined,
            "Config: cannot open \\\"C:\\\\data\\\\app.cfg\\\"\\n\\tcaused by: bad\\tvalue\\nhere"
        );
        let parsed: String = serde_json::from_str(&format!("\"{}\"", joined)).unwrap();
        assert_eq!(parsed, trace.join("\n"));
    }

    #[test]
    fn empty_trace_is_empty_string() {
        assert_eq!(join_stack_trace(&[], StringEscaping::Json), "");
    }

    #[test]
    fn record_keeps_missing_message_as_null() {
        let throwable = ThrowableInfo {
            class_name: "java.lang.NullPointerException".to_string(),
            message: None,
            stack_trace: lines(&["java.lang.NullPointerException"]),
        };
        let record = encode_exception(&throwable, StringEscaping::Json);
        let keys: Vec<_> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["class", "message", "stackTrace"]);
        assert_eq!(record.get("message"), Some(&FieldValue::Null));
    }
}
