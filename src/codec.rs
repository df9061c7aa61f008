//! JSON Lines wire format
//!
//! Input is one command object per line:
//!
//! ```text
//! {"type":"make_friends","user1":"a","user2":"b"}
//! {"type":"del_friends","user1":"a","user2":"b"}
//! {"type":"update","user":"a","timestamp":1,"values":{"x":"1"}}
//! ```
//!
//! Unknown `type` values are skipped. Anything else that does not fit the
//! grammar fails the whole batch.

use crate::core::error::{Error, Result};
use crate::core::types::{Command, Timestamp, UpdateCommand};
use crate::engine::Notification;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

/// Indent used for the final snapshot
const SNAPSHOT_INDENT: &[u8] = b"    ";

#[derive(Deserialize)]
struct RelationLine {
    user1: String,
    user2: String,
}

#[derive(Deserialize)]
struct UpdateLine {
    user: String,
    timestamp: Timestamp,
    values: BTreeMap<String, String>,
}

/// Decode one input line. `line_no` is 1-based and only used for errors.
/// Returns `Ok(None)` for blank lines and unknown command types.
pub fn decode_line(line_no: usize, line: &str) -> Result<Option<Command>> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(line)
        .map_err(|e| Error::malformed(line_no, format!("invalid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(Error::malformed(line_no, "expected a JSON object"));
    }

    let kind = match value.get("type").and_then(Value::as_str) {
        Some(kind) => kind.to_string(),
        None => return Err(Error::malformed(line_no, "missing string field `type`")),
    };

    let command = match kind.as_str() {
        "make_friends" => {
            let fields: RelationLine = parse_fields(line_no, &kind, value)?;
            Command::Relate { a: fields.user1, b: fields.user2 }
        }
        "del_friends" => {
            let fields: RelationLine = parse_fields(line_no, &kind, value)?;
            Command::Unrelate { a: fields.user1, b: fields.user2 }
        }
        "update" => {
            let fields: UpdateLine = parse_fields(line_no, &kind, value)?;
            Command::Update(UpdateCommand {
                entity: fields.user,
                timestamp: fields.timestamp,
                values: fields.values,
            })
        }
        other => {
            tracing::debug!(line = line_no, kind = other, "skipping unknown command type");
            return Ok(None);
        }
    };

    Ok(Some(command))
}

fn parse_fields<T: DeserializeOwned>(line_no: usize, kind: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::malformed(line_no, format!("bad `{}` command: {}", kind, e)))
}

/// Decode a whole input stream. Nothing is returned unless every line decodes.
pub fn decode_all<R: BufRead>(reader: R) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        if let Some(command) = decode_line(index + 1, &line?)? {
            commands.push(command);
        }
    }
    Ok(commands)
}

/// Write one notification as a single compact JSON line
pub fn write_notification<W: Write>(writer: &mut W, notification: &Notification) -> Result<()> {
    serde_json::to_writer(&mut *writer, notification)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Write the final snapshot as one pretty-printed JSON object
pub fn write_snapshot<W: Write>(
    writer: &mut W,
    snapshot: &BTreeMap<String, BTreeMap<String, String>>,
) -> Result<()> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(SNAPSHOT_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut *writer, formatter);
    snapshot.serialize(&mut serializer)?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_each_command_type() {
        let relate = decode_line(1, r#"{"type":"make_friends","user1":"a","user2":"b"}"#).unwrap();
        assert_eq!(relate, Some(Command::relate("a", "b")));

        let unrelate = decode_line(2, r#"{"type":"del_friends","user1":"a","user2":"b"}"#).unwrap();
        assert_eq!(unrelate, Some(Command::unrelate("a", "b")));

        let update = decode_line(
            3,
            r#"{"type":"update","user":"a","timestamp":-4,"values":{"y":"2","x":"1"}}"#,
        )
        .unwrap();
        assert_eq!(
            update,
            Some(Command::from(UpdateCommand::new("a", -4, [("x", "1"), ("y", "2")])))
        );
    }

    #[test]
    fn test_unknown_type_and_blank_lines_are_skipped() {
        assert_eq!(decode_line(1, r#"{"type":"poke","user":"a"}"#).unwrap(), None);
        assert_eq!(decode_line(2, "   ").unwrap(), None);
    }

    #[test]
    fn test_malformed_lines_fail() {
        let cases = [
            "not json",
            "[1,2,3]",
            r#"{"user":"a"}"#,
            r#"{"type":7}"#,
            r#"{"type":"make_friends","user1":"a"}"#,
            r#"{"type":"update","user":"a","timestamp":"soon","values":{}}"#,
            r#"{"type":"update","user":"a","timestamp":1.5,"values":{}}"#,
            r#"{"type":"update","user":"a","timestamp":1,"values":{"x":3}}"#,
            r#"{"type":"update","user":"a","timestamp":1}"#,
        ];

        for case in cases {
            let err = decode_line(9, case).unwrap_err();
            assert!(
                matches!(err, Error::MalformedCommand { line: 9, .. }),
                "expected malformed error for {}",
                case
            );
        }
    }

    #[test]
    fn test_decode_all_reports_line_number() {
        let input = "{\"type\":\"make_friends\",\"user1\":\"a\",\"user2\":\"b\"}\n\nbroken\n";
        let err = decode_all(input.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MalformedCommand { line: 3, .. }));
    }

    #[test]
    fn test_snapshot_layout() {
        let mut snapshot = BTreeMap::new();
        snapshot.insert("a".to_string(), BTreeMap::from([("x".to_string(), "1".to_string())]));
        snapshot.insert("b".to_string(), BTreeMap::new());

        let mut out = Vec::new();
        write_snapshot(&mut out, &snapshot).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\n    \"a\": {\n        \"x\": \"1\"\n    },\n    \"b\": {}\n}\n"
        );
    }
}
