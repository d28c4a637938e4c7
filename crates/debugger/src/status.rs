//! Status line synthesis
use serde_json::Value;
use transport::ProtocolRecord;

/// Status line for a batch, built from its final record only
///
/// Returns `None` for an empty batch so the previous status stays in place.
pub fn for_batch(batch: &[ProtocolRecord]) -> Option<String> {
    batch.last().map(status_line)
}

/// `message, msg, reason, file: .., func: .., line: ..`, skipping absent parts
pub fn status_line(record: &ProtocolRecord) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(message) = record.message() {
        parts.push(message.to_string());
    }

    if let Some(payload) = record.structured() {
        if let Some(msg) = &payload.msg {
            parts.push(msg.clone());
        }
        if let Some(reason) = &payload.reason {
            parts.push(reason.clone());
        }
        // raw values, so a line GDB reports as "0" or "??" is still shown
        if let Some(frame) = payload.fields.get("frame").and_then(Value::as_object) {
            for key in FRAME_KEYS {
                if let Some(value) = frame.get(key) {
                    parts.push(format!("{key}: {}", display(value)));
                }
            }
        }
    }

    parts.join(", ")
}

const FRAME_KEYS: [&str; 3] = ["file", "func", "line"];

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
