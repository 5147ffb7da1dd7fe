use std::io::{self, Write};

/// Write a single NDJSON event (one JSON object per line).
pub fn write_event(out: &mut impl Write, event: &serde_json::Value) -> io::Result<()> {
    let line = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    out.write_all(line.as_bytes())?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Convenience helper that writes to stdout.
pub fn emit(event: serde_json::Value) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write_event(&mut out, &event)
}

/// Wrap `payload` in a `data` event for `command`.
pub fn data(command: &str, payload: impl serde::Serialize) -> serde_json::Value {
    let payload = serde_json::to_value(payload).unwrap_or(serde_json::Value::Null);
    let mut event = serde_json::json!({
        "event": "data",
        "command": command,
    });
    match (event.as_object_mut(), payload) {
        (Some(object), serde_json::Value::Object(fields)) => object.extend(fields),
        (Some(object), other) => {
            object.insert("result".to_string(), other);
        }
        (None, _) => {}
    }
    event
}

pub fn error(message: &str) -> serde_json::Value {
    serde_json::json!({
        "event": "error",
        "message": message,
    })
}
