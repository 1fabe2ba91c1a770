//! Timestamps, identifiers and the JSON envelope printed by `--format json`.

use serde_json::Value as JsonValue;
use std::time::{SystemTime, UNIX_EPOCH};
use ulid::Ulid;

pub const ENVELOPE_VERSION: &str = "1";

/// Unix-epoch seconds with a `Z` suffix, e.g. `1771220592Z`.
pub fn now_epoch_z() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{}Z", secs)
}

/// UTC ISO-8601 to the second, e.g. `2026-02-16T05:43:12Z`. Used for journal
/// records, which are read back by people.
pub fn now_iso8601() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Fresh ULID used to tag a session in journal events.
pub fn new_session_id() -> String {
    Ulid::new().to_string()
}

/// `{envelope, ts, cmd, status, ...payload}`. Non-object payloads land under
/// a `data` key.
pub fn envelope(cmd: &str, status: &str, payload: JsonValue) -> JsonValue {
    let mut out = serde_json::json!({
        "envelope": ENVELOPE_VERSION,
        "ts": now_epoch_z(),
        "cmd": cmd,
        "status": status,
    });
    if let Some(obj) = out.as_object_mut() {
        match payload {
            JsonValue::Object(fields) => obj.extend(fields),
            JsonValue::Null => {}
            other => {
                obj.insert("data".to_string(), other);
            }
        }
    }
    out
}
