use crate::error::Error;
use crate::non_error::NonError;
use crate::transcribe::Transcriber;
use crate::types::Options;
use crate::value::{ObjectRef, Value};

/// Turns any value into a plain structure safe to log or encode.
///
/// Objects are transcribed with error fields (`name`, `message`, `stack`,
/// `code`, `cause`) made enumerable. Functions become `"[Function: name]"`.
/// Everything else is returned unchanged. Never fails.
pub fn serialize_error(value: &Value, options: &Options) -> Value {
    let mut hooking = Vec::new();
    serialize_with(value, *options, &mut hooking)
}

pub(crate) fn serialize_with(
    value: &Value,
    options: Options,
    hooking: &mut Vec<ObjectRef>,
) -> Value {
    match value {
        Value::Object(obj) => Transcriber::new(options, true, hooking).transcribe(obj, None, 0),
        Value::Function(f) => Value::String(format!(
            "[Function: {}]",
            f.name().unwrap_or("anonymous")
        )),
        other => other.clone(),
    }
}

/// Turns a plain structure back into an error instance.
///
/// Error instances pass through as the same reference. Non-array objects
/// are copied into a fresh `Error` with error fields kept hidden. Anything
/// else is wrapped in a [`NonError`]. Never fails.
pub fn deserialize_error(value: &Value, options: &Options) -> ObjectRef {
    match value {
        Value::Object(obj) if obj.is_error() => obj.clone(),
        Value::Object(obj) if !obj.is_array() => {
            let restored = ObjectRef::error("");
            let mut hooking = Vec::new();
            Transcriber::new(*options, false, &mut hooking).transcribe(
                obj,
                Some(restored.clone()),
                0,
            );
            restored
        }
        other => NonError::wrap(other),
    }
}

/// [`serialize_error`] followed by JSON rendering.
///
/// Fails only when a serialization hook hands back a structure that still
/// contains a cycle.
pub fn serialize_error_to_json(
    value: &Value,
    options: &Options,
) -> Result<serde_json::Value, Error> {
    serialize_error(value, options).to_json()
}

/// [`deserialize_error`] on a decoded JSON payload.
pub fn deserialize_error_from_json(json: &serde_json::Value, options: &Options) -> ObjectRef {
    deserialize_error(&Value::from_json(json), options)
}
