use crate::error::Error;
use crate::value::{ObjectRef, Value};

/// Wrapper for thrown values that are not errors at all (strings, numbers,
/// arrays, `null`).
///
/// Produces an ordinary error instance whose `name` is [`NonError::NAME`] and
/// whose `message` is the JSON text of the wrapped value.
pub struct NonError;

impl NonError {
    pub const NAME: &'static str = "NonError";

    pub fn wrap(value: &Value) -> ObjectRef {
        ObjectRef::error_named(Self::NAME, Self::prepare_message(value))
    }

    pub fn is(obj: &ObjectRef) -> bool {
        obj.is_error() && obj.get("name").as_ref().and_then(Value::as_str) == Some(Self::NAME)
    }

    /// JSON text of `value`, falling back to string coercion when it has no
    /// JSON rendering. Values without a JSON form (`undefined`, functions)
    /// give an empty message.
    fn prepare_message(value: &Value) -> String {
        match Self::json_text(value) {
            Ok(Some(text)) => text,
            Ok(None) => String::new(),
            Err(e) => {
                tracing::debug!(error = %e, "wrapped value has no JSON form, using string coercion");
                value.coerce_string()
            }
        }
    }

    fn json_text(value: &Value) -> Result<Option<String>, Error> {
        value
            .render_json()?
            .map(|json| serde_json::to_string(&json))
            .transpose()
            .map_err(Error::from)
    }
}
