use crate::value::{ObjectRef, Value};

/// What a nested object value is capable of, decided once before copying.
///
/// Precedence is `Buffer`, then `Stream`, then `Hook`: a buffer carries a
/// built-in hook but is still replaced by its marker when nested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Buffer,
    Stream,
    Hook,
    Plain,
}

impl Capability {
    pub fn of(obj: &ObjectRef) -> Self {
        if obj.is_buffer() {
            Self::Buffer
        } else if is_stream_like(obj) {
            Self::Stream
        } else if obj.hook().is_some() {
            Self::Hook
        } else {
            Self::Plain
        }
    }
}

/// Anything exposing a callable `pipe`, enumerable or not.
fn is_stream_like(obj: &ObjectRef) -> bool {
    matches!(obj.get("pipe"), Some(Value::Function(_)))
}
