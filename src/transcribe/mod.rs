pub mod classify;

use strum::IntoEnumIterator;

use crate::serialize;
use crate::transcribe::classify::Capability;
use crate::types::{BUFFER_MARKER, CIRCULAR_MARKER, CommonField, Options, STREAM_MARKER};
use crate::value::{ObjectRef, SerializeHook, Value};

/// Handed to serialization hooks while they run.
///
/// Tracks which objects currently have a hook in flight, so a hook that
/// serializes its own object gets a structural copy instead of re-entering
/// itself.
pub struct HookContext<'a> {
    options: Options,
    hooking: &'a mut Vec<ObjectRef>,
}

impl<'a> HookContext<'a> {
    pub(crate) fn new(options: Options, hooking: &'a mut Vec<ObjectRef>) -> Self {
        Self { options, hooking }
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn is_hooking(&self, obj: &ObjectRef) -> bool {
        self.hooking.iter().any(|h| h.ptr_eq(obj))
    }

    /// Forward serialization of `value`, sharing this call's in-flight hook set.
    pub fn serialize(&mut self, value: &Value) -> Value {
        serialize::serialize_with(value, self.options, self.hooking)
    }
}

/// Copies an object graph into fresh plain objects.
///
/// `path` holds the ancestors of the node being copied (pushed on entry,
/// popped on return), so only true back-references become `[Circular]`.
pub(crate) struct Transcriber<'a> {
    options: Options,
    force_enumerable: bool,
    path: Vec<ObjectRef>,
    hooking: &'a mut Vec<ObjectRef>,
}

impl<'a> Transcriber<'a> {
    pub(crate) fn new(
        options: Options,
        force_enumerable: bool,
        hooking: &'a mut Vec<ObjectRef>,
    ) -> Self {
        Self {
            options,
            force_enumerable,
            path: Vec::new(),
            hooking,
        }
    }

    /// Copies `from` into `target` (or a fresh array/mapping) and returns the result.
    ///
    /// A hook on `from` short-circuits and its return value is handed back
    /// instead, leaving `target` untouched.
    pub(crate) fn transcribe(
        &mut self,
        from: &ObjectRef,
        target: Option<ObjectRef>,
        depth: usize,
    ) -> Value {
        let to = target.unwrap_or_else(|| {
            if from.is_array() {
                ObjectRef::array(Vec::new())
            } else {
                ObjectRef::plain()
            }
        });

        if self.options.depth_exhausted(depth) {
            tracing::trace!(depth, "max depth reached, truncating");
            return Value::Object(to);
        }

        if let Some(hook) = from.hook()
            && !self.is_hooking(from)
        {
            return self.invoke_hook(from, &hook);
        }

        self.path.push(from.clone());

        let mut copied = Vec::new();
        for (key, value) in from.entries() {
            if let Some(value) = self.copy_child(&value, depth) {
                copied.push((key, value));
            }
        }
        for (key, value) in &copied {
            to.set(key, value.clone());
        }

        for field in CommonField::iter() {
            let key = field.as_ref();
            let Some(source_value) = from.get(key) else {
                continue;
            };
            if source_value.is_nullish() {
                continue;
            }
            let value = match copied.iter().find(|(k, _)| k == key) {
                Some((_, v)) => Some(v.clone()),
                None => self.copy_child(&source_value, depth),
            };
            if let Some(value) = value {
                to.define(
                    key,
                    value,
                    self.force_enumerable || field.enumerable_by_default(),
                );
            }
        }

        self.path.pop();
        Value::Object(to)
    }

    fn invoke_hook(&mut self, from: &ObjectRef, hook: &SerializeHook) -> Value {
        tracing::trace!("serialization hook short-circuits traversal");
        self.hooking.push(from.clone());
        let result = hook(from, &mut HookContext::new(self.options, self.hooking));
        self.hooking.pop();
        result
    }

    /// Plain copy of a nested value, or `None` when the key must be dropped.
    fn copy_child(&mut self, value: &Value, depth: usize) -> Option<Value> {
        let obj = match value {
            Value::Function(_) => return None,
            Value::Object(obj) => obj,
            primitive => return Some(primitive.clone()),
        };

        let copied = match Capability::of(obj) {
            Capability::Buffer => Value::from(BUFFER_MARKER),
            Capability::Stream => Value::from(STREAM_MARKER),
            Capability::Hook | Capability::Plain => {
                if self.on_path(obj) {
                    tracing::trace!(depth, "circular reference replaced");
                    Value::from(CIRCULAR_MARKER)
                } else {
                    self.transcribe(obj, None, depth + 1)
                }
            }
        };
        Some(copied)
    }

    fn on_path(&self, obj: &ObjectRef) -> bool {
        self.path.iter().any(|seen| seen.ptr_eq(obj))
    }

    fn is_hooking(&self, obj: &ObjectRef) -> bool {
        self.hooking.iter().any(|h| h.ptr_eq(obj))
    }
}
