pub mod convert;
pub mod json;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::transcribe::HookContext;

/// Custom serialization hook. Receives the object it is attached to and
/// returns the plain representation that replaces it.
pub type SerializeHook = Rc<dyn Fn(&ObjectRef, &mut HookContext<'_>) -> Value>;

/// A callable as seen from the data side: only its name is observable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    name: String,
}

impl Function {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn anonymous() -> Self {
        Self {
            name: String::new(),
        }
    }

    /// `None` for anonymous functions.
    pub fn name(&self) -> Option<&str> {
        if self.name.is_empty() {
            None
        } else {
            Some(&self.name)
        }
    }
}

/// A dynamically typed value, possibly part of a cyclic object graph.
///
/// Objects compare by identity, everything else by value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Function(Function),
    Object(ObjectRef),
}

impl Value {
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Own property lookup on object values; `None` for everything else.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.as_object().and_then(|obj| obj.get(key))
    }
}

#[derive(Debug)]
enum ObjectKind {
    Plain,
    Array(Vec<Value>),
    Error,
    Buffer(Vec<u8>),
}

#[derive(Debug)]
struct Property {
    key: String,
    value: Value,
    enumerable: bool,
}

struct Object {
    kind: ObjectKind,
    properties: Vec<Property>,
    hook: Option<SerializeHook>,
}

impl Object {
    fn property(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.key == key)
    }

    fn property_mut(&mut self, key: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.key == key)
    }
}

/// Shared handle to a mutable object. Cloning the handle aliases the object.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Object>>);

/// Canonical array index (`"0"`, `"17"`), rejecting `"01"`, `"+1"` and friends.
/// Indices stop at `2^32 - 2`; larger numeric keys are named properties.
fn array_index(key: &str) -> Option<usize> {
    let idx: u32 = key.parse().ok()?;
    (idx != u32::MAX && idx.to_string() == key).then_some(idx as usize)
}

fn buffer_to_json(obj: &ObjectRef, _ctx: &mut HookContext<'_>) -> Value {
    let data: Vec<Value> = obj
        .bytes()
        .unwrap_or_default()
        .into_iter()
        .map(|b| Value::Number(f64::from(b)))
        .collect();
    Value::Object(
        ObjectRef::plain()
            .with("type", "Buffer")
            .with("data", ObjectRef::array(data)),
    )
}

impl ObjectRef {
    fn from_kind(kind: ObjectKind) -> Self {
        Self(Rc::new(RefCell::new(Object {
            kind,
            properties: Vec::new(),
            hook: None,
        })))
    }

    pub fn plain() -> Self {
        Self::from_kind(ObjectKind::Plain)
    }

    pub fn array(elements: Vec<Value>) -> Self {
        Self::from_kind(ObjectKind::Array(elements))
    }

    /// Error instance named `Error`.
    pub fn error(message: impl Into<String>) -> Self {
        Self::error_named("Error", message)
    }

    /// Error instance with non-enumerable `name`, `message` and a `stack`
    /// header line derived from both.
    pub fn error_named(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        let message = message.into();
        let stack = if message.is_empty() {
            name.clone()
        } else {
            format!("{name}: {message}")
        };
        let obj = Self::from_kind(ObjectKind::Error);
        obj.define("name", name, false);
        obj.define("message", message, false);
        obj.define("stack", stack, false);
        obj
    }

    /// Binary buffer. Carries a built-in hook rendering `{"type": "Buffer", "data": [..]}`.
    pub fn buffer(bytes: Vec<u8>) -> Self {
        let obj = Self::from_kind(ObjectKind::Buffer(bytes));
        obj.0.borrow_mut().hook = Some(Rc::new(buffer_to_json));
        obj
    }

    /// Readable-stream stand-in: a plain object with a non-enumerable `pipe` method.
    pub fn stream() -> Self {
        let obj = Self::plain();
        obj.define("pipe", Function::named("pipe"), false);
        obj
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_array(&self) -> bool {
        matches!(self.0.borrow().kind, ObjectKind::Array(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self.0.borrow().kind, ObjectKind::Error)
    }

    pub fn is_buffer(&self) -> bool {
        matches!(self.0.borrow().kind, ObjectKind::Buffer(_))
    }

    pub fn elements(&self) -> Option<Vec<Value>> {
        match &self.0.borrow().kind {
            ObjectKind::Array(elements) => Some(elements.clone()),
            _ => None,
        }
    }

    pub fn bytes(&self) -> Option<Vec<u8>> {
        match &self.0.borrow().kind {
            ObjectKind::Buffer(bytes) => Some(bytes.clone()),
            _ => None,
        }
    }

    /// Own property lookup, enumerable or not.
    pub fn get(&self, key: &str) -> Option<Value> {
        let obj = self.0.borrow();
        match (&obj.kind, array_index(key)) {
            (ObjectKind::Array(elements), Some(idx)) => elements.get(idx).cloned(),
            (ObjectKind::Buffer(bytes), Some(idx)) => {
                bytes.get(idx).map(|b| Value::Number(f64::from(*b)))
            }
            _ => obj.property(key).map(|p| p.value.clone()),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_enumerable(&self, key: &str) -> bool {
        let obj = self.0.borrow();
        match (&obj.kind, array_index(key)) {
            (ObjectKind::Array(elements), Some(idx)) => idx < elements.len(),
            (ObjectKind::Buffer(bytes), Some(idx)) => idx < bytes.len(),
            _ => obj.property(key).is_some_and(|p| p.enumerable),
        }
    }

    /// Assignment: existing properties keep their visibility, new ones are enumerable.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let mut obj = self.0.borrow_mut();
        if let Some(idx) = array_index(key) {
            match &mut obj.kind {
                ObjectKind::Array(elements) => {
                    if idx >= elements.len() {
                        elements.resize(idx + 1, Value::Undefined);
                    }
                    elements[idx] = value;
                    return;
                }
                ObjectKind::Buffer(bytes) => {
                    if let (Some(slot), Value::Number(n)) = (bytes.get_mut(idx), &value) {
                        *slot = (*n as i64).rem_euclid(256) as u8;
                    }
                    return;
                }
                ObjectKind::Plain | ObjectKind::Error => {}
            }
        }
        match obj.property_mut(key) {
            Some(prop) => prop.value = value,
            None => obj.properties.push(Property {
                key: key.to_string(),
                value,
                enumerable: true,
            }),
        }
    }

    /// Definition: sets value and visibility, keeping the key's position if it exists.
    pub fn define(&self, key: &str, value: impl Into<Value>, enumerable: bool) {
        let value = value.into();
        let mut obj = self.0.borrow_mut();
        if matches!(obj.kind, ObjectKind::Array(_) | ObjectKind::Buffer(_))
            && array_index(key).is_some()
        {
            drop(obj);
            self.set(key, value);
            return;
        }
        match obj.property_mut(key) {
            Some(prop) => {
                prop.value = value;
                prop.enumerable = enumerable;
            }
            None => obj.properties.push(Property {
                key: key.to_string(),
                value,
                enumerable,
            }),
        }
    }

    /// Chaining form of [`ObjectRef::set`].
    pub fn with(self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn push(&self, value: impl Into<Value>) {
        if let ObjectKind::Array(elements) = &mut self.0.borrow_mut().kind {
            elements.push(value.into());
        }
    }

    /// Own enumerable key/value pairs: indices first, then named properties in insertion order.
    pub fn entries(&self) -> Vec<(String, Value)> {
        let obj = self.0.borrow();
        let indexed: Vec<(String, Value)> = match &obj.kind {
            ObjectKind::Array(elements) => elements
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v.clone()))
                .collect(),
            ObjectKind::Buffer(bytes) => bytes
                .iter()
                .enumerate()
                .map(|(i, b)| (i.to_string(), Value::Number(f64::from(*b))))
                .collect(),
            ObjectKind::Plain | ObjectKind::Error => Vec::new(),
        };
        indexed
            .into_iter()
            .chain(
                obj.properties
                    .iter()
                    .filter(|p| p.enumerable)
                    .map(|p| (p.key.clone(), p.value.clone())),
            )
            .collect()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries().into_iter().map(|(k, _)| k).collect()
    }

    pub fn hook(&self) -> Option<SerializeHook> {
        self.0.borrow().hook.clone()
    }

    pub fn set_hook<F>(&self, hook: F)
    where
        F: Fn(&ObjectRef, &mut HookContext<'_>) -> Value + 'static,
    {
        self.0.borrow_mut().hook = Some(Rc::new(hook));
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

// Shallow on purpose: graphs may be cyclic.
impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(obj) = self.0.try_borrow() else {
            return f.write_str("ObjectRef(<borrowed>)");
        };
        let kind = match &obj.kind {
            ObjectKind::Plain => "Plain",
            ObjectKind::Array(_) => "Array",
            ObjectKind::Error => "Error",
            ObjectKind::Buffer(_) => "Buffer",
        };
        let keys: Vec<&str> = obj.properties.iter().map(|p| p.key.as_str()).collect();
        f.debug_struct("ObjectRef")
            .field("kind", &kind)
            .field("properties", &keys)
            .field("hook", &obj.hook.is_some())
            .finish()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    #[test]
    fn array_index_is_canonical() {
        assert_eq!(array_index("0"), Some(0));
        assert_eq!(array_index("42"), Some(42));
        assert_eq!(array_index("01"), None);
        assert_eq!(array_index("+1"), None);
        assert_eq!(array_index("-1"), None);
        assert_eq!(array_index("name"), None);
        assert_eq!(array_index("4294967294"), Some(4_294_967_294));
        assert_eq!(array_index("4294967295"), None);
        assert_eq!(array_index("18446744073709551615"), None);
    }

    #[test]
    fn out_of_range_index_is_a_named_property() {
        let arr = ObjectRef::array(vec![Value::from(1)]);
        arr.set("18446744073709551615", 2);
        arr.set("4294967295", 3);
        assert_eq!(arr.elements().unwrap().len(), 1);
        assert_eq!(arr.keys(), ["0", "18446744073709551615", "4294967295"]);
        assert_eq!(arr.get("4294967295").unwrap().as_f64(), Some(3.0));
    }

    #[test]
    fn set_keeps_visibility_of_existing_property() {
        let err = ObjectRef::error("boom");
        err.set("message", "changed");
        assert_eq!(err.get("message").unwrap().as_str(), Some("changed"));
        assert!(!err.is_enumerable("message"));

        err.set("extra", 1);
        assert!(err.is_enumerable("extra"));
    }

    #[test]
    fn define_redefines_in_place() {
        let obj = ObjectRef::plain().with("a", 1).with("b", 2);
        obj.define("a", 10, false);
        assert_eq!(obj.keys(), ["b"]);
        obj.define("a", 11, true);
        assert_eq!(obj.keys(), ["a", "b"]);
        assert_eq!(obj.get("a").unwrap().as_f64(), Some(11.0));
    }

    #[test]
    fn error_fields_are_hidden() {
        let err = ObjectRef::error_named("TypeError", "bad input");
        assert!(err.is_error());
        assert!(err.keys().is_empty());
        assert_eq!(err.get("name").unwrap().as_str(), Some("TypeError"));
        assert_eq!(
            err.get("stack").unwrap().as_str(),
            Some("TypeError: bad input")
        );
        assert_eq!(
            ObjectRef::error("").get("stack").unwrap().as_str(),
            Some("Error")
        );
    }

    #[test]
    fn array_entries_come_before_named_properties() {
        let arr = ObjectRef::array(vec![Value::from("x"), Value::Null]);
        arr.set("label", "tail");
        arr.set("3", true);
        assert_eq!(arr.keys(), ["0", "1", "2", "3", "label"]);
        assert_eq!(arr.get("2"), Some(Value::Undefined));
        assert_eq!(arr.get("3"), Some(Value::Bool(true)));
    }

    #[test]
    fn buffer_exposes_bytes_as_indices() {
        let buf = ObjectRef::buffer(vec![7, 8]);
        assert!(buf.is_buffer());
        assert_eq!(buf.keys(), ["0", "1"]);
        buf.set("1", 300);
        assert_eq!(buf.get("1").unwrap().as_f64(), Some(44.0));
        assert!(buf.hook().is_some());
    }

    #[test]
    fn stream_pipe_is_hidden_function() {
        let stream = ObjectRef::stream();
        assert!(stream.keys().is_empty());
        assert!(matches!(stream.get("pipe"), Some(Value::Function(_))));
    }

    #[test]
    fn objects_compare_by_identity() {
        let a = ObjectRef::plain();
        let b = ObjectRef::plain();
        assert_eq!(Value::Object(a.clone()), Value::Object(a.clone()));
        assert_ne!(Value::Object(a), Value::Object(b));
    }

    #[test]
    fn debug_survives_self_reference() {
        let a = ObjectRef::plain();
        a.set("self", a.clone());
        let rendered = format!("{a:?}");
        assert!(rendered.contains("self"));
    }
}
