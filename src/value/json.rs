use crate::error::Error;
use crate::transcribe::HookContext;
use crate::types::Options;
use crate::value::convert::format_number;
use crate::value::{ObjectRef, Value};

/// Number text exactly as the host renderer writes it (plain integer digits
/// below 1e21, `1e+21` style above); non-finite values have no JSON form.
fn number_to_json(n: f64) -> serde_json::Value {
    if !n.is_finite() {
        return serde_json::Value::Null;
    }
    // `arbitrary_precision` keeps the parsed digits verbatim.
    serde_json::from_str::<serde_json::Number>(&format_number(n)).map_or_else(
        |_| {
            serde_json::Number::from_f64(n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number)
        },
        serde_json::Value::Number,
    )
}

#[derive(Default)]
struct Renderer {
    stack: Vec<ObjectRef>,
    hooking: Vec<ObjectRef>,
}

impl Renderer {
    /// `Ok(None)` is the renderer's "undefined": the value has no JSON form.
    fn render(&mut self, value: &Value) -> Result<Option<serde_json::Value>, Error> {
        match value {
            Value::Undefined | Value::Function(_) => Ok(None),
            Value::Null => Ok(Some(serde_json::Value::Null)),
            Value::Bool(b) => Ok(Some(serde_json::Value::Bool(*b))),
            Value::Number(n) => Ok(Some(number_to_json(*n))),
            Value::String(s) => Ok(Some(serde_json::Value::String(s.clone()))),
            Value::Object(obj) => self.render_object(obj),
        }
    }

    fn render_object(&mut self, obj: &ObjectRef) -> Result<Option<serde_json::Value>, Error> {
        if let Some(hook) = obj.hook()
            && !self.hooking.iter().any(|h| h.ptr_eq(obj))
        {
            self.hooking.push(obj.clone());
            let replaced = hook(obj, &mut HookContext::new(Options::default(), &mut self.hooking));
            let rendered = self.render(&replaced);
            self.hooking.pop();
            return rendered;
        }

        if self.stack.iter().any(|seen| seen.ptr_eq(obj)) {
            return Err(Error::CircularStructure);
        }
        self.stack.push(obj.clone());
        let rendered = self.render_structure(obj);
        self.stack.pop();
        rendered.map(Some)
    }

    fn render_structure(&mut self, obj: &ObjectRef) -> Result<serde_json::Value, Error> {
        if let Some(elements) = obj.elements() {
            let items = elements
                .iter()
                .map(|e| -> Result<serde_json::Value, Error> {
                    Ok(self.render(e)?.unwrap_or(serde_json::Value::Null))
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(serde_json::Value::Array(items));
        }

        let mut map = serde_json::Map::new();
        for (key, value) in obj.entries() {
            if let Some(rendered) = self.render(&value)? {
                map.insert(key, rendered);
            }
        }
        Ok(serde_json::Value::Object(map))
    }
}

impl Value {
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Object(ObjectRef::array(items.iter().map(Value::from_json).collect()))
            }
            serde_json::Value::Object(map) => {
                let obj = ObjectRef::plain();
                for (key, value) in map {
                    obj.set(key, Value::from_json(value));
                }
                Value::Object(obj)
            }
        }
    }

    /// Renders with the host JSON renderer's rules: hooks are honoured,
    /// `undefined` and functions are skipped in mappings and become `null`
    /// in arrays, and cycles fail with [`Error::CircularStructure`].
    pub fn to_json(&self) -> Result<serde_json::Value, Error> {
        Ok(self.render_json()?.unwrap_or(serde_json::Value::Null))
    }

    pub(crate) fn render_json(&self) -> Result<Option<serde_json::Value>, Error> {
        Renderer::default().render(self)
    }
}

impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let json = self.to_json().map_err(serde::ser::Error::custom)?;
        serde::Serialize::serialize(&json, serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Value {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
        Ok(Value::from_json(&json))
    }
}
