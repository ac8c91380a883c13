use std::fmt;

use crate::value::{Function, ObjectRef, Value};

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Self::Function(f)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Self::Object(obj)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

impl ObjectRef {
    /// Error instance mirroring a Rust error; the `source()` chain becomes a
    /// chain of non-enumerable `cause` errors.
    pub fn error_from(err: &(dyn std::error::Error + 'static)) -> Self {
        let obj = Self::error(err.to_string());
        if let Some(source) = err.source() {
            obj.define("cause", Self::error_from(source), false);
        }
        obj
    }
}

/// Number to text the way the host prints numbers: no trailing `.0`,
/// named non-finite values, exponent form outside `[1e-6, 1e21)`.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{n:.0}")
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        exponent_form(n)
    } else {
        n.to_string()
    }
}

/// Shortest mantissa with an explicitly signed exponent: `1e+21`, `1.5e-7`.
fn exponent_form(n: f64) -> String {
    let text = format!("{n:e}");
    match text.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => text,
    }
}

impl Value {
    /// Host string coercion. Never fails, including on cyclic arrays.
    pub fn coerce_string(&self) -> String {
        let mut stack = Vec::new();
        coerce(self, &mut stack)
    }
}

fn coerce(value: &Value, stack: &mut Vec<ObjectRef>) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::String(s) => s.clone(),
        Value::Function(f) => format!(
            "function {}() {{ [native code] }}",
            f.name().unwrap_or_default()
        ),
        Value::Object(obj) => coerce_object(obj, stack),
    }
}

fn coerce_object(obj: &ObjectRef, stack: &mut Vec<ObjectRef>) -> String {
    if obj.is_error() {
        let name = match obj.get("name") {
            None | Some(Value::Undefined) => "Error".to_string(),
            Some(v) => coerce(&v, stack),
        };
        let message = match obj.get("message") {
            None | Some(Value::Undefined) => String::new(),
            Some(v) => coerce(&v, stack),
        };
        return match (name.is_empty(), message.is_empty()) {
            (true, _) => message,
            (false, true) => name,
            (false, false) => format!("{name}: {message}"),
        };
    }

    if let Some(elements) = obj.elements() {
        if stack.iter().any(|seen| seen.ptr_eq(obj)) {
            return String::new();
        }
        stack.push(obj.clone());
        let parts: Vec<String> = elements
            .iter()
            .map(|e| {
                if e.is_nullish() {
                    String::new()
                } else {
                    coerce(e, stack)
                }
            })
            .collect();
        stack.pop();
        return parts.join(",");
    }

    if let Some(bytes) = obj.bytes() {
        return String::from_utf8_lossy(&bytes).into_owned();
    }

    "[object Object]".to_string()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.coerce_string())
    }
}
