use crate::error::Error;

/// Placeholder substituted for a back-reference to an ancestor on the current path.
pub const CIRCULAR_MARKER: &str = "[Circular]";
/// Placeholder substituted for nested binary buffers.
pub const BUFFER_MARKER: &str = "[object Buffer]";
/// Placeholder substituted for nested stream-like objects (anything with a `pipe` method).
pub const STREAM_MARKER: &str = "[object Stream]";

/// Traversal options shared by both directions.
///
/// Deserializes from the camelCase shape used on the JS side, so
/// `{"maxDepth": 2}` and `{}` are both accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Options {
    /// Maximum recursion depth. `None` means unbounded.
    pub max_depth: Option<usize>,
}

impl Options {
    pub fn unbounded() -> Self {
        Self { max_depth: None }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, Error> {
        serde_json::from_str(s).map_err(|e| Error::Options {
            reason: e.to_string(),
        })
    }

    /// Whether a node at `depth` is at or past the configured limit.
    pub fn depth_exhausted(&self, depth: usize) -> bool {
        self.max_depth.is_some_and(|max| depth >= max)
    }
}

/// Error fields copied outside of generic key enumeration.
///
/// Variant order is the order fields are attached to the target.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
    strum_macros::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum CommonField {
    Name,
    Message,
    Stack,
    Code,
    Cause,
}

impl CommonField {
    /// Visibility the field has on a native error when not forced visible.
    pub fn enumerable_by_default(self) -> bool {
        matches!(self, Self::Code)
    }
}
