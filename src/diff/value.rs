//! Structured values compared by the diff engine.

use serde_json::Number;
use std::collections::BTreeMap;

/// Array elements shown before the `... +N more` marker in truncated mode
pub const MAX_ARRAY_ITEMS: usize = 3;

/// Object nesting depth rendered before collapsing to `{...}` in truncated mode
pub const MAX_DEPTH: usize = 3;

/// Placeholder for an object that is not expanded
pub const COLLAPSED_OBJECT: &str = "{...}";

/// How much of a value to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Terminal-friendly: capped arrays, depth-limited objects
    Truncated,
    /// Every element and key, unlimited depth
    Full,
}

impl RenderMode {
    /// `Full` when `full` is set, `Truncated` otherwise
    #[must_use]
    pub const fn from_full(full: bool) -> Self {
        if full { Self::Full } else { Self::Truncated }
    }
}

/// A parsed structured document.
///
/// Object keys live in a `BTreeMap`, so iteration is always in
/// lexicographic key order and rendering is deterministic.
#[derive(Debug, Clone)]
pub enum Value {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Any JSON number
    Number(Number),
    /// A string
    String(String),
    /// An ordered list
    Array(Vec<Value>),
    /// String-keyed fields
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Parses JSON text.
    ///
    /// # Errors
    ///
    /// Returns the parser error if `text` is not valid JSON.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<serde_json::Value>(text).map(Self::from)
    }

    /// Fields of an object, `None` for every other kind
    #[must_use]
    pub const fn as_object(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Renders the value as a top-level value.
    #[must_use]
    pub fn render(&self, mode: RenderMode) -> String {
        self.render_at(0, mode)
    }

    /// Renders the value for one side of a `before → after` line.
    ///
    /// In truncated mode a non-empty object collapses to `{...}` right away,
    /// keeping modification lines to a single short line.
    #[must_use]
    pub fn render_inline(&self, mode: RenderMode) -> String {
        match (self, mode) {
            (Self::Object(map), RenderMode::Truncated) if !map.is_empty() => {
                COLLAPSED_OBJECT.to_string()
            }
            _ => self.render(mode),
        }
    }

    fn render_at(&self, depth: usize, mode: RenderMode) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::String(s) => quote(s),
            Self::Array(items) if items.is_empty() => "[]".to_string(),
            Self::Array(items) => {
                let shown = match mode {
                    RenderMode::Full => items.len(),
                    RenderMode::Truncated => items.len().min(MAX_ARRAY_ITEMS),
                };
                let mut parts: Vec<String> = items[..shown]
                    .iter()
                    .map(|item| item.render_at(depth + 1, mode))
                    .collect();
                if shown < items.len() {
                    parts.push(format!("... +{} more", items.len() - shown));
                }
                format!("[{}]", parts.join(", "))
            }
            Self::Object(map) if map.is_empty() => "{}".to_string(),
            Self::Object(_) if mode == RenderMode::Truncated && depth >= MAX_DEPTH => {
                COLLAPSED_OBJECT.to_string()
            }
            Self::Object(map) => {
                let parts: Vec<String> = map
                    .iter()
                    .map(|(key, value)| format!("{}: {}", quote(key), value.render_at(depth + 1, mode)))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
        }
    }
}

/// JSON-style quoting with escapes
fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("{s:?}"))
}

/// Numeric equality that treats `1` and `1.0` as the same value.
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        #[allow(clippy::float_cmp)]
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => numbers_equal(a, b),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}
