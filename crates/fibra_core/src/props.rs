//! Prop values and the ordered prop map carried by every element
//!
//! Props are a closed tagged union ([`PropValue`]) rather than an untyped bag,
//! so the adapter can decide how to apply each entry without guessing.
//!
//! Every [`Props`] carries a `children` sequence. Children are stored apart
//! from the keyed entries, so iterating a prop map never yields them and the
//! reserved `children` key cannot be overwritten.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::element::Element;

/// Reserved key naming the children sequence
pub const CHILDREN: &str = "children";

/// Prop key holding the string value of a text element
pub const NODE_VALUE: &str = "nodeValue";

/// Default prefix marking event-handler props (`onClick`)
pub const DEFAULT_EVENT_PREFIX: &str = "on";

// =============================================================================
// Events
// =============================================================================

/// An event delivered to a handler by the render target
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Lower-case event name (`"click"`)
    pub event_type: String,
    /// Optional payload supplied by the host
    pub detail: Option<PropValue>,
}

impl Event {
    /// Create an event without a payload
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            detail: None,
        }
    }

    /// Attach a payload
    pub fn with_detail(mut self, detail: impl Into<PropValue>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Callback for handling events
///
/// Uses Rc since the UI is single-threaded.
pub type EventCallback = Rc<dyn Fn(&Event)>;

/// A shareable event handler
///
/// Two handlers are equal only if they are clones of the same callback, which
/// is what listener removal keys on.
#[derive(Clone)]
pub struct EventHandler(EventCallback);

impl EventHandler {
    /// Wrap a closure
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Event) + 'static,
    {
        Self(Rc::new(handler))
    }

    /// Invoke the handler
    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }

    /// Address of the callback, stable across clones
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    /// Whether both handlers share the same callback
    pub fn ptr_eq(&self, other: &EventHandler) -> bool {
        self.addr() == other.addr()
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:#x})", self.addr())
    }
}

// =============================================================================
// AnyValue
// =============================================================================

/// An opaque shared value, compared by identity
#[derive(Clone)]
pub struct AnyValue(Rc<dyn Any>);

impl AnyValue {
    pub fn new<T: 'static>(value: T) -> Self {
        Self(Rc::new(value))
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for AnyValue {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyValue({:#x})", self.addr())
    }
}

// =============================================================================
// PropValue
// =============================================================================

/// A single prop value
///
/// Scalars, lists and elements compare by value; handlers and opaque values
/// compare by identity.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    Str(String),
    Number(f64),
    Bool(bool),
    Handler(EventHandler),
    Element(Element),
    List(Vec<PropValue>),
    Any(AnyValue),
}

impl PropValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            PropValue::Handler(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            PropValue::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Downcast an opaque value
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            PropValue::Any(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }
}

/// Format a number the way a JavaScript engine stringifies it for the common
/// cases: integral values carry no fraction, non-finite values are spelled out.
fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == n.trunc() && n.abs() < 1e21 {
        // -0 stringifies as "0"
        write!(f, "{}", n as i128)
    } else {
        write!(f, "{}", n)
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Str(s) => f.write_str(s),
            PropValue::Number(n) => fmt_number(*n, f),
            PropValue::Bool(b) => write!(f, "{}", b),
            PropValue::Handler(_) => f.write_str("[handler]"),
            PropValue::Element(_) => f.write_str("[element]"),
            PropValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            PropValue::Any(_) => f.write_str("[object]"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value)
    }
}

impl From<&String> for PropValue {
    fn from(value: &String) -> Self {
        PropValue::Str(value.clone())
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

macro_rules! impl_number_prop {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for PropValue {
                fn from(value: $ty) -> Self {
                    PropValue::Number(value as f64)
                }
            }
        )*
    };
}

impl_number_prop!(f64, f32, i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        PropValue::Handler(value)
    }
}

impl From<Element> for PropValue {
    fn from(value: Element) -> Self {
        PropValue::Element(value)
    }
}

impl From<AnyValue> for PropValue {
    fn from(value: AnyValue) -> Self {
        PropValue::Any(value)
    }
}

impl<T: Into<PropValue>> From<Vec<T>> for PropValue {
    fn from(value: Vec<T>) -> Self {
        PropValue::List(value.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// Event-handler key convention
// =============================================================================

/// Derive the event name from an event-handler prop key
///
/// Returns `None` unless `key` is `prefix` followed by at least one more
/// character. `("on", "onClick")` gives `"click"`.
pub fn event_name(prefix: &str, key: &str) -> Option<String> {
    let rest = key.strip_prefix(prefix)?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.to_lowercase())
}

/// Build the prop key for an event: `("on", "click")` gives `"onClick"`
pub fn event_prop_key(prefix: &str, event: &str) -> String {
    let mut chars = event.chars();
    match chars.next() {
        Some(first) => format!("{}{}{}", prefix, first.to_uppercase(), chars.as_str()),
        None => prefix.to_string(),
    }
}

// =============================================================================
// Props
// =============================================================================

/// Ordered prop map plus the element's children
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    entries: IndexMap<String, PropValue>,
    children: Vec<Element>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert an entry, returning the previous value
    ///
    /// The reserved `children` key is rejected; use [`Props::set_children`].
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropValue>,
    ) -> Option<PropValue> {
        let key = key.into();
        if key == CHILDREN {
            tracing::warn!("ignoring prop entry for reserved key `children`");
            return None;
        }
        self.entries.insert(key, value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.entries.shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate keyed entries in insertion order (never includes `children`)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of keyed entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn set_children(&mut self, children: Vec<Element>) {
        self.children = children;
    }

    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    /// The `nodeValue` entry of a text element
    pub fn node_value(&self) -> Option<&PropValue> {
        self.get(NODE_VALUE)
    }
}

impl<K, V> FromIterator<(K, V)> for Props
where
    K: Into<String>,
    V: Into<PropValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Props::new();
        for (key, value) in iter {
            props.insert(key, value);
        }
        props
    }
}
