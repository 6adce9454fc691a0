//! Dynamic values
//!
//! Call values reach the engine as [`Value`]s: a small sum type covering the runtime
//! shapes a caller can hand over (scalars, sequences, records, the per-call arguments
//! capture, callables, regular expressions, dates and embedder-defined objects).
//!
//! The matcher predicates of [`crate::registry`] only ever inspect values through the
//! helpers defined here, so the semantics of "is an object", "is absent" and the textual
//! form used by strict-mode failures live in a single place.
use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use downcast_rs::{DowncastSync, impl_downcast};
use indexmap::IndexMap;
use regex::Regex;
use strum::{EnumIs, EnumTryAs, IntoStaticStr};

/// Insertion-ordered named fields. Enumeration order is the key order of the record.
pub type Record = IndexMap<String, Value>;

/// An embedder-defined object carried through validation untouched.
///
/// Custom predicates recover the concrete type with `downcast_ref`:
///
/// ```rust
/// # use argguard::value::{OpaqueObject, Value};
/// # use std::sync::Arc;
/// #[derive(Debug)]
/// struct Foo;
/// impl OpaqueObject for Foo {}
///
/// let value = Value::Opaque(Arc::new(Foo));
/// let is_foo = |v: &Value| match v {
///     Value::Opaque(obj) => obj.downcast_ref::<Foo>().is_some(),
///     _ => false,
/// };
/// assert!(is_foo(&value));
/// ```
pub trait OpaqueObject: DowncastSync + fmt::Debug {}
impl_downcast!(sync OpaqueObject);

type CallableFn = dyn Fn(&[Value]) -> Value + Send + Sync;

/// A shareable callable handle.
#[derive(Clone)]
pub struct Callable {
    name: Option<String>,
    func: Arc<CallableFn>,
}

impl Callable {
    pub fn new(name: impl Into<String>, func: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Self {
        Self {
            name: Some(name.into()),
            func: Arc::new(func),
        }
    }

    pub fn anonymous(func: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Self {
        Self {
            name: None,
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.func)(args)
    }

    /// Two handles are the same function when they share the underlying closure.
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({})", self.name.as_deref().unwrap_or("<anonymous>"))
    }
}

/// A runtime value handed to the validation engine.
#[derive(Debug, Clone, Default, EnumIs, EnumTryAs, IntoStaticStr)]
pub enum Value {
    /// No value at all. Also what a schema entry sees past the end of the call values.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    /// A record with named fields.
    Object(Record),
    /// The per-invocation argument capture of a function call.
    Arguments(Vec<Value>),
    Function(Callable),
    RegExp(Regex),
    Date(DateTime<Utc>),
    /// An embedder-defined object (see [`OpaqueObject`]).
    Opaque(Arc<dyn OpaqueObject>),
}

impl Value {
    pub fn arguments(values: impl IntoIterator<Item = Value>) -> Self {
        Value::Arguments(values.into_iter().collect())
    }

    pub fn function(name: impl Into<String>, func: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Self {
        Value::Function(Callable::new(name, func))
    }

    pub fn opaque(object: impl OpaqueObject) -> Self {
        Value::Opaque(Arc::new(object))
    }

    /// Name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// `Undefined` or `Null`: the absence accepted by optional type expressions.
    #[inline]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Every non-null object-like value: sequences, records, argument captures, regular
    /// expressions, dates and opaque objects. Functions are not objects.
    pub fn is_object_like(&self) -> bool {
        matches!(
            self,
            Value::Array(_)
                | Value::Object(_)
                | Value::Arguments(_)
                | Value::RegExp(_)
                | Value::Date(_)
                | Value::Opaque(_)
        )
    }

    /// Records and opaque objects; sequences, argument captures, regular expressions and
    /// dates carry their own type tag and are not plain objects.
    pub fn is_plain_object(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Opaque(_))
    }

    /// Element slice of sequences and argument captures.
    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) | Value::Arguments(items) => Some(items),
            _ => None,
        }
    }

    /// Lossy conversion to JSON. Values with no JSON counterpart map to their textual
    /// form (regular expressions, opaque objects), an RFC 3339 string (dates) or `null`
    /// (`Undefined`, functions).
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Undefined | Value::Null | Value::Function(_) => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => Json::from(*n as i64),
            Value::Number(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
            Value::String(s) => Json::String(s.clone()),
            Value::Array(items) | Value::Arguments(items) => {
                Json::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(record) => Json::Object(
                record
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Value::RegExp(_) | Value::Opaque(_) => Json::String(self.to_string()),
            Value::Date(date) => Json::String(date.to_rfc3339()),
        }
    }
}

fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        // -0 prints as 0
        f.write_str("0")
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // Shortest mantissa, explicit exponent sign: 1e+21, 1.5e-7
        let text = format!("{:e}", n);
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => write!(f, "{}e+{}", mantissa, exp),
            _ => f.write_str(&text),
        }
    } else {
        // Shortest round-trip digits; integral values print without a fraction.
        write!(f, "{}", n)
    }
}

/// The host string conversion of a value, as quoted by strict-mode failures.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => fmt_number(*n, f),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    if !item.is_nullish() {
                        fmt::Display::fmt(item, f)?;
                    }
                }
                Ok(())
            }
            Value::Object(_) | Value::Opaque(_) => f.write_str("[object Object]"),
            Value::Arguments(_) => f.write_str("[object Arguments]"),
            Value::Function(callable) => write!(
                f,
                "function {}() {{ [native code] }}",
                callable.name().unwrap_or_default()
            ),
            Value::RegExp(rx) => write!(f, "/{}/", rx.as_str()),
            Value::Date(date) => write!(
                f,
                "{} (Coordinated Universal Time)",
                date.format("%a %b %d %Y %H:%M:%S GMT+0000")
            ),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) | (Value::Arguments(a), Value::Arguments(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::RegExp(a), Value::RegExp(b)) => a.as_str() == b.as_str(),
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(value as f64)
                }
            }
        )*
    };
}

impl_from_number!(f64, f32, i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Object(value)
    }
}

impl From<Regex> for Value {
    fn from(value: Regex) -> Self {
        Value::RegExp(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Date(value)
    }
}

impl From<Callable> for Value {
    fn from(value: Callable) -> Self {
        Value::Function(value)
    }
}

/// `None` is an absent value.
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Undefined, Into::into)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Object(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}
